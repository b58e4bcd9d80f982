//! Seamless horizontal looping for the skyline layers.
//!
//! Each layer's tile is drawn twice, the copy shifted right by one tile
//! width. Translating both from `0` to `-W` and wrapping back to `0` shows no
//! seam because the copy occupies the primary's old place at the wrap.

use super::scene::{LayerDepth, SceneLayer, TILE_WIDTH};

/// Scroll timing for one depth band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxLayer {
	pub depth: LayerDepth,
	/// Seconds per full loop; larger reads as further away.
	pub period: f64,
	pub tile_width: f64,
}

impl ParallaxLayer {
	pub fn new(depth: LayerDepth, period: f64, tile_width: f64) -> Self {
		Self {
			depth,
			period,
			tile_width,
		}
	}

	pub fn for_layer(layer: &SceneLayer) -> Self {
		Self::new(layer.depth, layer.period, TILE_WIDTH)
	}

	/// Horizontal translation after `elapsed` seconds, in `(-W, 0]`.
	/// Constant velocity `W / T`, wrapping to `0` every period.
	pub fn offset_at(&self, elapsed: f64) -> f64 {
		if self.period <= 0.0 || !elapsed.is_finite() {
			return 0.0;
		}
		let mut phase = elapsed.rem_euclid(self.period) / self.period;
		// `rem_euclid` rounds tiny negatives up to a full period.
		if phase >= 1.0 {
			phase = 0.0;
		}
		let offset = -phase * self.tile_width;
		// Avoid handing out -0.0 at the wrap.
		if offset == 0.0 { 0.0 } else { offset }
	}

	/// Left edges of the primary tile and its duplicate.
	pub fn tile_offsets(&self) -> [f64; 2] {
		[0.0, self.tile_width]
	}

	/// Scroll speed in logical units per second.
	pub fn speed(&self) -> f64 {
		self.tile_width / self.period
	}
}

/// Whether nearer layers always move faster: `back > mid > front` periods.
pub fn depth_order_holds(layers: &[ParallaxLayer]) -> bool {
	let period = |depth| {
		layers
			.iter()
			.find(|l| l.depth == depth)
			.map(|l| l.period)
	};
	match (
		period(LayerDepth::Back),
		period(LayerDepth::Mid),
		period(LayerDepth::Front),
	) {
		(Some(back), Some(mid), Some(front)) => back > mid && mid > front,
		_ => false,
	}
}
