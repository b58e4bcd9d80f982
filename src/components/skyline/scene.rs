//! Deterministic skyline generation.
//!
//! Building outlines are fixed tables; windows, stars and the reveal order
//! are derived from [`scene_hash`] alone, so the same tables always produce
//! the same scene on every platform. The whole [`Skyline`] is built once on
//! first access and never mutated afterwards.

use std::sync::LazyLock;

use crate::error::MotionError;

/// Width of one loop tile in logical units.
pub const TILE_WIDTH: f64 = 800.0;
/// Height of the skyline viewbox; the ground sits at this y.
pub const TILE_HEIGHT: f64 = 300.0;

const HASH_BUILDING: u32 = 73_856_093;
const HASH_ROW: u32 = 19_349_663;
const HASH_COL: u32 = 83_492_791;

/// Window cell size.
pub const WINDOW_WIDTH: f64 = 4.0;
pub const WINDOW_HEIGHT: f64 = 5.0;
const COL_STEP: f64 = 9.0;
const ROW_STEP: f64 = 11.0;
const SIDE_MARGIN: f64 = 5.0;
const TOP_MARGIN: f64 = 8.0;
const BOTTOM_MARGIN: f64 = 10.0;

/// Buildings with fewer accepted windows than this get fallback windows.
pub const MIN_WINDOWS: usize = 4;
/// A fallback closer than this (on both axes) to an existing window is skipped.
pub const FALLBACK_CLEARANCE: f64 = 6.0;
const FALLBACK_SLOTS: [(f64, f64); 4] = [(0.3, 0.3), (0.7, 0.3), (0.3, 0.65), (0.7, 0.65)];
const FALLBACK_ROW_BASE: u32 = 1_000;

const REVEAL_COL: u32 = 0x5EED;
/// Delay between successive buildings in the reveal, seconds.
pub const REVEAL_STAGGER: f64 = 0.08;

const STAR_SEED: u32 = 0x57A2;
const STAR_COUNT: u32 = 64;
const STAR_BAND: (f64, f64) = (6.0, TILE_HEIGHT * 0.6);

/// Mixes a building key and a grid cell into a well-spread 32-bit seed.
pub fn scene_hash(building: u32, row: u32, col: u32) -> u32 {
	let mut h = building.wrapping_mul(HASH_BUILDING)
		^ row.wrapping_mul(HASH_ROW)
		^ col.wrapping_mul(HASH_COL);
	h ^= h >> 16;
	h = h.wrapping_mul(0x45D9_F3B);
	h ^= h >> 16;
	h = h.wrapping_mul(0x45D9_F3B);
	h ^= h >> 16;
	h
}

/// Depth band of a skyline layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerDepth {
	Back,
	Mid,
	Front,
}

impl LayerDepth {
	/// Back to front, the order layers are painted in.
	pub const ALL: [LayerDepth; 3] = [LayerDepth::Back, LayerDepth::Mid, LayerDepth::Front];

	pub fn name(self) -> &'static str {
		match self {
			LayerDepth::Back => "back",
			LayerDepth::Mid => "mid",
			LayerDepth::Front => "front",
		}
	}
}

/// One building in a layer table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Building {
	/// Left edge within the tile.
	pub x: f64,
	pub width: f64,
	pub height: f64,
	/// Roofline as `(fx, fy)` fractions of width and height, measured from the
	/// building's top-left corner. The outline closes along the ground.
	pub silhouette: Option<&'static [(f64, f64)]>,
	/// Height of a spire/antenna above the roof, 0 for none.
	pub roof: f64,
}

impl Building {
	pub const fn new(x: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			width,
			height,
			silhouette: None,
			roof: 0.0,
		}
	}

	pub const fn with_roof(self, roof: f64) -> Self {
		Self { roof, ..self }
	}

	pub const fn with_silhouette(self, silhouette: &'static [(f64, f64)]) -> Self {
		Self {
			silhouette: Some(silhouette),
			..self
		}
	}

	/// y of the flat roof (top of the bounding box).
	pub fn top(&self) -> f64 {
		TILE_HEIGHT - self.height
	}

	/// Depth below `top()` that the roofline may cut into.
	pub fn roof_clearance(&self) -> f64 {
		self.silhouette
			.map(|points| points.iter().map(|&(_, fy)| fy).fold(0.0, f64::max) * self.height)
			.unwrap_or(0.0)
	}

	/// Closed outline in tile coordinates.
	pub fn outline(&self) -> Vec<(f64, f64)> {
		let ground = TILE_HEIGHT;
		match self.silhouette {
			Some(points) => {
				let mut outline: Vec<(f64, f64)> = Vec::with_capacity(points.len() + 2);
				outline.push((self.x, ground));
				outline.extend(
					points
						.iter()
						.map(|&(fx, fy)| (self.x + fx * self.width, self.top() + fy * self.height)),
				);
				outline.push((self.x + self.width, ground));
				outline
			}
			None => vec![
				(self.x, ground),
				(self.x, self.top()),
				(self.x + self.width, self.top()),
				(self.x + self.width, ground),
			],
		}
	}
}

/// A lit window. Opacity pulses between `dim` and `bright` every `cycle`
/// seconds, starting after `delay`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
	/// Index of the owning building within its layer.
	pub building: usize,
	pub x: f64,
	pub y: f64,
	pub delay: f64,
	pub dim: f64,
	pub bright: f64,
	pub cycle: f64,
}

impl Window {
	/// Derive every animation parameter from one seed.
	fn from_seed(building: usize, x: f64, y: f64, seed: u32) -> Self {
		Self {
			building,
			x,
			y,
			delay: ((seed >> 7) % 64) as f64 * 0.125,
			dim: 0.12 + ((seed >> 13) % 16) as f64 * 0.01,
			bright: 0.65 + ((seed >> 17) % 32) as f64 * 0.01,
			cycle: 2.5 + ((seed >> 22) % 8) as f64 * 0.5,
		}
	}

	fn near(&self, x: f64, y: f64) -> bool {
		(self.x - x).abs() < FALLBACK_CLEARANCE && (self.y - y).abs() < FALLBACK_CLEARANCE
	}
}

/// A twinkling sky pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
	pub x: f64,
	pub y: f64,
	pub size: f64,
	pub delay: f64,
}

/// Static description of a layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerDef {
	pub depth: LayerDepth,
	/// Hash key distinguishing this layer's buildings from other layers'.
	pub seed: u32,
	/// Seconds per full horizontal loop.
	pub period: f64,
	/// Percent of candidate window cells that light up.
	pub density: u32,
	pub buildings: &'static [Building],
}

const STEPPED: &[(f64, f64)] = &[
	(0.0, 0.18),
	(0.25, 0.18),
	(0.25, 0.0),
	(0.75, 0.0),
	(0.75, 0.18),
	(1.0, 0.18),
];
const GABLE: &[(f64, f64)] = &[(0.0, 0.12), (0.5, 0.0), (1.0, 0.12)];
const SLANT: &[(f64, f64)] = &[(0.0, 0.0), (1.0, 0.2)];

const BACK: &[Building] = &[
	Building::new(0.0, 60.0, 190.0),
	Building::new(64.0, 44.0, 230.0),
	Building::new(112.0, 70.0, 170.0),
	Building::new(186.0, 50.0, 250.0).with_roof(14.0),
	Building::new(240.0, 80.0, 200.0).with_silhouette(STEPPED),
	Building::new(324.0, 56.0, 240.0),
	Building::new(384.0, 64.0, 180.0),
	Building::new(452.0, 48.0, 260.0).with_roof(18.0),
	Building::new(504.0, 76.0, 205.0),
	Building::new(584.0, 52.0, 235.0).with_silhouette(SLANT),
	Building::new(640.0, 70.0, 190.0),
	Building::new(714.0, 80.0, 220.0),
];

const MID: &[Building] = &[
	Building::new(10.0, 70.0, 150.0),
	Building::new(86.0, 54.0, 185.0).with_roof(10.0),
	Building::new(146.0, 90.0, 130.0),
	Building::new(240.0, 60.0, 200.0).with_silhouette(STEPPED),
	Building::new(306.0, 74.0, 160.0),
	Building::new(384.0, 50.0, 210.0),
	Building::new(440.0, 86.0, 140.0).with_silhouette(GABLE),
	Building::new(532.0, 62.0, 175.0),
	Building::new(600.0, 94.0, 155.0),
	Building::new(700.0, 90.0, 190.0).with_roof(12.0),
];

const FRONT: &[Building] = &[
	Building::new(0.0, 96.0, 110.0),
	Building::new(100.0, 72.0, 140.0).with_silhouette(GABLE),
	Building::new(178.0, 110.0, 95.0),
	Building::new(294.0, 64.0, 150.0).with_roof(8.0),
	Building::new(364.0, 120.0, 105.0),
	Building::new(490.0, 80.0, 130.0).with_silhouette(SLANT),
	Building::new(576.0, 104.0, 100.0),
	Building::new(686.0, 110.0, 125.0),
];

/// The built-in layer tables, back to front.
pub const LAYERS: [LayerDef; 3] = [
	LayerDef {
		depth: LayerDepth::Back,
		seed: 11,
		period: 300.0,
		density: 22,
		buildings: BACK,
	},
	LayerDef {
		depth: LayerDepth::Mid,
		seed: 23,
		period: 180.0,
		density: 28,
		buildings: MID,
	},
	LayerDef {
		depth: LayerDepth::Front,
		seed: 37,
		period: 90.0,
		density: 32,
		buildings: FRONT,
	},
];

fn building_key(layer_seed: u32, index: usize) -> u32 {
	layer_seed.wrapping_mul(1_000).wrapping_add(index as u32)
}

/// Scan each building's window grid and keep the cells whose hash falls under
/// `density` percent. Sparse buildings are topped up with fallback windows.
pub fn generate_windows(layer_seed: u32, buildings: &[Building], density: u32) -> Vec<Window> {
	let mut windows = Vec::new();

	for (index, building) in buildings.iter().enumerate() {
		let key = building_key(layer_seed, index);
		let clearance = building.roof_clearance();
		let body_top = building.top() + clearance;
		let usable_w = building.width - 2.0 * SIDE_MARGIN - WINDOW_WIDTH;
		let usable_h = building.height - clearance - TOP_MARGIN - BOTTOM_MARGIN - WINDOW_HEIGHT;
		let cols = if usable_w >= 0.0 {
			(usable_w / COL_STEP) as u32 + 1
		} else {
			0
		};
		let rows = if usable_h >= 0.0 {
			(usable_h / ROW_STEP) as u32 + 1
		} else {
			0
		};

		let first = windows.len();
		for row in 0..rows {
			for col in 0..cols {
				let seed = scene_hash(key, row, col);
				if seed % 100 >= density {
					continue;
				}
				let x = building.x + SIDE_MARGIN + col as f64 * COL_STEP;
				let y = body_top + TOP_MARGIN + row as f64 * ROW_STEP;
				windows.push(Window::from_seed(index, x, y, seed));
			}
		}

		if windows.len() - first < MIN_WINDOWS {
			add_fallback_windows(&mut windows, first, index, key, building);
		}
	}

	windows
}

fn add_fallback_windows(
	windows: &mut Vec<Window>,
	first: usize,
	index: usize,
	key: u32,
	building: &Building,
) {
	let clearance = building.roof_clearance();
	let body_top = building.top() + clearance;
	let body_height = building.height - clearance;
	let max_x = (building.x + building.width - WINDOW_WIDTH).max(building.x);
	let max_y = (TILE_HEIGHT - WINDOW_HEIGHT).max(body_top);

	for (slot, &(fx, fy)) in FALLBACK_SLOTS.iter().enumerate() {
		if windows.len() - first >= MIN_WINDOWS {
			break;
		}
		let x = (building.x + fx * building.width - WINDOW_WIDTH / 2.0).clamp(building.x, max_x);
		let y = (body_top + fy * body_height - WINDOW_HEIGHT / 2.0).clamp(body_top, max_y);
		if windows[first..].iter().any(|w| w.near(x, y)) {
			continue;
		}
		let seed = scene_hash(key, FALLBACK_ROW_BASE + slot as u32, 0);
		windows.push(Window::from_seed(index, x, y, seed));
	}
}

/// Seeded Fisher–Yates permutation of `0..n`.
pub fn reveal_order(seed: u32, n: usize) -> Vec<usize> {
	let mut order: Vec<usize> = (0..n).collect();
	for i in (1..n).rev() {
		let j = scene_hash(seed, i as u32, REVEAL_COL) as usize % (i + 1);
		order.swap(i, j);
	}
	order
}

/// Sky pixels spread across the tile inside the vertical `band`.
pub fn generate_stars(seed: u32, count: u32, band: (f64, f64)) -> Vec<Star> {
	(0..count)
		.map(|i| {
			let h1 = scene_hash(seed, i, 0);
			let h2 = scene_hash(seed, i, 1);
			Star {
				x: (h1 % ((TILE_WIDTH as u32 - 2) * 10)) as f64 / 10.0,
				y: band.0 + (h2 % 1_000) as f64 / 1_000.0 * (band.1 - band.0),
				size: 1.0 + ((h1 >> 20) % 2) as f64,
				delay: ((h2 >> 12) % 40) as f64 * 0.1,
			}
		})
		.collect()
}

/// A generated depth band.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayer {
	pub depth: LayerDepth,
	pub period: f64,
	pub buildings: Vec<Building>,
	pub windows: Vec<Window>,
	/// Building indices in reveal sequence.
	pub reveal_order: Vec<usize>,
}

impl SceneLayer {
	pub fn generate(def: &LayerDef) -> Self {
		Self {
			depth: def.depth,
			period: def.period,
			buildings: def.buildings.to_vec(),
			windows: generate_windows(def.seed, def.buildings, def.density),
			reveal_order: reveal_order(def.seed, def.buildings.len()),
		}
	}

	/// Position of `building` in the reveal sequence.
	pub fn reveal_rank(&self, building: usize) -> usize {
		self.reveal_order
			.iter()
			.position(|&b| b == building)
			.unwrap_or(building)
	}

	/// Fade-in delay for `building`, seconds.
	pub fn reveal_delay(&self, building: usize) -> f64 {
		self.reveal_rank(building) as f64 * REVEAL_STAGGER
	}

	/// Check that nothing escapes `[0, TILE_WIDTH)`; anything that did would
	/// show a gap or an overlap at the loop seam.
	pub fn validate(&self) -> Result<(), MotionError> {
		for b in &self.buildings {
			if b.x < 0.0 || b.x + b.width > TILE_WIDTH {
				return Err(MotionError::SceneOutOfTile {
					what: "building",
					x: if b.x < 0.0 { b.x } else { b.x + b.width },
					width: TILE_WIDTH,
				});
			}
		}
		for w in &self.windows {
			if w.x < 0.0 || w.x + WINDOW_WIDTH > TILE_WIDTH {
				return Err(MotionError::SceneOutOfTile {
					what: "window",
					x: w.x,
					width: TILE_WIDTH,
				});
			}
		}
		Ok(())
	}
}

/// All generated scene data.
#[derive(Clone, Debug, PartialEq)]
pub struct Skyline {
	/// Back to front.
	pub layers: Vec<SceneLayer>,
	pub stars: Vec<Star>,
}

impl Skyline {
	pub fn generate() -> Self {
		Self {
			layers: LAYERS.iter().map(SceneLayer::generate).collect(),
			stars: generate_stars(STAR_SEED, STAR_COUNT, STAR_BAND),
		}
	}

	pub fn layer(&self, depth: LayerDepth) -> Option<&SceneLayer> {
		self.layers.iter().find(|l| l.depth == depth)
	}

	pub fn validate(&self) -> Result<(), MotionError> {
		for layer in &self.layers {
			layer.validate()?;
		}
		if let Some(star) = self
			.stars
			.iter()
			.find(|s| s.x < 0.0 || s.x + s.size > TILE_WIDTH)
		{
			return Err(MotionError::SceneOutOfTile {
				what: "star",
				x: star.x,
				width: TILE_WIDTH,
			});
		}
		Ok(())
	}
}

static SKYLINE: LazyLock<Skyline> = LazyLock::new(Skyline::generate);

/// The process-wide skyline, generated on first use.
pub fn skyline() -> &'static Skyline {
	&SKYLINE
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generation_is_deterministic() {
		let a = Skyline::generate();
		let b = Skyline::generate();
		assert_eq!(a, b);
		assert_eq!(&a, skyline());
	}

	#[test]
	fn hash_is_pinned() {
		// Changing the hash would silently reshuffle every window.
		assert_eq!(scene_hash(0, 0, 0), 0);
		assert_eq!(scene_hash(1, 2, 3), scene_hash(1, 2, 3));
		assert_ne!(scene_hash(1, 2, 3), scene_hash(1, 3, 2));
	}

	#[test]
	fn built_in_layers_stay_inside_tile() {
		skyline().validate().unwrap();
	}

	#[test]
	fn density_roughly_matches_threshold() {
		let buildings = [Building::new(0.0, 400.0, 290.0)];
		let windows = generate_windows(99, &buildings, 30);
		// 43 cols x 25 rows of candidate cells.
		let ratio = windows.len() as f64 / 1075.0;
		assert!(ratio > 0.2 && ratio < 0.4, "acceptance {ratio}");
	}

	#[test]
	fn window_parameters_come_from_bit_slices() {
		for w in &skyline().layers[1].windows {
			assert!((0.0..8.0).contains(&w.delay));
			assert!(w.dim < w.bright);
			assert!((0.12..0.28).contains(&w.dim));
			assert!((0.65..0.97).contains(&w.bright));
			assert!((2.5..=6.0).contains(&w.cycle));
		}
	}

	#[test]
	fn narrow_building_gets_fallback_windows() {
		let buildings = [Building::new(100.0, 14.0, 60.0)];
		// Density 0 rejects every candidate cell.
		let windows = generate_windows(5, &buildings, 0);
		assert!(!windows.is_empty());
		assert!(windows.len() <= MIN_WINDOWS);
		for w in &windows {
			assert!(w.x >= 100.0 && w.x + WINDOW_WIDTH <= 114.0);
		}
		for (i, a) in windows.iter().enumerate() {
			for b in &windows[i + 1..] {
				assert!(!a.near(b.x, b.y), "fallbacks overlap: {a:?} {b:?}");
			}
		}
	}

	#[test]
	fn fallback_skips_slots_next_to_accepted_windows() {
		let building = Building::new(0.0, 40.0, 80.0);
		let accepted = Window::from_seed(0, 40.0 * 0.3 - WINDOW_WIDTH / 2.0, 220.0 + 80.0 * 0.3 - 2.5, 7);
		let mut windows = vec![accepted];
		add_fallback_windows(&mut windows, 0, 0, building_key(1, 0), &building);
		assert_eq!(windows.len(), MIN_WINDOWS);
		assert_eq!(windows.iter().filter(|w| w.near(accepted.x, accepted.y)).count(), 1);
	}

	#[test]
	fn sparse_grid_is_topped_up_to_minimum() {
		let buildings = [Building::new(0.0, 60.0, 120.0)];
		let windows = generate_windows(3, &buildings, 0);
		assert_eq!(windows.len(), MIN_WINDOWS);
	}

	#[test]
	fn reveal_order_is_a_shuffled_permutation() {
		let order = reveal_order(11, 12);
		let mut sorted = order.clone();
		sorted.sort_unstable();
		assert_eq!(sorted, (0..12).collect::<Vec<_>>());
		assert_ne!(order, (0..12).collect::<Vec<_>>());
		assert_eq!(order, reveal_order(11, 12));
	}

	#[test]
	fn reveal_delay_follows_rank() {
		let layer = &skyline().layers[0];
		let first = layer.reveal_order[0];
		assert_eq!(layer.reveal_delay(first), 0.0);
		let last = *layer.reveal_order.last().unwrap();
		let expected = (layer.buildings.len() - 1) as f64 * REVEAL_STAGGER;
		assert!((layer.reveal_delay(last) - expected).abs() < 1e-12);
	}

	#[test]
	fn escaped_building_fails_validation() {
		let mut layer = skyline().layers[2].clone();
		layer.buildings.push(Building::new(780.0, 40.0, 50.0));
		let err = layer.validate().unwrap_err();
		assert_eq!(
			err,
			MotionError::SceneOutOfTile {
				what: "building",
				x: 820.0,
				width: TILE_WIDTH,
			}
		);
	}

	#[test]
	fn silhouette_outline_closes_on_ground() {
		let b = Building::new(10.0, 100.0, 100.0).with_silhouette(GABLE);
		let outline = b.outline();
		assert_eq!(outline.first(), Some(&(10.0, TILE_HEIGHT)));
		assert_eq!(outline.last(), Some(&(110.0, TILE_HEIGHT)));
		assert_eq!(outline[2], (60.0, TILE_HEIGHT - 100.0));
		assert!((b.roof_clearance() - 12.0).abs() < 1e-9);
	}

	#[test]
	fn stars_stay_in_band() {
		for s in &skyline().stars {
			assert!(s.y >= STAR_BAND.0 && s.y <= STAR_BAND.1);
			assert!(s.x >= 0.0 && s.x < TILE_WIDTH);
		}
	}
}
