//! Error taxonomy for the animation layer.
//!
//! None of these ever reach the page content: components log them and swap
//! to their static fallback.

use thiserror::Error;

/// Failures the decorative animation layer can run into.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
	/// No global `window` (e.g. running outside a browser).
	#[error("no browser window available")]
	NoWindow,

	/// The canvas refused to hand out a rendering context.
	#[error("canvas context unavailable: {0}")]
	NoCanvasContext(String),

	/// Scene geometry escaped its loop tile, which would break the seam.
	#[error("{what} at x={x} lies outside tile [0, {width})")]
	SceneOutOfTile {
		/// Kind of element that escaped ("building", "window", "star").
		what: &'static str,
		/// Offending horizontal coordinate (right edge for buildings).
		x: f64,
		/// Tile width the element must fit in.
		width: f64,
	},

	/// Motion config JSON could not be parsed.
	#[error("invalid motion config: {0}")]
	Config(String),
}
