//! Reduced-motion and capability gate.
//!
//! The gate is read once at start-up and handed to components as a prop.
//! Changing the OS preference takes effect on the next page load.

use log::info;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::error::MotionError;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const FINE_POINTER_QUERY: &str = "(pointer: fine)";

/// Environment facts that decide whether anything animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionGate {
	/// The user asked for reduced motion.
	pub reduced_motion: bool,
	/// A mouse/trackpad-class pointer is present.
	pub fine_pointer: bool,
	/// A 2D canvas context can be created.
	pub canvas: bool,
}

impl MotionGate {
	/// Everything available, nothing reduced.
	pub const FULL: Self = Self {
		reduced_motion: false,
		fine_pointer: true,
		canvas: true,
	};

	/// Reduced motion requested.
	pub const REDUCED: Self = Self {
		reduced_motion: true,
		fine_pointer: true,
		canvas: true,
	};

	/// Probe the browser. Without a window nothing animates.
	pub fn detect() -> Self {
		let Some(window) = web_sys::window() else {
			return Self {
				reduced_motion: true,
				fine_pointer: false,
				canvas: false,
			};
		};
		let gate = Self {
			reduced_motion: media_matches(&window, REDUCED_MOTION_QUERY),
			fine_pointer: media_matches(&window, FINE_POINTER_QUERY),
			canvas: probe_canvas(&window),
		};
		info!(
			"skyline-hero: motion gate reduced={} fine_pointer={} canvas={}",
			gate.reduced_motion, gate.fine_pointer, gate.canvas
		);
		gate
	}

	/// Whether time-driven animation may run at all.
	pub fn animates(&self) -> bool {
		!self.reduced_motion
	}

	/// Whether the particle canvas may mount.
	pub fn particles(&self) -> bool {
		self.animates() && self.canvas
	}

	/// Whether pointer-driven effects (repulsion, trail) may run.
	pub fn pointer_effects(&self) -> bool {
		self.animates() && self.fine_pointer
	}
}

fn media_matches(window: &Window, query: &str) -> bool {
	window
		.match_media(query)
		.ok()
		.flatten()
		.is_some_and(|list| list.matches())
}

fn probe_canvas(window: &Window) -> bool {
	let Some(document) = window.document() else {
		return false;
	};
	document
		.create_element("canvas")
		.ok()
		.and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
		.is_some_and(|canvas| canvas_context(&canvas).is_ok())
}

/// 2D context of `canvas`.
pub fn canvas_context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, MotionError> {
	canvas
		.get_context("2d")
		.map_err(|_| MotionError::NoCanvasContext("get_context threw".to_string()))?
		.ok_or_else(|| MotionError::NoCanvasContext("2d unsupported".to_string()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| MotionError::NoCanvasContext("unexpected context type".to_string()))
}

/// Device-pixel-ratio clamp for canvas pixel buffers.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(from = "(f64, f64)")]
pub struct DprRange {
	/// Lower bound.
	pub min: f64,
	/// Upper bound.
	pub max: f64,
}

impl From<(f64, f64)> for DprRange {
	fn from((a, b): (f64, f64)) -> Self {
		Self {
			min: a.min(b),
			max: a.max(b),
		}
	}
}

impl DprRange {
	/// Clamp a reported ratio; non-finite or non-positive input maps to `min`.
	pub fn clamp(&self, dpr: f64) -> f64 {
		if !dpr.is_finite() || dpr <= 0.0 {
			return self.min;
		}
		dpr.clamp(self.min, self.max)
	}

	/// Pixel buffer size for a CSS size at the given device ratio.
	pub fn buffer_size(&self, css_width: f64, css_height: f64, dpr: f64) -> (u32, u32) {
		let ratio = self.clamp(dpr);
		(
			(css_width * ratio).round().max(1.0) as u32,
			(css_height * ratio).round().max(1.0) as u32,
		)
	}
}
