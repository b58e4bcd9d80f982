//! Tuning configuration for the particle field, camera, scroll and trail.
//!
//! Loaded from an optional `<script id="motion-config" type="application/json">`
//! element. Every section defaults independently, so a page may override a
//! single value. Scene-generator constants are not part of this on purpose:
//! the skyline must come out identical on every load.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::error::MotionError;
use crate::motion::DprRange;

/// Element id the config is read from.
pub const CONFIG_ELEMENT_ID: &str = "motion-config";

/// Particle field tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
	/// Number of particles. Fixed for the lifetime of a field.
	pub count: usize,
	/// Outer radius of the sampled sphere, in world units.
	pub radius: f32,
	/// Exponent `p` in `radius = U^p * R`; below 1 packs the core.
	pub radius_bias: f32,
	/// Pointer influence radius in local space; repulsion is zero beyond it.
	pub interaction_radius: f32,
	/// Peak displacement at the pointer.
	pub repulsion_strength: f32,
	/// Spin around Y, radians per second.
	pub spin_speed: f32,
	/// Static tilt around X, radians.
	pub tilt_x: f32,
	/// Outer static tilt around Z, radians.
	pub tilt_z: f32,
	/// Amplitude of the ambient x/y sway.
	pub drift_amplitude: f32,
	/// Amplitude of the z-only twinkle.
	pub twinkle_amplitude: f32,
	/// Point size in CSS pixels at unit depth.
	pub point_size: f64,
	/// Dominant particle color (`#rrggbb`).
	pub primary: String,
	/// Secondary particle color (`#rrggbb`).
	pub accent: String,
	/// Fraction of particles using `accent`.
	pub accent_weight: f32,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			count: 2400,
			radius: 6.0,
			radius_bias: 0.5,
			interaction_radius: 4.0,
			repulsion_strength: 0.25,
			spin_speed: 0.05,
			tilt_x: 0.35,
			tilt_z: -0.2,
			drift_amplitude: 0.04,
			twinkle_amplitude: 0.03,
			point_size: 1.6,
			primary: "#8ab4f8".to_string(),
			accent: "#f5a97f".to_string(),
			accent_weight: 0.3,
		}
	}
}

/// Perspective camera looking down -Z at the field origin.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
	/// Vertical field of view in degrees.
	pub fov_deg: f32,
	/// Distance from the camera to the field's nominal plane (z = 0).
	pub distance: f32,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			fov_deg: 60.0,
			distance: 12.0,
		}
	}
}

/// Render surface options.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
	/// Device-pixel-ratio cap `[min, max]` for canvas buffers.
	pub dpr_range: DprRange,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			dpr_range: DprRange { min: 1.0, max: 2.0 },
		}
	}
}

/// Pinned-scroll tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
	/// Progress beyond which the particle field stops simulating.
	pub pause_threshold: f64,
	/// Height of the pinned wrapper in viewport heights.
	pub pinned_viewports: f64,
}

impl Default for ScrollConfig {
	fn default() -> Self {
		Self {
			pause_threshold: 0.6,
			pinned_viewports: 2.5,
		}
	}
}

/// Cursor trail tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
	/// Ring buffer capacity.
	pub capacity: usize,
	/// Seconds before a sample fully fades.
	pub lifetime: f64,
	/// Dot radius in CSS pixels for the newest sample.
	pub size: f64,
	/// Trail color (`#rrggbb`).
	pub color: String,
}

impl Default for TrailConfig {
	fn default() -> Self {
		Self {
			capacity: 24,
			lifetime: 0.45,
			size: 3.0,
			color: "#f5a97f".to_string(),
		}
	}
}

/// Complete motion configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
	/// Particle field.
	pub field: FieldConfig,
	/// Camera.
	pub camera: CameraConfig,
	/// Render surface.
	pub render: RenderConfig,
	/// Pinned scroll.
	pub scroll: ScrollConfig,
	/// Cursor trail.
	pub trail: TrailConfig,
}

impl MotionConfig {
	/// Parse a config document.
	pub fn from_json(text: &str) -> Result<Self, MotionError> {
		serde_json::from_str(text).map_err(|e| MotionError::Config(e.to_string()))
	}

	/// Load the config from the DOM, falling back to defaults.
	pub fn load() -> Self {
		let Some(text) = config_text() else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!(
					"skyline-hero: motion config loaded ({} particles)",
					config.field.count
				);
				config
			}
			Err(e) => {
				warn!("skyline-hero: {e}; using defaults");
				Self::default()
			}
		}
	}
}

fn config_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}
