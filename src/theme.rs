//! Colors and palettes shared by the skyline, particle field and trail.

use crate::components::skyline::LayerDepth;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Channels as `[0, 1]` floats, for packing into vertex color buffers.
	pub fn to_unit_rgb(self) -> [f32; 3] {
		[
			self.r as f32 / 255.0,
			self.g as f32 / 255.0,
			self.b as f32 / 255.0,
		]
	}

	/// Parse `#rrggbb`. Anything else yields mid gray.
	pub fn from_hex(hex: &str) -> Self {
		let channel = |range: std::ops::Range<usize>| {
			hex.get(range)
				.and_then(|s| u8::from_str_radix(s, 16).ok())
				.unwrap_or(128)
		};
		if hex.starts_with('#') && hex.len() == 7 {
			Color::rgb(channel(1..3), channel(3..5), channel(5..7))
		} else {
			Color::rgb(128, 128, 128)
		}
	}
}

/// Two-tone particle palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPalette {
	pub primary: Color,
	pub accent: Color,
	/// Share of particles drawn in `accent`.
	pub accent_weight: f32,
}

impl FieldPalette {
	/// Weighted pick for a uniform sample `u` in `[0, 1)`.
	pub fn pick(&self, u: f32) -> Color {
		if u < self.accent_weight {
			self.accent
		} else {
			self.primary
		}
	}
}

/// Night-city skyline colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkylinePalette {
	pub sky_top: Color,
	pub sky_bottom: Color,
	pub back: Color,
	pub mid: Color,
	pub front: Color,
	pub window: Color,
	pub star: Color,
}

impl SkylinePalette {
	/// Dusky violet sky with amber windows (default)
	pub fn dusk() -> Self {
		Self {
			sky_top: Color::rgb(14, 16, 32),
			sky_bottom: Color::rgb(46, 34, 72),
			back: Color::rgb(38, 40, 70),
			mid: Color::rgb(27, 28, 52),
			front: Color::rgb(16, 17, 33),
			window: Color::rgb(255, 204, 120),
			star: Color::rgb(235, 235, 255),
		}
	}

	pub fn building(&self, depth: LayerDepth) -> Color {
		match depth {
			LayerDepth::Back => self.back,
			LayerDepth::Mid => self.mid,
			LayerDepth::Front => self.front,
		}
	}
}

impl Default for SkylinePalette {
	fn default() -> Self {
		Self::dusk()
	}
}
