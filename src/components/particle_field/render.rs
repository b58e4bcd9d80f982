//! Canvas rendering for the particle field.
//!
//! The context transform is set to the device pixel ratio once per frame, so
//! everything below works in CSS pixels.

use glam::{Mat3, Vec3};
use web_sys::CanvasRenderingContext2d;

use super::field::FieldDriver;
use super::projector::Camera;

/// CSS size of the canvas and the pixel ratio its buffer was sized with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
	pub width: f64,
	pub height: f64,
	pub ratio: f64,
}

/// A particle projected to canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
	pub x: f64,
	pub y: f64,
	/// Perspective size factor, 1 at the field plane.
	pub scale: f64,
}

/// Project a local-space position through the field rotation and camera.
pub fn screen_point(camera: &Camera, rotation: &Mat3, local: Vec3, surface: &Surface) -> Option<ScreenPoint> {
	let (nx, ny, scale) = camera.project(*rotation * local)?;
	Some(ScreenPoint {
		x: (nx as f64 + 1.0) * 0.5 * surface.width,
		y: (1.0 - ny as f64) * 0.5 * surface.height,
		scale: scale as f64,
	})
}

/// Nearer particles read brighter.
fn depth_alpha(scale: f64) -> f64 {
	(scale * 0.7).clamp(0.3, 1.0)
}

/// Draws the field's current positions.
pub fn render(ctx: &CanvasRenderingContext2d, driver: &FieldDriver, surface: &Surface, point_size: f64) {
	let _ = ctx.set_transform(surface.ratio, 0.0, 0.0, surface.ratio, 0.0, 0.0);
	ctx.clear_rect(0.0, 0.0, surface.width, surface.height);
	let _ = ctx.set_global_composite_operation("lighter");

	let field = driver.field();
	let rotation = driver.rotation().matrix();
	for i in 0..field.len() {
		let Some(p) = screen_point(driver.camera(), &rotation, field.position(i), surface) else {
			continue;
		};
		if p.x < 0.0 || p.y < 0.0 || p.x > surface.width || p.y > surface.height {
			continue;
		}
		let [r, g, b] = field.color(i);
		ctx.set_fill_style_str(&format!(
			"rgba({}, {}, {}, {:.3})",
			(r * 255.0) as u8,
			(g * 255.0) as u8,
			(b * 255.0) as u8,
			depth_alpha(p.scale)
		));
		let size = point_size * p.scale;
		ctx.fill_rect(p.x - size / 2.0, p.y - size / 2.0, size, size);
	}

	let _ = ctx.set_global_composite_operation("source-over");
}

#[cfg(test)]
mod tests {
	use super::*;

	const SURFACE: Surface = Surface {
		width: 800.0,
		height: 400.0,
		ratio: 2.0,
	};

	#[test]
	fn origin_lands_in_canvas_center() {
		let camera = Camera::new(60.0, 12.0, 2.0);
		let p = screen_point(&camera, &Mat3::IDENTITY, Vec3::ZERO, &SURFACE).unwrap();
		assert_eq!((p.x, p.y, p.scale), (400.0, 200.0, 1.0));
	}

	#[test]
	fn up_in_world_is_up_on_screen() {
		let camera = Camera::new(60.0, 12.0, 2.0);
		let p = screen_point(&camera, &Mat3::IDENTITY, Vec3::new(0.0, 1.0, 0.0), &SURFACE).unwrap();
		assert!(p.y < 200.0);
	}

	#[test]
	fn nearer_points_are_larger_and_brighter() {
		let camera = Camera::new(60.0, 12.0, 2.0);
		let near = screen_point(&camera, &Mat3::IDENTITY, Vec3::new(0.0, 0.0, 5.0), &SURFACE).unwrap();
		let far = screen_point(&camera, &Mat3::IDENTITY, Vec3::new(0.0, 0.0, -5.0), &SURFACE).unwrap();
		assert!(near.scale > far.scale);
		assert!(depth_alpha(near.scale) >= depth_alpha(far.scale));
	}
}
