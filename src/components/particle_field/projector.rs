//! Camera and rotation math mapping the screen pointer into the field's
//! local frame.
//!
//! Repulsion is computed against base positions, which live in the field's
//! unrotated local space. The pointer therefore has to be un-projected onto
//! the field plane and then carried back through the inverse of the field's
//! current rotation. The inverse is derived mechanically from
//! [`FieldRotation::steps`] (reverse order, negated angles) so tuning the
//! forward rotation can never leave the two out of sync.

use glam::{Mat3, Vec3};

use crate::pointer::PointerNdc;

/// Rotation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
	Z,
}

/// A single rotation about one axis, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationStep {
	pub axis: Axis,
	pub angle: f32,
}

impl RotationStep {
	pub fn matrix(&self) -> Mat3 {
		match self.axis {
			Axis::X => Mat3::from_rotation_x(self.angle),
			Axis::Y => Mat3::from_rotation_y(self.angle),
			Axis::Z => Mat3::from_rotation_z(self.angle),
		}
	}

	pub fn inverse(&self) -> Self {
		Self {
			axis: self.axis,
			angle: -self.angle,
		}
	}
}

/// Orientation of the particle cloud: a static X tilt, a continuously
/// advancing Y spin, and an outer static Z tilt.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldRotation {
	pub tilt_x: f32,
	pub spin_y: f32,
	pub tilt_z: f32,
}

impl FieldRotation {
	pub fn new(tilt_x: f32, spin_y: f32, tilt_z: f32) -> Self {
		Self {
			tilt_x,
			spin_y,
			tilt_z,
		}
	}

	/// Forward composition, applied first to last to a local vector.
	pub fn steps(&self) -> [RotationStep; 3] {
		[
			RotationStep {
				axis: Axis::X,
				angle: self.tilt_x,
			},
			RotationStep {
				axis: Axis::Y,
				angle: self.spin_y,
			},
			RotationStep {
				axis: Axis::Z,
				angle: self.tilt_z,
			},
		]
	}

	/// Local → world.
	pub fn apply(&self, v: Vec3) -> Vec3 {
		self.steps().iter().fold(v, |v, step| step.matrix() * v)
	}

	/// World → local.
	pub fn apply_inverse(&self, v: Vec3) -> Vec3 {
		self.steps()
			.iter()
			.rev()
			.fold(v, |v, step| step.inverse().matrix() * v)
	}

	/// The forward composition as one matrix, for transforming whole buffers.
	pub fn matrix(&self) -> Mat3 {
		self.steps()
			.iter()
			.fold(Mat3::IDENTITY, |m, step| step.matrix() * m)
	}
}

/// Perspective camera on the +Z axis looking at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	/// Vertical field of view, degrees.
	pub fov_deg: f32,
	/// Distance to the field plane `z = 0`.
	pub distance: f32,
	/// Width / height of the render surface.
	pub aspect: f32,
}

/// Points closer to the camera than this are culled.
const NEAR: f32 = 0.1;

impl Camera {
	pub fn new(fov_deg: f32, distance: f32, aspect: f32) -> Self {
		Self {
			fov_deg,
			distance,
			aspect,
		}
	}

	pub fn set_viewport(&mut self, width: f64, height: f64) {
		if width > 0.0 && height > 0.0 {
			self.aspect = (width / height) as f32;
		}
	}

	fn tan_half_fov(&self) -> f32 {
		(self.fov_deg.to_radians() / 2.0).tan()
	}

	/// Half width and half height of the view at the field plane.
	pub fn half_extents(&self) -> (f32, f32) {
		let half_height = self.tan_half_fov() * self.distance;
		(half_height * self.aspect, half_height)
	}

	/// NDC → world point on the field plane.
	pub fn unproject_ndc(&self, ndc: PointerNdc) -> Vec3 {
		let (half_width, half_height) = self.half_extents();
		Vec3::new(ndc.x as f32 * half_width, ndc.y as f32 * half_height, 0.0)
	}

	/// World → `(ndc_x, ndc_y, scale)` where `scale` is the perspective size
	/// factor relative to the field plane. `None` when behind the near plane.
	pub fn project(&self, world: Vec3) -> Option<(f32, f32, f32)> {
		let depth = self.distance - world.z;
		if depth < NEAR {
			return None;
		}
		let half_height = self.tan_half_fov() * depth;
		let half_width = half_height * self.aspect;
		Some((
			world.x / half_width,
			world.y / half_height,
			self.distance / depth,
		))
	}
}

/// Pointer position in the field's local frame.
pub fn pointer_to_local(ndc: PointerNdc, camera: &Camera, rotation: &FieldRotation) -> Vec3 {
	rotation.apply_inverse(camera.unproject_ndc(ndc))
}

#[cfg(test)]
mod tests {
	use std::f32::consts::{FRAC_PI_2, PI};

	use super::*;

	const EPS: f32 = 1e-5;

	fn close(a: Vec3, b: Vec3) -> bool {
		(a - b).length() < EPS
	}

	fn camera() -> Camera {
		Camera::new(90.0, 5.0, 2.0)
	}

	#[test]
	fn unprojects_onto_field_plane() {
		let world = camera().unproject_ndc(PointerNdc { x: 0.5, y: -0.5 });
		assert!(close(world, Vec3::new(5.0, -2.5, 0.0)), "{world}");
	}

	#[test]
	fn zero_rotation_is_identity() {
		let ndc = PointerNdc { x: 0.3, y: 0.8 };
		let local = pointer_to_local(ndc, &camera(), &FieldRotation::default());
		assert!(close(local, camera().unproject_ndc(ndc)));
	}

	#[test]
	fn quarter_spin_matches_hand_computation() {
		// World (5, 0, 0) under a +90° Y spin came from local (0, 0, 5).
		let rotation = FieldRotation::new(0.0, FRAC_PI_2, 0.0);
		let local = pointer_to_local(PointerNdc { x: 0.5, y: 0.0 }, &camera(), &rotation);
		assert!(close(local, Vec3::new(0.0, 0.0, 5.0)), "{local}");
	}

	#[test]
	fn composed_tilts_match_hand_computation() {
		// Rz(-90°) takes (1,0,0) to (0,-1,0); Rx(-90°) then takes it to (0,0,1).
		let rotation = FieldRotation::new(FRAC_PI_2, 0.0, FRAC_PI_2);
		let local = rotation.apply_inverse(Vec3::X);
		assert!(close(local, Vec3::Z), "{local}");
		assert!(close(rotation.apply(Vec3::Z), Vec3::X));
	}

	#[test]
	fn inverse_undoes_forward_under_accumulated_spin() {
		let v = Vec3::new(1.2, -0.4, 2.5);
		for i in 0..50 {
			let rotation = FieldRotation::new(0.35, i as f32 * 0.37, -0.2);
			assert!(close(rotation.apply_inverse(rotation.apply(v)), v));
			assert!(close(rotation.apply(rotation.apply_inverse(v)), v));
		}
	}

	#[test]
	fn local_pointer_maps_back_to_screen_pointer() {
		// The repulsion bubble must sit under the cursor at any spin.
		let cam = camera();
		let ndc = PointerNdc { x: -0.4, y: 0.25 };
		for spin in [0.0, 1.0, PI, 5.5] {
			let rotation = FieldRotation::new(0.35, spin, -0.2);
			let local = pointer_to_local(ndc, &cam, &rotation);
			let (x, y, scale) = cam.project(rotation.apply(local)).unwrap();
			assert!((x - ndc.x as f32).abs() < EPS);
			assert!((y - ndc.y as f32).abs() < EPS);
			assert!((scale - 1.0).abs() < EPS);
		}
	}

	#[test]
	fn matrix_agrees_with_step_application() {
		let rotation = FieldRotation::new(0.35, 2.1, -0.2);
		let v = Vec3::new(-3.0, 0.5, 1.0);
		assert!(close(rotation.matrix() * v, rotation.apply(v)));
	}

	#[test]
	fn points_behind_camera_are_culled() {
		assert!(camera().project(Vec3::new(0.0, 0.0, 5.0)).is_none());
		assert!(camera().project(Vec3::new(0.0, 0.0, 4.0)).is_some());
	}

	#[test]
	fn viewport_sets_aspect() {
		let mut cam = camera();
		cam.set_viewport(1600.0, 800.0);
		assert_eq!(cam.aspect, 2.0);
		cam.set_viewport(0.0, 800.0);
		assert_eq!(cam.aspect, 2.0);
	}
}
