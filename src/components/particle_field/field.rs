//! Particle cloud simulation.
//!
//! Positions, base positions and colors live in flat `Box<[f32]>` arenas
//! (`[x, y, z, x, y, z, ...]`) sized once at construction. Per-frame work
//! only overwrites `positions`; nothing is allocated while the field runs.

use std::f32::consts::TAU;

use glam::Vec3;
use log::debug;

use super::projector::{Camera, FieldRotation, pointer_to_local};
use crate::components::skyline::scene::scene_hash;
use crate::config::{CameraConfig, FieldConfig};
use crate::pointer::PointerNdc;
use crate::theme::{Color, FieldPalette};

/// Keeps particle hashes apart from the skyline's building keys.
const FIELD_SEED: u32 = 0xF1E1_D000;

/// Largest time step fed to the spin, so a stalled tab does not lurch.
const MAX_STEP: f64 = 0.1;

/// Uniform sample in `[0, 1)` from 24 hash bits.
fn unit(h: u32) -> f32 {
	(h >> 8) as f32 / (1u32 << 24) as f32
}

/// Displacement away from the pointer.
///
/// Falls off linearly from `strength` at the pointer to zero at `radius`,
/// and is exactly zero at or beyond it. A particle sitting on the pointer has
/// no direction to be pushed in and stays put.
pub fn repulsion(base: Vec3, pointer: Vec3, radius: f32, strength: f32) -> Vec3 {
	let away = base - pointer;
	let distance = away.length();
	if distance >= radius || distance == 0.0 {
		return Vec3::ZERO;
	}
	away / distance * ((1.0 - distance / radius) * strength)
}

/// Fixed-size particle cloud.
#[derive(Clone, Debug)]
pub struct ParticleField {
	count: usize,
	base: Box<[f32]>,
	positions: Box<[f32]>,
	colors: Box<[f32]>,
	phases: Box<[f32]>,
	rates: Box<[f32]>,
	interaction_radius: f32,
	repulsion_strength: f32,
	drift_amplitude: f32,
	twinkle_amplitude: f32,
}

impl ParticleField {
	/// Sample `config.count` particles inside a sphere.
	///
	/// Radius is `U^p * R` with `p = radius_bias`, so `p < 1` packs the
	/// core. Sampling is hash-driven and identical on every load.
	pub fn new(config: &FieldConfig) -> Self {
		let palette = FieldPalette {
			primary: Color::from_hex(&config.primary),
			accent: Color::from_hex(&config.accent),
			accent_weight: config.accent_weight,
		};
		let count = config.count;
		let mut base = vec![0.0; count * 3].into_boxed_slice();
		let mut colors = vec![0.0; count * 3].into_boxed_slice();
		let mut phases = vec![0.0; count].into_boxed_slice();
		let mut rates = vec![0.0; count].into_boxed_slice();

		for i in 0..count {
			let u = |k: u32| unit(scene_hash(FIELD_SEED, i as u32, k));
			let r = u(0).powf(config.radius_bias) * config.radius;
			let cos_theta = 2.0 * u(1) - 1.0;
			let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
			let phi = TAU * u(2);

			base[i * 3] = r * sin_theta * phi.cos();
			base[i * 3 + 1] = r * sin_theta * phi.sin();
			base[i * 3 + 2] = r * cos_theta;
			colors[i * 3..i * 3 + 3].copy_from_slice(&palette.pick(u(3)).to_unit_rgb());
			phases[i] = TAU * u(4);
			rates[i] = 0.6 + 0.8 * u(5);
		}

		debug!("skyline-hero: sampled {count} particles");
		Self {
			count,
			positions: base.clone(),
			base,
			colors,
			phases,
			rates,
			interaction_radius: config.interaction_radius,
			repulsion_strength: config.repulsion_strength,
			drift_amplitude: config.drift_amplitude,
			twinkle_amplitude: config.twinkle_amplitude,
		}
	}

	pub fn len(&self) -> usize {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	pub fn base_positions(&self) -> &[f32] {
		&self.base
	}

	pub fn positions(&self) -> &[f32] {
		&self.positions
	}

	pub fn colors(&self) -> &[f32] {
		&self.colors
	}

	pub fn base(&self, i: usize) -> Vec3 {
		Vec3::from_slice(&self.base[i * 3..i * 3 + 3])
	}

	pub fn position(&self, i: usize) -> Vec3 {
		Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
	}

	pub fn color(&self, i: usize) -> [f32; 3] {
		[self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]]
	}

	/// Ambient sway (x/y) plus twinkle (z) for particle `i` at `t` seconds.
	fn ambient(&self, i: usize, t: f32) -> Vec3 {
		let (phase, rate) = (self.phases[i], self.rates[i]);
		Vec3::new(
			(t * 0.6 * rate + phase).sin() * self.drift_amplitude,
			(t * 0.5 * rate + phase * 1.3).cos() * self.drift_amplitude,
			(t * 1.7 * rate + phase * 0.7).sin() * self.twinkle_amplitude,
		)
	}

	/// Recompute every position from its base: ambient motion plus
	/// repulsion from `pointer`, given in the field's local frame.
	pub fn step(&mut self, t: f32, pointer: Option<Vec3>) {
		for i in 0..self.count {
			let base = self.base(i);
			let push = pointer
				.map(|p| repulsion(base, p, self.interaction_radius, self.repulsion_strength))
				.unwrap_or(Vec3::ZERO);
			let p = base + self.ambient(i, t) + push;
			self.positions[i * 3..i * 3 + 3].copy_from_slice(&p.to_array());
		}
	}
}

/// What the field did on its last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldState {
	/// Simulating with no pointer.
	#[default]
	Idle,
	/// Simulating with repulsion from the pointer.
	Active,
	/// Scrolled past the pause threshold; no per-frame work.
	Paused,
}

/// One frame's inputs, sampled by the caller before anything runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
	/// Seconds since the loop started.
	pub time: f64,
	/// Pointer in NDC, already gated by pointer capability.
	pub pointer: Option<PointerNdc>,
	pub paused: bool,
}

/// Field plus its camera and rotation, advanced once per frame.
#[derive(Clone, Debug)]
pub struct FieldDriver {
	field: ParticleField,
	camera: Camera,
	rotation: FieldRotation,
	spin_speed: f32,
	last_time: Option<f64>,
	state: FieldState,
	steps: u64,
	pointer: Option<Vec3>,
}

impl FieldDriver {
	pub fn new(field: &FieldConfig, camera: &CameraConfig, aspect: f32) -> Self {
		Self {
			field: ParticleField::new(field),
			camera: Camera::new(camera.fov_deg, camera.distance, aspect),
			rotation: FieldRotation::new(field.tilt_x, 0.0, field.tilt_z),
			spin_speed: field.spin_speed,
			last_time: None,
			state: FieldState::Idle,
			steps: 0,
			pointer: None,
		}
	}

	/// Advance one frame. Returns whether the field was simulated, i.e.
	/// whether there is anything new to draw.
	pub fn frame(&mut self, input: FrameInput) -> bool {
		if input.paused {
			self.state = FieldState::Paused;
			// Resume without a spin jump.
			self.last_time = None;
			return false;
		}

		let dt = self
			.last_time
			.map(|last| (input.time - last).clamp(0.0, MAX_STEP))
			.unwrap_or(0.0);
		self.last_time = Some(input.time);
		self.rotation.spin_y = (self.rotation.spin_y + self.spin_speed * dt as f32) % TAU;

		let pointer = input
			.pointer
			.map(|ndc| pointer_to_local(ndc, &self.camera, &self.rotation));
		self.state = if pointer.is_some() {
			FieldState::Active
		} else {
			FieldState::Idle
		};
		self.field.step(input.time as f32, pointer);
		self.pointer = pointer;
		self.steps += 1;
		true
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.set_viewport(width, height);
	}

	pub fn field(&self) -> &ParticleField {
		&self.field
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub fn rotation(&self) -> &FieldRotation {
		&self.rotation
	}

	pub fn state(&self) -> FieldState {
		self.state
	}

	/// Pointer in the field's local frame as of the last simulated frame.
	pub fn pointer_local(&self) -> Option<Vec3> {
		self.pointer
	}

	/// Number of simulated frames so far.
	pub fn steps(&self) -> u64 {
		self.steps
	}
}
