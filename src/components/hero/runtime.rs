//! The hero's single frame loop.
//!
//! Each frame samples scroll progress exactly once, evaluates the
//! choreography from that sample, steps the particle field (or skips it when
//! the choreography says the canvas is paused) and presents the result. Text,
//! glow, canvas and next-section styles therefore always come from the same
//! progress value, whatever order the browser delivers scroll events in.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::components::particle_field::{FieldDriver, FrameInput};
use crate::components::scroll::{Channel, Choreography, MotionFrame};
use crate::host::{EventKind, Host, HostEvent, Subscriptions};
use crate::motion::MotionGate;
use crate::pointer::PointerNdc;

/// Where the hero reads scroll from and draws to.
pub trait HeroSurface {
	/// Current progress through the pinned wrapper, `[0, 1]`.
	fn scroll_progress(&self) -> f64;

	/// Show one frame. `field` is present when the canvas is live.
	fn present(&mut self, frame: &HeroFrame, field: Option<&FieldDriver>);

	/// Viewport changed size, CSS pixels.
	fn resize(&mut self, width: f64, height: f64);
}

/// Result of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroFrame {
	pub motion: MotionFrame,
	/// Whether the particle field was stepped this frame.
	pub simulated: bool,
}

/// Choreography plus the optional particle field, independent of the DOM.
#[derive(Debug)]
pub struct HeroRuntime {
	choreography: Choreography,
	field: Option<FieldDriver>,
	origin: Option<f64>,
}

impl HeroRuntime {
	pub fn new(choreography: Choreography, field: Option<FieldDriver>) -> Self {
		Self {
			choreography,
			field,
			origin: None,
		}
	}

	/// Advance to `now` (ms) using an already-sampled `progress`.
	pub fn frame(&mut self, now: f64, progress: f64, pointer: Option<PointerNdc>) -> HeroFrame {
		let start = *self.origin.get_or_insert(now);
		let motion = self.choreography.evaluate(progress);
		// The canvas is CSS-scaled about its center; undo that so the
		// bubble stays under the cursor.
		let pointer = pointer.map(|ndc| ndc.unscaled(motion.get(Channel::CanvasScale)));
		let simulated = match self.field.as_mut() {
			Some(driver) => driver.frame(FrameInput {
				time: (now - start) / 1000.0,
				pointer,
				paused: motion.canvas_paused,
			}),
			None => false,
		};
		HeroFrame { motion, simulated }
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		if let Some(driver) = self.field.as_mut() {
			driver.resize(width, height);
		}
	}

	pub fn field(&self) -> Option<&FieldDriver> {
		self.field.as_ref()
	}
}

struct HeroLoop<S> {
	runtime: HeroRuntime,
	surface: S,
}

/// Install the hero's frame loop and resize listener.
///
/// Registers nothing under reduced motion; the caller renders
/// [`Choreography::settled`] instead. `pointer` is only consulted when the
/// device has a fine pointer.
pub fn mount_hero<H, S, P>(host: &H, gate: MotionGate, runtime: HeroRuntime, mut surface: S, pointer: P) -> Subscriptions
where
	H: Host,
	S: HeroSurface + 'static,
	P: Fn() -> Option<PointerNdc> + 'static,
{
	let mut subs = Subscriptions::new();
	if !gate.animates() {
		return subs;
	}

	let (width, height) = host.viewport();
	let mut runtime = runtime;
	runtime.resize(width, height);
	surface.resize(width, height);

	let state = Rc::new(RefCell::new(HeroLoop { runtime, surface }));

	let frame_state = state.clone();
	subs.push(host.every_frame(Box::new(move |now| {
		let mut guard = frame_state.borrow_mut();
		let HeroLoop { runtime, surface } = &mut *guard;
		let progress = surface.scroll_progress();
		let pointer = if gate.pointer_effects() { pointer() } else { None };
		let frame = runtime.frame(now, progress, pointer);
		surface.present(&frame, runtime.field());
	})));

	subs.push(host.listen(
		EventKind::Resize,
		Box::new(move |ev| {
			if let HostEvent::Resize { width, height } = ev {
				let mut guard = state.borrow_mut();
				guard.runtime.resize(width, height);
				guard.surface.resize(width, height);
			}
		}),
	));

	debug!("skyline-hero: hero mounted ({} registrations)", subs.len());
	subs
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::config::{CameraConfig, FieldConfig};
	use crate::host::ManualHost;

	#[derive(Default)]
	struct Log {
		progress: Cell<f64>,
		samples: Cell<usize>,
		frames: RefCell<Vec<HeroFrame>>,
		sizes: RefCell<Vec<(f64, f64)>>,
	}

	struct FakeSurface(Rc<Log>);

	impl HeroSurface for FakeSurface {
		fn scroll_progress(&self) -> f64 {
			self.0.samples.set(self.0.samples.get() + 1);
			self.0.progress.get()
		}

		fn present(&mut self, frame: &HeroFrame, _field: Option<&FieldDriver>) {
			self.0.frames.borrow_mut().push(*frame);
		}

		fn resize(&mut self, width: f64, height: f64) {
			self.0.sizes.borrow_mut().push((width, height));
		}
	}

	fn runtime() -> HeroRuntime {
		let field = FieldConfig {
			count: 64,
			..FieldConfig::default()
		};
		HeroRuntime::new(
			Choreography::hero(0.6),
			Some(FieldDriver::new(&field, &CameraConfig::default(), 1.0)),
		)
	}

	fn mount(host: &ManualHost, gate: MotionGate) -> (Subscriptions, Rc<Log>) {
		let log = Rc::new(Log::default());
		let subs = mount_hero(host, gate, runtime(), FakeSurface(log.clone()), || {
			Some(PointerNdc { x: 0.2, y: 0.1 })
		});
		(subs, log)
	}

	#[test]
	fn reduced_motion_registers_nothing() {
		let host = ManualHost::new(1280.0, 800.0);
		let (subs, log) = mount(&host, MotionGate::REDUCED);
		assert!(subs.is_empty());
		assert_eq!(host.registrations(), 0);
		host.advance(16.0);
		assert!(log.frames.borrow().is_empty());
	}

	#[test]
	fn unmount_removes_every_registration() {
		let host = ManualHost::new(1280.0, 800.0);
		let (subs, _log) = mount(&host, MotionGate::FULL);
		assert_eq!(host.frame_callbacks(), 1);
		assert_eq!(host.listeners(), 1);
		drop(subs);
		assert_eq!(host.registrations(), 0);
	}

	#[test]
	fn progress_is_sampled_once_per_frame() {
		let host = ManualHost::new(1280.0, 800.0);
		let (_subs, log) = mount(&host, MotionGate::FULL);
		for i in 0..5 {
			log.progress.set(i as f64 * 0.1);
			host.advance(i as f64 * 16.0);
		}
		assert_eq!(log.samples.get(), 5);
		let frames = log.frames.borrow();
		assert_eq!(frames.len(), 5);
		assert_eq!(frames[3].motion.progress, 3.0 * 0.1);
	}

	#[test]
	fn field_pauses_past_threshold() {
		let host = ManualHost::new(1280.0, 800.0);
		let (_subs, log) = mount(&host, MotionGate::FULL);
		log.progress.set(0.2);
		host.advance(0.0);
		log.progress.set(0.7);
		host.advance(16.0);
		host.advance(32.0);
		log.progress.set(0.5);
		host.advance(48.0);

		let simulated: Vec<bool> = log.frames.borrow().iter().map(|f| f.simulated).collect();
		assert_eq!(simulated, [true, false, false, true]);
	}

	#[test]
	fn coarse_pointer_never_reads_pointer() {
		let host = ManualHost::new(1280.0, 800.0);
		let log = Rc::new(Log::default());
		let reads = Rc::new(Cell::new(0));
		let counter = reads.clone();
		let gate = MotionGate {
			fine_pointer: false,
			..MotionGate::FULL
		};
		let _subs = mount_hero(&host, gate, runtime(), FakeSurface(log.clone()), move || {
			counter.set(counter.get() + 1);
			Some(PointerNdc::default())
		});
		host.advance(0.0);
		host.advance(16.0);
		assert_eq!(reads.get(), 0);
		assert_eq!(log.frames.borrow().len(), 2);
	}

	#[test]
	fn resize_reaches_surface_and_camera() {
		let host = ManualHost::new(1280.0, 800.0);
		let log = Rc::new(Log::default());
		let _subs = mount_hero(&host, MotionGate::FULL, runtime(), FakeSurface(log.clone()), || None);
		host.dispatch(HostEvent::Resize {
			width: 900.0,
			height: 300.0,
		});
		assert_eq!(*log.sizes.borrow(), [(1280.0, 800.0), (900.0, 300.0)]);
	}

	#[test]
	fn runtime_without_field_still_choreographs() {
		let mut runtime = HeroRuntime::new(Choreography::hero(0.6), None);
		let frame = runtime.frame(0.0, 0.15, None);
		assert!(!frame.simulated);
		assert!(frame.motion.get(Channel::TextOpacity) < 1.0);
	}

	#[test]
	fn repulsion_stays_under_cursor_while_canvas_scales() {
		let (width, height) = (1280.0, 800.0);
		let field = FieldConfig {
			count: 64,
			spin_speed: 1.0,
			..FieldConfig::default()
		};
		let mut runtime = HeroRuntime::new(
			Choreography::hero(0.6),
			Some(FieldDriver::new(&field, &CameraConfig::default(), 1.0)),
		);
		runtime.resize(width, height);
		let cursor = PointerNdc { x: 0.9, y: 0.5 };
		let mut frame = runtime.frame(0.0, 0.3, Some(cursor));
		for i in 1..=13 {
			frame = runtime.frame(i as f64 * 100.0, 0.3, Some(cursor));
		}
		let scale = frame.motion.get(Channel::CanvasScale);
		assert!(scale > 1.05, "scale {scale}");

		let driver = runtime.field().unwrap();
		assert!(driver.rotation().spin_y > 1.0);
		let world = driver.rotation().apply(driver.pointer_local().unwrap());
		let (nx, ny, _) = driver.camera().project(world).unwrap();
		// Canvas NDC, then the CSS scale about the viewport center, then pixels.
		let px = |ndc: f64, extent: f64| (ndc + 1.0) * 0.5 * extent;
		let dx = px(nx as f64 * scale, width) - px(cursor.x, width);
		let dy = px(ny as f64 * scale, height) - px(cursor.y, height);
		assert!(dx.abs() < 1.0 && dy.abs() < 1.0, "off by ({dx}, {dy}) px");
	}

	#[test]
	fn runtime_resize_sets_aspect() {
		let mut runtime = runtime();
		runtime.resize(1000.0, 500.0);
		assert_eq!(runtime.field().unwrap().camera().aspect, 2.0);
	}
}
