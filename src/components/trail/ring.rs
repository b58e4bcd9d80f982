//! Fixed-capacity ring of recent pointer samples.

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{EventKind, Host, HostEvent, Subscriptions};
use crate::motion::MotionGate;
use crate::pointer::Pointer;

/// One pointer sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrailPoint {
	pub x: f64,
	pub y: f64,
	/// Seconds on the trail clock.
	pub born: f64,
}

/// Recent pointer positions, oldest overwritten first.
#[derive(Clone, Debug)]
pub struct CursorTrail {
	points: Box<[TrailPoint]>,
	head: usize,
	len: usize,
	lifetime: f64,
}

impl CursorTrail {
	pub fn new(capacity: usize, lifetime: f64) -> Self {
		Self {
			points: vec![TrailPoint::default(); capacity.max(1)].into_boxed_slice(),
			head: 0,
			len: 0,
			lifetime,
		}
	}

	pub fn capacity(&self) -> usize {
		self.points.len()
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn push(&mut self, x: f64, y: f64, now: f64) {
		self.points[self.head] = TrailPoint { x, y, born: now };
		self.head = (self.head + 1) % self.capacity();
		self.len = (self.len + 1).min(self.capacity());
	}

	pub fn newest(&self) -> Option<TrailPoint> {
		(self.len > 0).then(|| self.points[(self.head + self.capacity() - 1) % self.capacity()])
	}

	/// Linear fade from 1 at birth to 0 after `lifetime` seconds.
	pub fn alpha(&self, point: &TrailPoint, now: f64) -> f64 {
		if self.lifetime <= 0.0 {
			return 0.0;
		}
		(1.0 - (now - point.born) / self.lifetime).clamp(0.0, 1.0)
	}

	/// Visible samples with their alpha, oldest first.
	pub fn live(&self, now: f64) -> impl Iterator<Item = (TrailPoint, f64)> + '_ {
		let cap = self.capacity();
		let start = (self.head + cap - self.len) % cap;
		(0..self.len)
			.map(move |k| self.points[(start + k) % cap])
			.map(move |p| (p, self.alpha(&p, now)))
			.filter(|(_, alpha)| *alpha > 0.0)
	}

	pub fn clear(&mut self) {
		self.len = 0;
	}
}

/// Where the trail draws.
pub trait TrailSurface {
	fn draw(&mut self, trail: &CursorTrail, now: f64);

	fn resize(&mut self, width: f64, height: f64);
}

struct TrailLoop<S> {
	trail: CursorTrail,
	surface: S,
	/// Last draw left the canvas empty.
	blank: bool,
}

/// Install the trail's frame loop and resize listener.
///
/// Registers nothing unless the device has a fine pointer, motion is allowed
/// and a canvas is available.
pub fn mount_trail<H, S, P>(host: &H, gate: MotionGate, trail: CursorTrail, mut surface: S, pointer: P) -> Subscriptions
where
	H: Host,
	S: TrailSurface + 'static,
	P: Fn() -> Option<Pointer> + 'static,
{
	let mut subs = Subscriptions::new();
	if !(gate.pointer_effects() && gate.canvas) {
		return subs;
	}

	let (width, height) = host.viewport();
	surface.resize(width, height);
	let state = Rc::new(RefCell::new(TrailLoop {
		trail,
		surface,
		blank: false,
	}));

	let frame_state = state.clone();
	subs.push(host.every_frame(Box::new(move |now| {
		let now = now / 1000.0;
		let mut guard = frame_state.borrow_mut();
		let TrailLoop { trail, surface, blank } = &mut *guard;
		if let Some(p) = pointer() {
			let moved = trail
				.newest()
				.is_none_or(|last| last.x != p.client_x || last.y != p.client_y);
			if moved {
				trail.push(p.client_x, p.client_y, now);
			}
		}
		let empty = trail.live(now).next().is_none();
		if empty && *blank {
			return;
		}
		surface.draw(trail, now);
		*blank = empty;
	})));

	subs.push(host.listen(
		EventKind::Resize,
		Box::new(move |ev| {
			if let HostEvent::Resize { width, height } = ev {
				let mut guard = state.borrow_mut();
				guard.surface.resize(width, height);
				// Resizing wipes the canvas.
				guard.blank = true;
			}
		}),
	));
	subs
}
