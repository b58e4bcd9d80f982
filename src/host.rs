//! Frame and listener registration behind a small trait.
//!
//! Every per-frame callback and window listener the engine installs goes
//! through [`Host`], and every registration hands back a [`Release`] that is
//! collected in a [`Subscriptions`] owned by the mounting component. Dropping
//! (or explicitly releasing) the subscriptions cancels the frame loop and
//! removes the listeners, so an unmounted view leaves nothing running.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::{Event, MouseEvent, Window};

use crate::error::MotionError;

/// Undo action returned by every registration.
pub type Release = Box<dyn FnOnce()>;

/// Per-frame callback; receives a monotonic timestamp in milliseconds.
pub type FrameTick = Box<dyn FnMut(f64)>;

/// Window event handler.
pub type EventHandler = Box<dyn FnMut(HostEvent)>;

/// Window events the engine listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
	/// Pointer moved anywhere in the window.
	PointerMove,
	/// Pointer left the window.
	PointerLeave,
	/// Viewport resized.
	Resize,
}

impl EventKind {
	fn dom_name(self) -> &'static str {
		match self {
			EventKind::PointerMove => "pointermove",
			EventKind::PointerLeave => "mouseout",
			EventKind::Resize => "resize",
		}
	}
}

/// Decoded window event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
	/// Pointer position in viewport pixels.
	PointerMove {
		/// Client x.
		x: f64,
		/// Client y.
		y: f64,
	},
	/// Pointer left the window.
	PointerLeave,
	/// New viewport size in CSS pixels.
	Resize {
		/// Inner width.
		width: f64,
		/// Inner height.
		height: f64,
	},
}

impl HostEvent {
	/// Kind this event is delivered under.
	pub fn kind(&self) -> EventKind {
		match self {
			HostEvent::PointerMove { .. } => EventKind::PointerMove,
			HostEvent::PointerLeave => EventKind::PointerLeave,
			HostEvent::Resize { .. } => EventKind::Resize,
		}
	}
}

/// Source of frames, window events and viewport facts.
pub trait Host {
	/// Run `tick` once per display refresh until the release is called.
	fn every_frame(&self, tick: FrameTick) -> Release;

	/// Deliver `kind` events to `handler` until the release is called.
	fn listen(&self, kind: EventKind, handler: EventHandler) -> Release;

	/// Viewport size in CSS pixels.
	fn viewport(&self) -> (f64, f64);

	/// Reported device pixel ratio.
	fn device_pixel_ratio(&self) -> f64 {
		1.0
	}
}

/// Registrations owned by one mounted view.
#[derive(Default)]
pub struct Subscriptions {
	releases: Vec<Release>,
}

impl fmt::Debug for Subscriptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscriptions")
			.field("active", &self.releases.len())
			.finish()
	}
}

impl Subscriptions {
	/// Empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Take ownership of a registration.
	pub fn push(&mut self, release: Release) {
		self.releases.push(release);
	}

	/// Move every registration of `other` into `self`.
	pub fn extend(&mut self, mut other: Subscriptions) {
		self.releases.append(&mut other.releases);
	}

	/// Number of live registrations.
	pub fn len(&self) -> usize {
		self.releases.len()
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.releases.is_empty()
	}

	/// Release everything, newest first.
	pub fn release_all(&mut self) {
		while let Some(release) = self.releases.pop() {
			release();
		}
	}
}

impl Drop for Subscriptions {
	fn drop(&mut self) {
		self.release_all();
	}
}

/// Register a frame loop reporting seconds since its first frame.
///
/// Registers nothing when `animates` is false, so a reduced-motion view
/// costs no per-frame work at all. Frames where `visible` says the view is
/// off-screen report nothing; the clock keeps counting, so the next visible
/// frame lands where an unbroken loop would have been.
pub fn start_clock<H: Host>(
	host: &H,
	animates: bool,
	visible: impl Fn() -> bool + 'static,
	mut on_elapsed: impl FnMut(f64) + 'static,
) -> Subscriptions {
	let mut subs = Subscriptions::new();
	if !animates {
		return subs;
	}
	let mut origin: Option<f64> = None;
	subs.push(host.every_frame(Box::new(move |now| {
		let start = *origin.get_or_insert(now);
		if visible() {
			on_elapsed((now - start) / 1000.0);
		}
	})));
	subs
}

/// Whether a box spanning `top..bottom` (viewport pixels) overlaps a
/// viewport `viewport_height` tall.
pub fn on_screen(top: f64, bottom: f64, viewport_height: f64) -> bool {
	bottom > 0.0 && top < viewport_height
}

/// [`Host`] backed by the browser window.
#[derive(Clone, Debug)]
pub struct BrowserHost {
	window: Window,
}

impl BrowserHost {
	/// Bind to the global window.
	pub fn new() -> Result<Self, MotionError> {
		web_sys::window()
			.map(|window| Self { window })
			.ok_or(MotionError::NoWindow)
	}
}

impl Host for BrowserHost {
	fn every_frame(&self, mut tick: FrameTick) -> Release {
		let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let cancelled = Rc::new(Cell::new(false));

		let (callback_inner, pending_inner, cancelled_inner, window_inner) = (
			callback.clone(),
			pending.clone(),
			cancelled.clone(),
			self.window.clone(),
		);
		*callback.borrow_mut() = Some(Closure::new(move |now: f64| {
			pending_inner.set(None);
			if cancelled_inner.get() {
				return;
			}
			tick(now);
			if let Some(ref cb) = *callback_inner.borrow() {
				if let Ok(id) = window_inner.request_animation_frame(cb.as_ref().unchecked_ref()) {
					pending_inner.set(Some(id));
				}
			}
		}));
		if let Some(ref cb) = *callback.borrow() {
			if let Ok(id) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				pending.set(Some(id));
			}
		}

		let window = self.window.clone();
		Box::new(move || {
			cancelled.set(true);
			if let Some(id) = pending.take() {
				let _ = window.cancel_animation_frame(id);
			}
			// Breaks the closure's self-reference.
			callback.borrow_mut().take();
		})
	}

	fn listen(&self, kind: EventKind, mut handler: EventHandler) -> Release {
		let window_inner = self.window.clone();
		let closure = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
			if let Some(event) = decode(kind, &ev, &window_inner) {
				handler(event);
			}
		});
		let function: Function = closure.as_ref().unchecked_ref::<Function>().clone();
		let _ = self
			.window
			.add_event_listener_with_callback(kind.dom_name(), &function);

		let window = self.window.clone();
		Box::new(move || {
			let _ = window.remove_event_listener_with_callback(kind.dom_name(), &function);
			drop(closure);
		})
	}

	fn viewport(&self) -> (f64, f64) {
		let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
		(
			read(self.window.inner_width()),
			read(self.window.inner_height()),
		)
	}

	fn device_pixel_ratio(&self) -> f64 {
		self.window.device_pixel_ratio()
	}
}

fn decode(kind: EventKind, ev: &Event, window: &Window) -> Option<HostEvent> {
	match kind {
		EventKind::PointerMove => {
			let mouse = ev.dyn_ref::<MouseEvent>()?;
			Some(HostEvent::PointerMove {
				x: mouse.client_x() as f64,
				y: mouse.client_y() as f64,
			})
		}
		EventKind::PointerLeave => {
			let mouse = ev.dyn_ref::<MouseEvent>()?;
			// `mouseout` bubbles from every element; only leaving the page counts.
			mouse
				.related_target()
				.is_none()
				.then_some(HostEvent::PointerLeave)
		}
		EventKind::Resize => {
			let host = BrowserHost {
				window: window.clone(),
			};
			let (width, height) = host.viewport();
			Some(HostEvent::Resize { width, height })
		}
	}
}

type SharedTick = Rc<RefCell<FrameTick>>;
type SharedHandler = Rc<RefCell<EventHandler>>;

#[derive(Default)]
struct ManualState {
	next_id: u64,
	frames: BTreeMap<u64, SharedTick>,
	listeners: BTreeMap<u64, (EventKind, SharedHandler)>,
	viewport: (f64, f64),
}

/// In-memory [`Host`] driven by hand: frames advance on [`ManualHost::advance`]
/// and events arrive through [`ManualHost::dispatch`]. Counts live
/// registrations so mount/unmount balance can be checked.
#[derive(Clone, Default)]
pub struct ManualHost {
	state: Rc<RefCell<ManualState>>,
}

impl fmt::Debug for ManualHost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ManualHost")
			.field("frame_callbacks", &self.frame_callbacks())
			.field("listeners", &self.listeners())
			.finish()
	}
}

impl ManualHost {
	/// Host with the given viewport.
	pub fn new(width: f64, height: f64) -> Self {
		let host = Self::default();
		host.state.borrow_mut().viewport = (width, height);
		host
	}

	/// Live frame callbacks.
	pub fn frame_callbacks(&self) -> usize {
		self.state.borrow().frames.len()
	}

	/// Live event listeners.
	pub fn listeners(&self) -> usize {
		self.state.borrow().listeners.len()
	}

	/// Live registrations of either kind.
	pub fn registrations(&self) -> usize {
		self.frame_callbacks() + self.listeners()
	}

	/// Run every registered frame callback once.
	pub fn advance(&self, now: f64) {
		let ticks: Vec<SharedTick> = self.state.borrow().frames.values().cloned().collect();
		for tick in ticks {
			(tick.borrow_mut())(now);
		}
	}

	/// Deliver an event to every listener of its kind. Resize also updates
	/// the viewport.
	pub fn dispatch(&self, event: HostEvent) {
		if let HostEvent::Resize { width, height } = event {
			self.state.borrow_mut().viewport = (width, height);
		}
		let kind = event.kind();
		let handlers: Vec<SharedHandler> = self
			.state
			.borrow()
			.listeners
			.values()
			.filter(|(k, _)| *k == kind)
			.map(|(_, h)| h.clone())
			.collect();
		for handler in handlers {
			(handler.borrow_mut())(event);
		}
	}

	fn next_id(&self) -> u64 {
		let mut state = self.state.borrow_mut();
		state.next_id += 1;
		state.next_id
	}
}

impl Host for ManualHost {
	fn every_frame(&self, tick: FrameTick) -> Release {
		let id = self.next_id();
		self.state
			.borrow_mut()
			.frames
			.insert(id, Rc::new(RefCell::new(tick)));
		let state = self.state.clone();
		Box::new(move || {
			state.borrow_mut().frames.remove(&id);
		})
	}

	fn listen(&self, kind: EventKind, handler: EventHandler) -> Release {
		let id = self.next_id();
		self.state
			.borrow_mut()
			.listeners
			.insert(id, (kind, Rc::new(RefCell::new(handler))));
		let state = self.state.clone();
		Box::new(move || {
			state.borrow_mut().listeners.remove(&id);
		})
	}

	fn viewport(&self) -> (f64, f64) {
		self.state.borrow().viewport
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dropping_subscriptions_releases_everything() {
		let host = ManualHost::new(800.0, 600.0);
		{
			let mut subs = Subscriptions::new();
			subs.push(host.every_frame(Box::new(|_| {})));
			subs.push(host.listen(EventKind::PointerLeave, Box::new(|_| {})));
			subs.push(host.listen(EventKind::Resize, Box::new(|_| {})));
			assert_eq!(subs.len(), 3);
			assert_eq!(host.registrations(), 3);
		}
		assert_eq!(host.registrations(), 0);
	}

	#[test]
	fn release_all_is_idempotent() {
		let host = ManualHost::new(800.0, 600.0);
		let mut subs = Subscriptions::new();
		subs.push(host.every_frame(Box::new(|_| {})));
		subs.release_all();
		subs.release_all();
		assert!(subs.is_empty());
		assert_eq!(host.frame_callbacks(), 0);
	}

	#[test]
	fn released_frame_callback_stops_running() {
		let host = ManualHost::new(800.0, 600.0);
		let count = Rc::new(Cell::new(0));
		let counter = count.clone();
		let release = host.every_frame(Box::new(move |_| counter.set(counter.get() + 1)));
		host.advance(16.0);
		host.advance(32.0);
		release();
		host.advance(48.0);
		assert_eq!(count.get(), 2);
	}

	#[test]
	fn dispatch_routes_by_kind() {
		let host = ManualHost::new(800.0, 600.0);
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		let _release = host.listen(
			EventKind::PointerMove,
			Box::new(move |ev| sink.borrow_mut().push(ev)),
		);
		host.dispatch(HostEvent::PointerLeave);
		host.dispatch(HostEvent::PointerMove { x: 1.0, y: 2.0 });
		assert_eq!(*seen.borrow(), vec![HostEvent::PointerMove { x: 1.0, y: 2.0 }]);
	}

	#[test]
	fn clock_reports_seconds_from_first_frame() {
		let host = ManualHost::new(800.0, 600.0);
		let seen = Rc::new(Cell::new(-1.0));
		let sink = seen.clone();
		let subs = start_clock(&host, true, || true, move |t| sink.set(t));
		host.advance(1_000.0);
		assert_eq!(seen.get(), 0.0);
		host.advance(2_500.0);
		assert_eq!(seen.get(), 1.5);
		drop(subs);
		assert_eq!(host.frame_callbacks(), 0);
	}

	#[test]
	fn hidden_clock_reports_nothing_but_keeps_time() {
		let host = ManualHost::new(800.0, 600.0);
		let shown = Rc::new(Cell::new(false));
		let writes = Rc::new(RefCell::new(Vec::new()));
		let (flag, sink) = (shown.clone(), writes.clone());
		let _subs = start_clock(&host, true, move || flag.get(), move |t| sink.borrow_mut().push(t));
		for i in 0..10 {
			host.advance(i as f64 * 100.0);
		}
		assert!(writes.borrow().is_empty());
		assert_eq!(host.frame_callbacks(), 1);

		shown.set(true);
		host.advance(2_000.0);
		assert_eq!(*writes.borrow(), [2.0]);
	}

	#[test]
	fn on_screen_needs_overlap() {
		assert!(on_screen(-100.0, 50.0, 800.0));
		assert!(on_screen(700.0, 900.0, 800.0));
		assert!(!on_screen(800.0, 1000.0, 800.0));
		assert!(!on_screen(-300.0, 0.0, 800.0));
	}

	#[test]
	fn stopped_clock_registers_nothing() {
		let host = ManualHost::new(800.0, 600.0);
		let subs = start_clock(&host, false, || true, |_| {});
		assert!(subs.is_empty());
		assert_eq!(host.frame_callbacks(), 0);
	}

	#[test]
	fn resize_updates_viewport() {
		let host = ManualHost::new(800.0, 600.0);
		host.dispatch(HostEvent::Resize {
			width: 1024.0,
			height: 768.0,
		});
		assert_eq!(host.viewport(), (1024.0, 768.0));
	}
}
