//! Shared pointer position.
//!
//! One window listener writes the pointer; any number of particle fields and
//! trails read it once per frame.

use crate::host::{EventKind, Host, HostEvent, Subscriptions};

/// Normalized device coordinates: `[-1, 1]` on both axes, y up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerNdc {
	/// Horizontal, -1 at the left edge.
	pub x: f64,
	/// Vertical, -1 at the bottom edge.
	pub y: f64,
}

impl PointerNdc {
	/// Convert viewport pixels to NDC. `None` for a degenerate viewport.
	pub fn from_client(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
		if width <= 0.0 || height <= 0.0 {
			return None;
		}
		Some(Self {
			x: (x / width) * 2.0 - 1.0,
			y: -((y / height) * 2.0 - 1.0),
		})
	}

	/// Position inside an element drawn with CSS `scale(scale)` about the
	/// viewport center.
	pub fn unscaled(self, scale: f64) -> Self {
		if !scale.is_finite() || scale <= 0.0 {
			return self;
		}
		Self {
			x: self.x / scale,
			y: self.y / scale,
		}
	}
}

/// Pointer sample in both coordinate systems.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
	/// Viewport x in CSS pixels.
	pub client_x: f64,
	/// Viewport y in CSS pixels.
	pub client_y: f64,
	/// Same position in NDC.
	pub ndc: PointerNdc,
}

/// Install the window listeners that keep the shared pointer current.
///
/// `set` receives `Some` on every move and `None` when the pointer leaves
/// the window.
pub fn track_pointer<H, F>(host: &H, set: F) -> Subscriptions
where
	H: Host + Clone + 'static,
	F: Fn(Option<Pointer>) + Clone + 'static,
{
	let mut subs = Subscriptions::new();

	let (host_move, set_move) = (host.clone(), set.clone());
	subs.push(host.listen(
		EventKind::PointerMove,
		Box::new(move |ev| {
			if let HostEvent::PointerMove { x, y } = ev {
				let (width, height) = host_move.viewport();
				set_move(PointerNdc::from_client(x, y, width, height).map(|ndc| Pointer {
					client_x: x,
					client_y: y,
					ndc,
				}));
			}
		}),
	));
	subs.push(host.listen(EventKind::PointerLeave, Box::new(move |_| set(None))));

	subs
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;
	use crate::host::ManualHost;

	#[test]
	fn corners_map_to_unit_square() {
		let top_left = PointerNdc::from_client(0.0, 0.0, 800.0, 600.0).unwrap();
		assert_eq!(top_left, PointerNdc { x: -1.0, y: 1.0 });
		let bottom_right = PointerNdc::from_client(800.0, 600.0, 800.0, 600.0).unwrap();
		assert_eq!(bottom_right, PointerNdc { x: 1.0, y: -1.0 });
		let center = PointerNdc::from_client(400.0, 300.0, 800.0, 600.0).unwrap();
		assert_eq!(center, PointerNdc { x: 0.0, y: 0.0 });
	}

	#[test]
	fn unscaling_pulls_toward_center() {
		let ndc = PointerNdc { x: 0.9, y: -0.5 };
		assert_eq!(ndc.unscaled(2.0), PointerNdc { x: 0.45, y: -0.25 });
		assert_eq!(ndc.unscaled(0.0), ndc);
		assert_eq!(ndc.unscaled(f64::NAN), ndc);
	}

	#[test]
	fn zero_viewport_has_no_ndc() {
		assert!(PointerNdc::from_client(10.0, 10.0, 0.0, 600.0).is_none());
	}

	#[test]
	fn tracker_writes_and_clears_pointer() {
		let host = ManualHost::new(800.0, 600.0);
		let shared: Rc<Cell<Option<Pointer>>> = Rc::new(Cell::new(None));
		let sink = shared.clone();
		let subs = track_pointer(&host, move |p| sink.set(p));
		assert_eq!(host.listeners(), 2);

		host.dispatch(HostEvent::PointerMove { x: 600.0, y: 150.0 });
		let pointer = shared.get().unwrap();
		assert_eq!(pointer.ndc, PointerNdc { x: 0.5, y: 0.5 });
		assert_eq!(pointer.client_x, 600.0);

		host.dispatch(HostEvent::PointerLeave);
		assert!(shared.get().is_none());

		drop(subs);
		assert_eq!(host.listeners(), 0);
	}
}
