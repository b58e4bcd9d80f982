//! Cursor trail overlay.

mod component;
pub mod ring;

pub use component::CursorTrailCanvas;
pub use ring::{CursorTrail, TrailPoint, TrailSurface, mount_trail};
