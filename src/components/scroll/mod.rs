//! Pinned-scroll choreography.

pub mod choreography;

pub use choreography::{Channel, Choreography, MotionFrame, scroll_progress};
