//! Interactive 3D particle cloud behind the hero.

pub mod field;
pub mod projector;
pub mod render;

pub use field::{FieldDriver, FieldState, FrameInput, ParticleField, repulsion};
pub use projector::{Camera, FieldRotation, pointer_to_local};
pub use render::Surface;
