//! UI components for the portfolio animation layer.

pub mod hero;
pub mod particle_field;
pub mod scroll;
pub mod skyline;
pub mod trail;
