//! Procedural city skyline with seamless multi-plane parallax.
//!
//! - [`scene`] generates buildings, lit windows and stars deterministically
//!   from fixed tables and integer hashing.
//! - [`parallax`] turns elapsed time into per-layer loop offsets.
//! - [`CitySkyline`] renders both as an SVG strip.

mod component;
pub mod parallax;
pub mod scene;

pub use component::CitySkyline;
pub use parallax::{ParallaxLayer, depth_order_holds};
pub use scene::{Building, LayerDepth, SceneLayer, Skyline, Star, Window, skyline};
