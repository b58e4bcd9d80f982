//! Pinned hero: scroll choreography plus the particle field in one loop.

mod component;
pub mod runtime;

pub use component::PinnedHero;
pub use runtime::{HeroFrame, HeroRuntime, HeroSurface, mount_hero};
