//! skyline-hero: animation layer for a single-page portfolio.
//!
//! This crate provides a pinned, scroll-choreographed hero over an
//! interactive particle field, a procedurally generated pixel-art skyline
//! with seamless parallax, and a cursor trail. All of it honours the user's
//! reduced-motion preference and degrades to static content when the
//! browser lacks a capability.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};

pub mod components;
pub mod config;
pub mod error;
pub mod host;
pub mod motion;
pub mod pointer;
pub mod theme;

pub use components::hero::PinnedHero;
pub use components::skyline::CitySkyline;
pub use components::trail::CursorTrailCanvas;
pub use config::MotionConfig;
pub use error::MotionError;
pub use motion::MotionGate;

use host::{BrowserHost, Subscriptions};
use pointer::{Pointer, track_pointer};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("skyline-hero: logging initialized");
}

/// Main application component.
/// Reads the motion gate and config, then lays out hero, trail and skyline.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = MotionConfig::load();
	let gate = MotionGate::detect();

	// One window listener feeds every pointer-driven effect.
	let pointer = RwSignal::new(None::<Pointer>);
	let subs = StoredValue::new_local(Subscriptions::new());
	if gate.pointer_effects() {
		match BrowserHost::new() {
			Ok(host) => {
				let tracked = track_pointer(&host, move |p| pointer.set(p));
				subs.update_value(|s| s.extend(tracked));
			}
			Err(e) => warn!("skyline-hero: pointer effects off: {e}"),
		}
	}
	on_cleanup(move || subs.update_value(|s| s.release_all()));

	let dpr_range = config.render.dpr_range;
	let trail = config.trail.clone();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Portfolio" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<CursorTrailCanvas gate=gate config=trail dpr_range=dpr_range pointer=pointer />
		<main>
			<PinnedHero
				gate=gate
				config=config
				pointer=pointer
				next=Box::new(|| {
					view! {
						<div class="intro">
							<h2>"Selected work"</h2>
							<p>"Systems, tools and the occasional toy."</p>
						</div>
					}
					.into_any()
				})
			>
				<h1>"Hi, I build things for the web."</h1>
				<p class="subtitle">"Scroll to explore"</p>
			</PinnedHero>
		</main>
		<footer class="skyline-footer">
			<CitySkyline gate=gate />
		</footer>
	}
}
