//! Leptos component rendering the skyline as an SVG strip.
//!
//! Scene data comes from the process-wide [`skyline`]; only the per-layer
//! translation changes at runtime, driven by a single frame clock that goes
//! quiet while the skyline is scrolled out of view. Window
//! pulses, star twinkles and the building reveal are CSS animations keyed by
//! the generated per-element parameters, and are switched off wholesale under
//! reduced motion.

use leptos::prelude::*;
use leptos_meta::Style;
use log::{debug, warn};

use super::parallax::ParallaxLayer;
use super::scene::{
	Building, SceneLayer, Star, TILE_HEIGHT, TILE_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH, skyline,
};
use crate::error::MotionError;
use crate::host::{BrowserHost, Host, Subscriptions, on_screen, start_clock};
use crate::motion::MotionGate;
use crate::theme::SkylinePalette;

const SKYLINE_CSS: &str = r#"
.skyline-frame { width: 100%; height: 100%; }
.skyline { display: block; width: 100%; height: 100%; }
.skyline .building { animation: skyline-rise 0.7s ease-out both; animation-delay: var(--reveal); }
.skyline .window { opacity: var(--dim); animation: skyline-pulse var(--cycle) ease-in-out var(--delay) infinite; }
.skyline .star { animation: skyline-twinkle 3.2s ease-in-out var(--delay) infinite; }
.skyline--still, .skyline--still * { animation: none !important; }
.skyline-fallback { width: 100%; height: 100%; background: linear-gradient(#0e1020, #2e2248); }
@keyframes skyline-rise { from { opacity: 0; } to { opacity: 1; } }
@keyframes skyline-pulse { 0%, 100% { opacity: var(--dim); } 50% { opacity: var(--bright); } }
@keyframes skyline-twinkle { 0%, 100% { opacity: 0.35; } 50% { opacity: 1; } }
"#;

/// Animated pixel-art city skyline.
///
/// Under reduced motion the layers stay at their resting offset and no frame
/// callback is registered. Invalid scene data renders a flat gradient instead.
#[component]
pub fn CitySkyline(
	gate: MotionGate,
	#[prop(default = SkylinePalette::dusk())] palette: SkylinePalette,
) -> impl IntoView {
	let elapsed = RwSignal::new(0.0_f64);
	let frame_ref = NodeRef::<leptos::html::Div>::new();
	let subs = StoredValue::new_local(Subscriptions::new());

	Effect::new(move |_| {
		let Some(frame) = frame_ref.get() else {
			return;
		};
		let host = match BrowserHost::new() {
			Ok(host) => host,
			Err(e) => {
				warn!("skyline-hero: skyline stays still: {e}");
				return;
			}
		};
		let viewport = host.clone();
		let visible = move || {
			let rect = frame.get_bounding_client_rect();
			on_screen(rect.top(), rect.bottom(), viewport.viewport().1)
		};
		let clock = start_clock(&host, gate.animates(), visible, move |t| elapsed.set(t));
		debug!("skyline-hero: skyline mounted with {} frame loop(s)", clock.len());
		subs.update_value(|s| {
			s.release_all();
			s.extend(clock);
		});
	});
	on_cleanup(move || subs.update_value(|s| s.release_all()));

	view! {
		<Style>{SKYLINE_CSS}</Style>
		<div class="skyline-frame" node_ref=frame_ref>
			<ErrorBoundary fallback=|_| view! { <div class="skyline-fallback" aria-hidden="true"></div> }>
				{move || skyline_svg(gate, palette, elapsed)}
			</ErrorBoundary>
		</div>
	}
}

fn skyline_svg(
	gate: MotionGate,
	palette: SkylinePalette,
	elapsed: RwSignal<f64>,
) -> Result<impl IntoView, MotionError> {
	let scene = skyline();
	scene.validate()?;

	let class = if gate.animates() {
		"skyline"
	} else {
		"skyline skyline--still"
	};
	let layers = scene
		.layers
		.iter()
		.map(|layer| layer_view(layer, palette, elapsed))
		.collect_view();

	Ok(view! {
		<svg
			class=class
			viewBox=format!("0 0 {TILE_WIDTH} {TILE_HEIGHT}")
			preserveAspectRatio="xMidYMax slice"
			aria-hidden="true"
		>
			<defs>
				<linearGradient id="skyline-sky" x1="0" y1="0" x2="0" y2="1">
					<stop offset="0" stop-color=palette.sky_top.to_css() />
					<stop offset="1" stop-color=palette.sky_bottom.to_css() />
				</linearGradient>
			</defs>
			<rect width=TILE_WIDTH.to_string() height=TILE_HEIGHT.to_string() fill="url(#skyline-sky)" />
			<g class="skyline-stars">
				{scene.stars.iter().map(|star| star_view(star, palette)).collect_view()}
			</g>
			{layers}
		</svg>
	})
}

fn layer_view(
	layer: &'static SceneLayer,
	palette: SkylinePalette,
	elapsed: RwSignal<f64>,
) -> impl IntoView {
	let parallax = ParallaxLayer::for_layer(layer);
	let [primary, copy] = parallax.tile_offsets();

	view! {
		<g
			class=format!("skyline-layer skyline-layer--{}", layer.depth.name())
			transform=move || format!("translate({} 0)", parallax.offset_at(elapsed.get()))
		>
			<g transform=format!("translate({primary} 0)")>{tile_view(layer, palette)}</g>
			<g transform=format!("translate({copy} 0)")>{tile_view(layer, palette)}</g>
		</g>
	}
}

fn tile_view(layer: &'static SceneLayer, palette: SkylinePalette) -> impl IntoView {
	let fill = palette.building(layer.depth).to_css();
	let lit = palette.window.to_css();

	let buildings = layer
		.buildings
		.iter()
		.enumerate()
		.map(|(i, b)| building_view(b, fill.clone(), layer.reveal_delay(i)))
		.collect_view();
	let windows = layer
		.windows
		.iter()
		.map(|w| {
			view! {
				<rect
					class="window"
					x=w.x.to_string()
					y=w.y.to_string()
					width=WINDOW_WIDTH.to_string()
					height=WINDOW_HEIGHT.to_string()
					fill=lit.clone()
					style=format!(
						"--dim:{:.2};--bright:{:.2};--cycle:{}s;--delay:{}s",
						w.dim,
						w.bright,
						w.cycle,
						w.delay,
					)
				/>
			}
		})
		.collect_view();

	view! {
		{buildings}
		<g class="skyline-windows">{windows}</g>
	}
}

fn building_view(building: &Building, fill: String, reveal: f64) -> impl IntoView {
	let points = building
		.outline()
		.iter()
		.map(|(x, y)| format!("{x},{y}"))
		.collect::<Vec<_>>()
		.join(" ");
	let spire = (building.roof > 0.0).then(|| {
		view! {
			<rect
				x=(building.x + building.width / 2.0 - 1.0).to_string()
				y=(building.top() - building.roof).to_string()
				width="2"
				height=building.roof.to_string()
				fill=fill.clone()
			/>
		}
	});

	view! {
		<g class="building" style=format!("--reveal:{reveal:.2}s")>
			<polygon points=points fill=fill />
			{spire}
		</g>
	}
}

fn star_view(star: &Star, palette: SkylinePalette) -> impl IntoView {
	view! {
		<rect
			class="star"
			x=star.x.to_string()
			y=star.y.to_string()
			width=star.size.to_string()
			height=star.size.to_string()
			fill=palette.star.to_css()
			style=format!("--delay:{:.1}s", star.delay)
		/>
	}
}
