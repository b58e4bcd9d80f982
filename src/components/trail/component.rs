//! Full-viewport overlay canvas drawing the cursor trail.

use leptos::prelude::*;
use leptos_meta::Style;
use log::warn;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::ring::{CursorTrail, TrailSurface, mount_trail};
use crate::config::TrailConfig;
use crate::host::{BrowserHost, Host, Subscriptions};
use crate::motion::{DprRange, MotionGate, canvas_context};
use crate::pointer::Pointer;
use crate::theme::Color;

const TRAIL_CSS: &str = r#"
.cursor-trail { position: fixed; inset: 0; width: 100vw; height: 100vh; pointer-events: none; z-index: 50; }
"#;

struct TrailCanvas {
	host: BrowserHost,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	dpr_range: DprRange,
	color: Color,
	size: f64,
	width: f64,
	height: f64,
}

impl TrailSurface for TrailCanvas {
	fn draw(&mut self, trail: &CursorTrail, now: f64) {
		let ratio = self.dpr_range.clamp(self.host.device_pixel_ratio());
		let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
		self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
		for (point, alpha) in trail.live(now) {
			self.ctx
				.set_fill_style_str(&self.color.with_alpha(alpha * 0.8).to_css());
			self.ctx.begin_path();
			let _ = self
				.ctx
				.arc(point.x, point.y, self.size * alpha.max(0.2), 0.0, std::f64::consts::TAU);
			self.ctx.fill();
		}
	}

	fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		let (w, h) = self
			.dpr_range
			.buffer_size(width, height, self.host.device_pixel_ratio());
		self.canvas.set_width(w);
		self.canvas.set_height(h);
	}
}

/// Fading dots following the pointer. Renders nothing on touch-only devices
/// or under reduced motion.
#[component]
pub fn CursorTrailCanvas(
	gate: MotionGate,
	config: TrailConfig,
	dpr_range: DprRange,
	pointer: RwSignal<Option<Pointer>>,
) -> impl IntoView {
	let enabled = gate.pointer_effects() && gate.canvas;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let subs = StoredValue::new_local(Subscriptions::new());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let ctx = match canvas_context(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				warn!("skyline-hero: cursor trail disabled: {e}");
				return;
			}
		};
		let Ok(host) = BrowserHost::new() else {
			return;
		};
		let surface = TrailCanvas {
			host: host.clone(),
			canvas,
			ctx,
			dpr_range,
			color: Color::from_hex(&config.color),
			size: config.size,
			width: 0.0,
			height: 0.0,
		};
		let trail = CursorTrail::new(config.capacity, config.lifetime);
		let mounted = mount_trail(&host, gate, trail, surface, move || pointer.get_untracked());
		subs.update_value(|s| {
			s.release_all();
			s.extend(mounted);
		});
	});
	on_cleanup(move || subs.update_value(|s| s.release_all()));

	enabled.then(|| {
		view! {
			<Style>{TRAIL_CSS}</Style>
			<canvas class="cursor-trail" node_ref=canvas_ref aria-hidden="true"></canvas>
		}
	})
}
