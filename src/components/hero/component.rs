//! Leptos component for the pinned hero.
//!
//! The hero sits in a wrapper several viewports tall; its stage is sticky,
//! so scrolling through the wrapper scrubs the choreography instead of
//! moving the content. Under reduced motion the wrapper collapses to its
//! natural height and everything renders at rest.

use leptos::prelude::*;
use leptos_meta::Style;
use log::{debug, warn};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use super::runtime::{HeroFrame, HeroRuntime, HeroSurface, mount_hero};
use crate::components::particle_field::render::{self, Surface};
use crate::components::particle_field::FieldDriver;
use crate::components::scroll::{Channel, Choreography, MotionFrame, scroll_progress};
use crate::config::MotionConfig;
use crate::host::{BrowserHost, Host, Subscriptions};
use crate::motion::{DprRange, MotionGate, canvas_context};
use crate::pointer::Pointer;

const HERO_CSS: &str = r#"
.hero-pin { position: relative; }
.hero-stage { position: sticky; top: 0; height: 100vh; overflow: hidden; }
.hero-glow { position: absolute; inset: 0; pointer-events: none;
	background: radial-gradient(circle at 50% 45%, rgba(138, 180, 248, 0.28), transparent 60%); }
.hero-canvas, .hero-backdrop { position: absolute; inset: 0; width: 100%; height: 100%; transform-origin: 50% 50%; }
.hero-backdrop { background: radial-gradient(circle at 50% 40%, #1b2040, #0b0d1a 70%); }
.hero-text { position: absolute; inset: 0; display: flex; flex-direction: column;
	align-items: center; justify-content: center; will-change: opacity, transform, filter; }
.hero-next { position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; }
.hero-pin--still .hero-stage { position: relative; height: auto; min-height: 100vh; }
.hero-pin--still .hero-text, .hero-pin--still .hero-next { position: relative; min-height: 100vh; }
"#;

/// DOM side of the hero loop.
struct BrowserSurface {
	host: BrowserHost,
	wrapper: HtmlElement,
	canvas: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
	motion: RwSignal<MotionFrame>,
	dpr_range: DprRange,
	surface: Surface,
	point_size: f64,
}

impl HeroSurface for BrowserSurface {
	fn scroll_progress(&self) -> f64 {
		let rect = self.wrapper.get_bounding_client_rect();
		scroll_progress(rect.top(), rect.height(), self.surface.height)
	}

	fn present(&mut self, frame: &HeroFrame, field: Option<&FieldDriver>) {
		// Only touch the DOM when something moved.
		if self.motion.get_untracked() != frame.motion {
			self.motion.set(frame.motion);
		}
		if !frame.simulated {
			return;
		}
		if let (Some((_, ctx)), Some(driver)) = (&self.canvas, field) {
			render::render(ctx, driver, &self.surface, self.point_size);
		}
	}

	fn resize(&mut self, width: f64, height: f64) {
		let dpr = self.host.device_pixel_ratio();
		self.surface = Surface {
			width,
			height,
			ratio: self.dpr_range.clamp(dpr),
		};
		if let Some((canvas, _)) = &self.canvas {
			let (w, h) = self.dpr_range.buffer_size(width, height, dpr);
			canvas.set_width(w);
			canvas.set_height(h);
		}
	}
}

/// Full-viewport hero pinned while the user scrolls through it.
///
/// `children` is the hero copy; `next` is revealed as the hero fades out.
#[component]
pub fn PinnedHero(
	gate: MotionGate,
	config: MotionConfig,
	pointer: RwSignal<Option<Pointer>>,
	children: Children,
	#[prop(optional)] next: Option<Children>,
) -> impl IntoView {
	let choreography = Choreography::hero(config.scroll.pause_threshold);
	let motion = RwSignal::new(if gate.animates() {
		choreography.evaluate(0.0)
	} else {
		choreography.settled()
	});
	let canvas_live = RwSignal::new(gate.particles());
	let wrapper_ref = NodeRef::<leptos::html::Section>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let subs = StoredValue::new_local(Subscriptions::new());

	let (class, wrapper_style) = if gate.animates() {
		(
			"hero-pin",
			format!("height:{}vh", config.scroll.pinned_viewports * 100.0),
		)
	} else {
		("hero-pin hero-pin--still", String::new())
	};

	Effect::new(move |_| {
		let Some(wrapper) = wrapper_ref.get() else {
			return;
		};
		if !gate.animates() {
			return;
		}
		let host = match BrowserHost::new() {
			Ok(host) => host,
			Err(e) => {
				warn!("skyline-hero: hero stays at rest: {e}");
				return;
			}
		};

		let canvas = if gate.particles() {
			canvas_ref.get_untracked().and_then(|canvas| {
				let canvas: HtmlCanvasElement = canvas.into();
				match canvas_context(&canvas) {
					Ok(ctx) => Some((canvas, ctx)),
					Err(e) => {
						warn!("skyline-hero: particle field disabled: {e}");
						canvas_live.set(false);
						None
					}
				}
			})
		} else {
			None
		};

		let (width, height) = host.viewport();
		let field = canvas
			.as_ref()
			.map(|_| FieldDriver::new(&config.field, &config.camera, (width / height.max(1.0)) as f32));
		let surface = BrowserSurface {
			host: host.clone(),
			wrapper,
			canvas,
			motion,
			dpr_range: config.render.dpr_range,
			surface: Surface {
				width,
				height,
				ratio: 1.0,
			},
			point_size: config.field.point_size,
		};
		let runtime = HeroRuntime::new(choreography.clone(), field);
		let mounted = mount_hero(&host, gate, runtime, surface, move || {
			pointer.get_untracked().map(|p| p.ndc)
		});
		debug!("skyline-hero: hero loop holds {} registrations", mounted.len());
		subs.update_value(|s| {
			s.release_all();
			s.extend(mounted);
		});
	});
	on_cleanup(move || subs.update_value(|s| s.release_all()));

	let glow_style = move || motion.with(|m| format!("opacity:{:.3}", m.get(Channel::GlowOpacity)));
	let canvas_style = move || {
		motion.with(|m| {
			format!(
				"opacity:{:.3};transform:scale({:.4})",
				m.get(Channel::CanvasOpacity),
				m.get(Channel::CanvasScale),
			)
		})
	};
	let text_style = move || {
		motion.with(|m| {
			format!(
				"opacity:{:.3};transform:translateY({:.1}px);filter:blur({:.2}px)",
				m.get(Channel::TextOpacity),
				m.get(Channel::TextLift),
				m.get(Channel::TextBlur),
			)
		})
	};
	let next_style = move || {
		motion.with(|m| {
			let opacity = m.get(Channel::NextOpacity);
			format!(
				"opacity:{:.3};transform:translateY({:.1}px);pointer-events:{}",
				opacity,
				m.get(Channel::NextLift),
				if opacity > 0.5 { "auto" } else { "none" },
			)
		})
	};

	view! {
		<Style>{HERO_CSS}</Style>
		<section class=class style=wrapper_style node_ref=wrapper_ref>
			<div class="hero-stage">
				<Show
					when=move || canvas_live.get()
					fallback=|| view! { <div class="hero-backdrop" aria-hidden="true"></div> }
				>
					<canvas class="hero-canvas" node_ref=canvas_ref style=canvas_style aria-hidden="true"></canvas>
				</Show>
				<div class="hero-glow" style=glow_style aria-hidden="true"></div>
				<div class="hero-text" style=text_style>{children()}</div>
				<div class="hero-next" style=next_style>{next.map(|next| next())}</div>
			</div>
		</section>
	}
}
