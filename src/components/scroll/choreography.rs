//! Scroll-driven choreography for the pinned hero.
//!
//! A single scalar, the scroll progress through the pinned wrapper, drives
//! every animated channel. Each channel maps its own progress window to an
//! output range, so channels are evaluated independently and in any order.

/// Easing between a channel's endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interp {
	Linear,
	/// Smoothstep.
	EaseInOut,
}

impl Interp {
	pub fn apply(self, t: f64) -> f64 {
		match self {
			Interp::Linear => t,
			Interp::EaseInOut => t * t * (3.0 - 2.0 * t),
		}
	}
}

/// Which end of its range a channel holds when motion is off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rest {
	Start,
	End,
}

/// Animated property of the hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
	TextOpacity,
	/// Vertical offset of the hero text, px.
	TextLift,
	/// Blur radius of the hero text, px.
	TextBlur,
	GlowOpacity,
	CanvasOpacity,
	CanvasScale,
	NextOpacity,
	/// Vertical offset of the next section, px.
	NextLift,
}

impl Channel {
	pub const COUNT: usize = 8;

	pub const ALL: [Channel; Self::COUNT] = [
		Channel::TextOpacity,
		Channel::TextLift,
		Channel::TextBlur,
		Channel::GlowOpacity,
		Channel::CanvasOpacity,
		Channel::CanvasScale,
		Channel::NextOpacity,
		Channel::NextLift,
	];

	fn index(self) -> usize {
		self as usize
	}
}

/// Maps a progress window `domain` onto an output `range`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSpec {
	pub channel: Channel,
	pub domain: (f64, f64),
	pub range: (f64, f64),
	pub interp: Interp,
	pub rest: Rest,
}

impl ChannelSpec {
	pub const fn new(channel: Channel, domain: (f64, f64), range: (f64, f64), interp: Interp, rest: Rest) -> Self {
		Self {
			channel,
			domain,
			range,
			interp,
			rest,
		}
	}

	/// Output at `progress`, held at the range ends outside the domain.
	pub fn sample(&self, progress: f64) -> f64 {
		let (d0, d1) = self.domain;
		let t = if d1 > d0 {
			((progress - d0) / (d1 - d0)).clamp(0.0, 1.0)
		} else if progress >= d1 {
			1.0
		} else {
			0.0
		};
		let (r0, r1) = self.range;
		r0 + (r1 - r0) * self.interp.apply(t)
	}

	pub fn rest_value(&self) -> f64 {
		match self.rest {
			Rest::Start => self.range.0,
			Rest::End => self.range.1,
		}
	}
}

/// The hero channel table. Text leaves first, the glow lingers a little
/// longer, then the canvas fades as the next section arrives.
pub const HERO_CHANNELS: [ChannelSpec; Channel::COUNT] = [
	ChannelSpec::new(Channel::TextOpacity, (0.05, 0.25), (1.0, 0.0), Interp::Linear, Rest::Start),
	ChannelSpec::new(Channel::TextLift, (0.05, 0.25), (0.0, -80.0), Interp::EaseInOut, Rest::Start),
	ChannelSpec::new(Channel::TextBlur, (0.05, 0.25), (0.0, 8.0), Interp::Linear, Rest::Start),
	ChannelSpec::new(Channel::GlowOpacity, (0.05, 0.30), (1.0, 0.0), Interp::Linear, Rest::Start),
	ChannelSpec::new(Channel::CanvasOpacity, (0.30, 0.60), (1.0, 0.0), Interp::Linear, Rest::Start),
	ChannelSpec::new(Channel::CanvasScale, (0.0, 0.60), (1.0, 1.15), Interp::EaseInOut, Rest::Start),
	ChannelSpec::new(Channel::NextOpacity, (0.55, 0.85), (0.0, 1.0), Interp::Linear, Rest::End),
	ChannelSpec::new(Channel::NextLift, (0.55, 0.85), (60.0, 0.0), Interp::EaseInOut, Rest::End),
];

/// Every channel's value for one progress sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionFrame {
	pub progress: f64,
	values: [f64; Channel::COUNT],
	/// Whether the particle field should skip its per-frame work.
	pub canvas_paused: bool,
}

impl MotionFrame {
	pub fn get(&self, channel: Channel) -> f64 {
		self.values[channel.index()]
	}
}

/// Channel table plus the canvas pause threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct Choreography {
	channels: Vec<ChannelSpec>,
	pause_threshold: f64,
}

impl Choreography {
	pub fn new(channels: Vec<ChannelSpec>, pause_threshold: f64) -> Self {
		Self {
			channels,
			pause_threshold,
		}
	}

	pub fn hero(pause_threshold: f64) -> Self {
		Self::new(HERO_CHANNELS.to_vec(), pause_threshold)
	}

	pub fn channels(&self) -> &[ChannelSpec] {
		&self.channels
	}

	pub fn pause_threshold(&self) -> f64 {
		self.pause_threshold
	}

	/// Evaluate at `progress`, clamped to `[0, 1]`. Channels missing from
	/// the table read 0.
	pub fn evaluate(&self, progress: f64) -> MotionFrame {
		let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
		let mut values = [0.0; Channel::COUNT];
		for spec in &self.channels {
			values[spec.channel.index()] = spec.sample(progress);
		}
		MotionFrame {
			progress,
			values,
			canvas_paused: progress > self.pause_threshold,
		}
	}

	/// Constant frame used when motion is off: every channel at its rest
	/// value and the canvas paused.
	pub fn settled(&self) -> MotionFrame {
		let mut values = [0.0; Channel::COUNT];
		for spec in &self.channels {
			values[spec.channel.index()] = spec.rest_value();
		}
		MotionFrame {
			progress: 0.0,
			values,
			canvas_paused: true,
		}
	}
}

/// Progress through a pinned wrapper from its bounding rect.
///
/// 0 while the wrapper's top is at or below the viewport top, 1 once its
/// bottom reaches the viewport bottom. A wrapper no taller than the viewport
/// has nothing to scroll through and reads 0.
pub fn scroll_progress(wrapper_top: f64, wrapper_height: f64, viewport_height: f64) -> f64 {
	let scrollable = wrapper_height - viewport_height;
	if scrollable <= 0.0 {
		return 0.0;
	}
	(-wrapper_top / scrollable).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hero() -> Choreography {
		Choreography::hero(0.6)
	}

	fn spec(channel: Channel) -> ChannelSpec {
		*HERO_CHANNELS.iter().find(|s| s.channel == channel).unwrap()
	}

	#[test]
	fn table_covers_every_channel_once() {
		for channel in Channel::ALL {
			assert_eq!(HERO_CHANNELS.iter().filter(|s| s.channel == channel).count(), 1);
		}
	}

	#[test]
	fn text_leaves_before_glow() {
		let (text, glow) = (spec(Channel::TextOpacity), spec(Channel::GlowOpacity));
		assert_eq!(text.domain.0, glow.domain.0);
		assert!(text.domain.1 < glow.domain.1);

		let frame = hero().evaluate(0.25);
		assert_eq!(frame.get(Channel::TextOpacity), 0.0);
		assert!(frame.get(Channel::GlowOpacity) > 0.0);
	}

	#[test]
	fn fade_outs_never_brighten() {
		let choreography = hero();
		for channel in [Channel::TextOpacity, Channel::GlowOpacity, Channel::CanvasOpacity] {
			let mut last = f64::INFINITY;
			for i in 0..=200 {
				let value = choreography.evaluate(i as f64 / 200.0).get(channel);
				assert!(value <= last, "{channel:?} rose at step {i}");
				last = value;
			}
		}
	}

	#[test]
	fn held_at_ends_outside_domain() {
		let choreography = hero();
		let start = choreography.evaluate(0.0);
		assert_eq!(start.get(Channel::TextOpacity), 1.0);
		assert_eq!(start.get(Channel::NextOpacity), 0.0);
		assert_eq!(start.get(Channel::NextLift), 60.0);

		let end = choreography.evaluate(1.0);
		assert_eq!(end.get(Channel::CanvasOpacity), 0.0);
		assert_eq!(end.get(Channel::NextOpacity), 1.0);
		assert_eq!(end.get(Channel::NextLift), 0.0);
		assert_eq!(end.get(Channel::CanvasScale), 1.15);
	}

	#[test]
	fn progress_is_clamped() {
		let choreography = hero();
		assert_eq!(choreography.evaluate(-3.0), choreography.evaluate(0.0));
		assert_eq!(choreography.evaluate(7.0), choreography.evaluate(1.0));
		assert_eq!(choreography.evaluate(f64::NAN), choreography.evaluate(0.0));
	}

	#[test]
	fn linear_midpoint() {
		let frame = hero().evaluate(0.15);
		assert!((frame.get(Channel::TextOpacity) - 0.5).abs() < 1e-12);
		assert!((frame.get(Channel::TextBlur) - 4.0).abs() < 1e-12);
	}

	#[test]
	fn ease_in_out_is_symmetric() {
		assert_eq!(Interp::EaseInOut.apply(0.5), 0.5);
		assert!(Interp::EaseInOut.apply(0.25) < 0.25);
		assert!(Interp::EaseInOut.apply(0.75) > 0.75);
	}

	#[test]
	fn canvas_pauses_past_threshold() {
		let choreography = hero();
		assert!(!choreography.evaluate(0.6).canvas_paused);
		assert!(choreography.evaluate(0.61).canvas_paused);
		assert!(!Choreography::hero(0.9).evaluate(0.7).canvas_paused);
	}

	#[test]
	fn settled_keeps_content_visible() {
		let frame = hero().settled();
		assert_eq!(frame.get(Channel::TextOpacity), 1.0);
		assert_eq!(frame.get(Channel::TextBlur), 0.0);
		assert_eq!(frame.get(Channel::NextOpacity), 1.0);
		assert_eq!(frame.get(Channel::NextLift), 0.0);
		assert!(frame.canvas_paused);
	}

	#[test]
	fn channels_evaluate_independently() {
		let full = hero().evaluate(0.4);
		let alone = Choreography::new(vec![spec(Channel::CanvasOpacity)], 0.6).evaluate(0.4);
		assert_eq!(alone.get(Channel::CanvasOpacity), full.get(Channel::CanvasOpacity));
		assert_eq!(alone.get(Channel::TextOpacity), 0.0);

		let mut reversed = HERO_CHANNELS.to_vec();
		reversed.reverse();
		assert_eq!(Choreography::new(reversed, 0.6).evaluate(0.4), full);
	}

	#[test]
	fn degenerate_domain_steps() {
		let step = ChannelSpec::new(Channel::NextOpacity, (0.5, 0.5), (0.0, 1.0), Interp::Linear, Rest::End);
		assert_eq!(step.sample(0.49), 0.0);
		assert_eq!(step.sample(0.5), 1.0);
	}

	#[test]
	fn progress_through_wrapper() {
		// 2.5 viewports tall at 800px: 1200px of scroll.
		assert_eq!(scroll_progress(0.0, 2000.0, 800.0), 0.0);
		assert_eq!(scroll_progress(200.0, 2000.0, 800.0), 0.0);
		assert_eq!(scroll_progress(-600.0, 2000.0, 800.0), 0.5);
		assert_eq!(scroll_progress(-1200.0, 2000.0, 800.0), 1.0);
		assert_eq!(scroll_progress(-5000.0, 2000.0, 800.0), 1.0);
	}

	#[test]
	fn unscrollable_wrapper_reads_zero() {
		assert_eq!(scroll_progress(-100.0, 800.0, 800.0), 0.0);
		assert_eq!(scroll_progress(-100.0, 500.0, 800.0), 0.0);
	}
}
