//! Scroll-linked hero zoom and header reveal.
//!
//! ## Frame Cycle
//!
//! Scroll, resize and hero-resize events never touch styles directly. They
//! only request an animation frame, and at most one request is outstanding
//! at a time:
//!
//! ```text
//! on_scroll ─┐
//! on_resize ─┼─▶ frame pending? ── yes ──▶ ignore
//! on_hero_.. ┘        │ no
//!                     ▼
//!            scheduler.request_frame()
//!                     ▼
//!       run_frame(measure) → recompute → apply
//! ```
//!
//! `run_frame` writes two custom properties, `--hero-zoom` and
//! `--header-strength`, and skips a write when the value moved by less than
//! `epsilon` since the last one written.
//!
//! ## Header Reveal
//!
//! [`HeaderReveal`] hides the header on the first home visit and shows it a
//! fixed delay after content has loaded. Every other route, and every later
//! home visit, shows it immediately. Reduced motion skips the delay.

use crate::config::ParallaxConfig;
use std::time::{Duration, Instant};

pub const HERO_ZOOM_PROPERTY: &str = "--hero-zoom";
pub const HEADER_STRENGTH_PROPERTY: &str = "--header-strength";

/// Host hook for `requestAnimationFrame`.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Host hook for writing a CSS custom property on the document root.
pub trait StyleSink {
    fn set_property(&mut self, name: &str, value: &str);
}

/// Layout measurements taken at the start of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeroMetrics {
    pub scroll_y: f64,
    pub hero_top: f64,
    pub hero_height: f64,
}

impl HeroMetrics {
    /// How far the page has scrolled through the hero, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.hero_height <= 0.0 {
            return 0.0;
        }
        ((self.scroll_y - self.hero_top) / self.hero_height).clamp(0.0, 1.0)
    }
}

/// Values computed for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyle {
    pub zoom: f64,
    pub header_strength: f64,
}

#[derive(Debug, Clone)]
pub struct Parallax {
    zoom_range: f64,
    epsilon: f64,
    reduced_motion: bool,
    home: bool,
    frame_pending: bool,
    last_zoom: Option<f64>,
    last_strength: Option<f64>,
}

impl Parallax {
    pub fn new(config: &ParallaxConfig) -> Self {
        Self {
            zoom_range: config.zoom_range,
            epsilon: config.epsilon,
            reduced_motion: false,
            home: true,
            frame_pending: false,
            last_zoom: None,
            last_strength: None,
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn set_home(&mut self, home: bool) {
        self.home = home;
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn on_scroll(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.schedule(scheduler)
    }

    pub fn on_resize(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.schedule(scheduler)
    }

    pub fn on_hero_resize(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.schedule(scheduler)
    }

    /// Request a frame unless one is already pending. Returns whether a new
    /// request was made.
    fn schedule(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        scheduler.request_frame();
        true
    }

    pub fn compute(&self, metrics: &HeroMetrics) -> FrameStyle {
        let progress = metrics.progress();
        let zoom = if self.reduced_motion {
            1.0
        } else {
            1.0 + progress * self.zoom_range
        };
        let header_strength = if self.home { progress } else { 1.0 };
        FrameStyle {
            zoom,
            header_strength,
        }
    }

    /// The frame callback: recompute from `metrics` and apply.
    pub fn run_frame(&mut self, metrics: &HeroMetrics, sink: &mut impl StyleSink) -> FrameStyle {
        self.frame_pending = false;
        let style = self.compute(metrics);
        if changed(self.last_zoom, style.zoom, self.epsilon) {
            sink.set_property(HERO_ZOOM_PROPERTY, &format_value(style.zoom));
            self.last_zoom = Some(style.zoom);
        }
        if changed(self.last_strength, style.header_strength, self.epsilon) {
            sink.set_property(HEADER_STRENGTH_PROPERTY, &format_value(style.header_strength));
            self.last_strength = Some(style.header_strength);
        }
        style
    }
}

fn changed(last: Option<f64>, next: f64, epsilon: f64) -> bool {
    last.is_none_or(|last| (next - last).abs() >= epsilon)
}

fn format_value(value: f64) -> String {
    format!("{value:.4}")
}

#[derive(Debug, Clone)]
pub struct HeaderReveal {
    delay: Duration,
    reduced_motion: bool,
    home_visited: bool,
    revealed: bool,
    reveal_at: Option<Instant>,
}

impl HeaderReveal {
    pub fn new(config: &ParallaxConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.reveal_delay_ms),
            reduced_motion: false,
            home_visited: false,
            revealed: false,
            reveal_at: None,
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced {
            self.revealed = true;
            self.reveal_at = None;
        }
    }

    /// Called whenever the route changes.
    pub fn enter_route(&mut self, is_home: bool) {
        self.reveal_at = None;
        if !is_home || self.home_visited || self.reduced_motion {
            self.revealed = true;
        } else {
            self.revealed = false;
        }
        if is_home {
            self.home_visited = true;
        }
    }

    /// Content for the current route finished loading at `now`.
    pub fn content_loaded(&mut self, now: Instant) {
        if !self.revealed && self.reveal_at.is_none() {
            self.reveal_at = Some(now + self.delay);
        }
    }

    /// Advance the timer; returns whether the header is now revealed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(at) = self.reveal_at
            && now >= at
        {
            self.revealed = true;
            self.reveal_at = None;
        }
        self.revealed
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}
