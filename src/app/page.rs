//! Simulated page scroll for `GalaxyApp`.
//!
//! The visualization lives inside a taller page. Wheel input the state
//! machine does not consume scrolls the page with momentum; programmatic
//! `scroll_to` animates smoothly and reports completion once it lands.

use concept_galaxy::fast_math::{ease_in_out_cubic, lerp};
use concept_galaxy::scroll::Viewport;

/// Momentum decay rate (1/s). Total travel of one wheel event equals its
/// delta because velocity is `delta * FRICTION`.
const FRICTION: f32 = 9.0;
const MIN_VELOCITY: f32 = 2.0;
const SCROLL_TO_DURATION: f64 = 0.45;

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    start: Option<f64>,
}

/// What happened to the page during one `step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStep {
    pub moved: bool,
    /// A programmatic scroll finished this frame
    pub scroll_ended: bool,
}

#[derive(Debug)]
pub struct PageScroller {
    offset: f32,
    viewport_height: f32,
    content_height: f32,
    velocity: f32,
    animation: Option<ScrollAnimation>,
}

impl PageScroller {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            viewport_height: 800.0,
            content_height: 800.0,
            velocity: 0.0,
            animation: None,
        }
    }

    pub fn set_geometry(&mut self, viewport_height: f32, content_height: f32) {
        self.viewport_height = viewport_height.max(1.0);
        self.content_height = content_height.max(self.viewport_height);
        self.offset = self.clamp(self.offset);
    }

    fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Native wheel scroll (positive = down).
    pub fn wheel(&mut self, delta: f32) {
        if self.animation.is_some() {
            return;
        }
        self.velocity += delta * FRICTION;
    }

    pub fn is_moving(&self) -> bool {
        self.animation.is_some() || self.velocity.abs() > MIN_VELOCITY
    }

    pub fn step(&mut self, now: f64, dt: f32) -> PageStep {
        let before = self.offset;
        let mut scroll_ended = false;

        if let Some(anim) = self.animation.as_mut() {
            let start = *anim.start.get_or_insert(now);
            let t = ((now - start) / SCROLL_TO_DURATION).clamp(0.0, 1.0) as f32;
            let (from, to) = (anim.from, anim.to);
            self.offset = lerp(from, to, ease_in_out_cubic(t));
            if t >= 1.0 {
                self.offset = to;
                self.animation = None;
                scroll_ended = true;
            }
        } else if self.velocity.abs() > MIN_VELOCITY {
            self.offset += self.velocity * dt;
            self.velocity *= (-FRICTION * dt).exp();
        } else {
            self.velocity = 0.0;
        }

        let clamped = self.clamp(self.offset);
        if clamped != self.offset {
            self.offset = clamped;
            self.velocity = 0.0;
        }
        PageStep {
            moved: self.offset != before,
            scroll_ended,
        }
    }
}

impl Viewport for PageScroller {
    fn scroll_offset(&self) -> f32 {
        self.offset
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn scroll_to(&mut self, offset: f32) {
        self.velocity = 0.0;
        self.animation = Some(ScrollAnimation {
            from: self.offset,
            to: self.clamp(offset),
            start: None,
        });
    }

    fn stop_momentum(&mut self) {
        self.velocity = 0.0;
    }
}
