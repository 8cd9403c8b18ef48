//! Scroll Mode State Machine
//!
//! Turns wheel and page-scroll events into view mode changes while the
//! visualization is pinned to the top of the viewport:
//! - Wheel down: Galaxy → Clusters → Timeline → past the visualization
//! - Wheel up: Timeline → Clusters → Galaxy → page scrolls up normally
//! - Snap-back: scrolling up from the content below re-enters at Timeline
//! - Dead zone: a scroll that settles halfway through the container is
//!   pushed past it
//!
//! Native page scrolling can only be corrected after the fact, so every
//! programmatic scroll holds a lock that the scroll listener respects until
//! the scroll-end signal (or a timeout) releases it.

use serde::{Deserialize, Serialize};

// ── Modes ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GalaxyMode {
    #[default]
    Galaxy,
    Clusters,
    Timeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    /// Positive deltas scroll the page down.
    pub fn from_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Down)
        } else if delta < 0.0 {
            Some(Self::Up)
        } else {
            None
        }
    }
}

/// Result of one accepted wheel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStep {
    Goto(GalaxyMode),
    /// Leave the visualization downward into the page content
    ExitBelow,
    /// Let the page scroll natively
    PassThrough,
}

impl GalaxyMode {
    pub const ALL: [GalaxyMode; 3] = [GalaxyMode::Galaxy, GalaxyMode::Clusters, GalaxyMode::Timeline];

    pub fn label(self) -> &'static str {
        match self {
            GalaxyMode::Galaxy => "Galaxy",
            GalaxyMode::Clusters => "Clusters",
            GalaxyMode::Timeline => "Timeline",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            GalaxyMode::Galaxy => Some(GalaxyMode::Clusters),
            GalaxyMode::Clusters => Some(GalaxyMode::Timeline),
            GalaxyMode::Timeline => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            GalaxyMode::Galaxy => None,
            GalaxyMode::Clusters => Some(GalaxyMode::Galaxy),
            GalaxyMode::Timeline => Some(GalaxyMode::Clusters),
        }
    }

    /// Transition table for an accepted wheel event.
    pub fn on_wheel(self, direction: WheelDirection) -> ModeStep {
        match (self, direction) {
            (GalaxyMode::Timeline, WheelDirection::Down) => ModeStep::ExitBelow,
            (GalaxyMode::Galaxy, WheelDirection::Up) => ModeStep::PassThrough,
            (mode, WheelDirection::Down) => mode.next().map_or(ModeStep::ExitBelow, ModeStep::Goto),
            (mode, WheelDirection::Up) => mode.prev().map_or(ModeStep::PassThrough, ModeStep::Goto),
        }
    }
}

// ── Config ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Minimum seconds between two accepted wheel events
    pub wheel_cooldown: f64,
    /// Lock released after this long if no scroll-end signal arrives
    pub lock_timeout: f64,
    /// Quiet period before the dead-zone correction runs
    pub settle_delay: f64,
    /// Pixels within which the container counts as pinned / cleared
    pub pin_tolerance: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_cooldown: 0.8,
            lock_timeout: 0.8,
            settle_delay: 0.15,
            pin_tolerance: 4.0,
        }
    }
}

// ── Page abstraction ──

/// The scrollable page hosting the visualization.
pub trait Viewport {
    /// Page offset of the viewport top.
    fn scroll_offset(&self) -> f32;
    fn viewport_height(&self) -> f32;
    /// Start a smooth scroll. Completion is reported through
    /// `ScrollStateMachine::on_scroll_end`.
    fn scroll_to(&mut self, offset: f32);
    /// Drop any native scroll momentum. A running `scroll_to` keeps going.
    fn stop_momentum(&mut self);
}

/// Visualization container in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VizBounds {
    pub top: f32,
    pub height: f32,
}

impl VizBounds {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelResponse {
    /// The page must not scroll for this event
    pub consumed: bool,
    /// New mode, when the event changed it
    pub mode_changed: Option<GalaxyMode>,
}

impl WheelResponse {
    fn pass() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            consumed: true,
            mode_changed: None,
        }
    }
}

// ── State machine ──

#[derive(Debug, Clone)]
pub struct ScrollStateMachine {
    mode: GalaxyMode,
    past_visualization: bool,
    /// Reentrancy lock held during programmatic scrolls
    transitioning: bool,
    lock_started: f64,
    last_wheel: Option<f64>,
    last_scroll: f64,
    last_offset: Option<f32>,
    /// Dead-zone check already ran for the current quiet period
    settled_checked: bool,
    cfg: ScrollConfig,
}

impl ScrollStateMachine {
    pub fn new(cfg: ScrollConfig) -> Self {
        Self {
            mode: GalaxyMode::Galaxy,
            past_visualization: false,
            transitioning: false,
            lock_started: 0.0,
            last_wheel: None,
            last_scroll: 0.0,
            last_offset: None,
            settled_checked: true,
            cfg,
        }
    }

    pub fn mode(&self) -> GalaxyMode {
        self.mode
    }

    pub fn is_past(&self) -> bool {
        self.past_visualization
    }

    pub fn is_locked(&self) -> bool {
        self.transitioning
    }

    /// Container pinned at the viewport top and not already left behind.
    pub fn is_engaged(&self, bounds: VizBounds, viewport: &dyn Viewport) -> bool {
        !self.past_visualization
            && (viewport.scroll_offset() - bounds.top).abs() <= self.cfg.pin_tolerance
    }

    fn lock_and_scroll(&mut self, viewport: &mut dyn Viewport, offset: f32, now: f64) {
        self.transitioning = true;
        self.lock_started = now;
        viewport.scroll_to(offset);
    }

    /// Wheel event with vertical `delta` (positive = down).
    pub fn on_wheel(
        &mut self,
        delta: f32,
        bounds: VizBounds,
        viewport: &mut dyn Viewport,
        now: f64,
    ) -> WheelResponse {
        if self.transitioning {
            return WheelResponse::consumed();
        }
        let Some(direction) = WheelDirection::from_delta(delta) else {
            return WheelResponse::pass();
        };
        if !self.is_engaged(bounds, viewport) {
            return WheelResponse::pass();
        }
        if let Some(last) = self.last_wheel {
            if now - last < self.cfg.wheel_cooldown {
                viewport.stop_momentum();
                return WheelResponse::consumed();
            }
        }

        match self.mode.on_wheel(direction) {
            ModeStep::Goto(mode) => {
                log::debug!("wheel {:?}: {:?} -> {:?}", direction, self.mode, mode);
                // Leftover page momentum would drift the pinned container
                viewport.stop_momentum();
                self.mode = mode;
                self.last_wheel = Some(now);
                WheelResponse {
                    consumed: true,
                    mode_changed: Some(mode),
                }
            }
            ModeStep::ExitBelow => {
                log::debug!("wheel down from {:?}: leaving visualization", self.mode);
                self.past_visualization = true;
                self.last_wheel = Some(now);
                self.lock_and_scroll(viewport, bounds.bottom(), now);
                WheelResponse::consumed()
            }
            ModeStep::PassThrough => WheelResponse::pass(),
        }
    }

    /// Page scrolled (natively or programmatically). Returns the new mode if
    /// a snap-back changed it.
    pub fn on_scroll(
        &mut self,
        bounds: VizBounds,
        viewport: &mut dyn Viewport,
        now: f64,
    ) -> Option<GalaxyMode> {
        let offset = viewport.scroll_offset();
        let previous = self.last_offset.replace(offset);
        self.last_scroll = now;
        self.settled_checked = false;
        if self.transitioning {
            return None;
        }
        let tol = self.cfg.pin_tolerance;
        let moving_up = previous.is_some_and(|p| offset < p);
        let moving_down = previous.is_some_and(|p| offset > p);

        if self.past_visualization {
            if moving_up && offset < bounds.bottom() - tol {
                log::debug!("snap-back into visualization at offset {:.0}", offset);
                let changed = self.mode != GalaxyMode::Timeline;
                self.mode = GalaxyMode::Timeline;
                self.past_visualization = false;
                self.lock_and_scroll(viewport, bounds.top, now);
                return changed.then_some(GalaxyMode::Timeline);
            }
            return None;
        }

        if offset >= bounds.bottom() - tol {
            log::debug!("scrolled below visualization");
            self.past_visualization = true;
        } else if moving_down
            && previous.is_some_and(|p| p < bounds.top + tol)
            && offset > bounds.top + tol
        {
            // Crossed the pin window going down; pin the container
            self.lock_and_scroll(viewport, bounds.top, now);
        }
        None
    }

    /// The programmatic scroll finished.
    pub fn on_scroll_end(&mut self, _now: f64) {
        if self.transitioning {
            log::debug!("scroll end: lock released");
        }
        self.transitioning = false;
    }

    /// Per-frame housekeeping: lock timeout and dead-zone correction.
    pub fn tick(&mut self, bounds: VizBounds, viewport: &mut dyn Viewport, now: f64) {
        if self.transitioning {
            if now - self.lock_started >= self.cfg.lock_timeout {
                log::debug!("no scroll end within {:.2}s, releasing lock", self.cfg.lock_timeout);
                self.transitioning = false;
            }
            return;
        }
        if self.settled_checked || now - self.last_scroll < self.cfg.settle_delay {
            return;
        }
        self.settled_checked = true;

        let offset = viewport.scroll_offset();
        let tol = self.cfg.pin_tolerance;
        if !self.past_visualization && offset > bounds.top + tol && offset < bounds.bottom() - tol {
            log::debug!("scroll settled mid-container at {:.0}, moving past", offset);
            self.past_visualization = true;
            self.lock_and_scroll(viewport, bounds.bottom(), now);
        }
    }

    /// Mode chosen from the UI. Bypasses cooldown and lock; returns whether
    /// the mode changed.
    pub fn select_mode(&mut self, mode: GalaxyMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }
}
