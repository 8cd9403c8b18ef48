/// Concept Position Animator.
///
/// Moves every concept from where it is currently drawn to where the newly
/// selected layout wants it.
/// - Position Transition: eased lerp between a "previous" snapshot and a
///   "target" layout, restarted from the last rendered positions on every
///   mode change, so nothing snaps when a transition is interrupted
/// - Overlay Sequencer: timeline constellation lines wait for the stars to
///   arrive before fading in, and fade out before the stars leave

use serde::{Deserialize, Serialize};

use crate::fast_math::{ease_in_out_cubic, lerp3, Vec3};
use crate::layout::LayoutPositionMap;
use crate::scroll::GalaxyMode;

/// Shortest duration accepted for any timed phase (seconds).
const MIN_DURATION: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds for a full concept position transition
    pub transition_duration: f32,
    /// Lines stay hidden this long after entering the timeline
    pub line_settle_delay: f32,
    pub line_fade_in: f32,
    pub line_fade_out: f32,
    /// Star field dispersion speed (progress units per second)
    pub dispersion_rate: f32,
    /// World distance a star drifts when fully dispersed
    pub dispersion_spread: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition_duration: 1.5,
            line_settle_delay: 1.6,
            line_fade_in: 0.8,
            line_fade_out: 0.5,
            dispersion_rate: 1.2,
            dispersion_spread: 6.0,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PositionTransition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-concept interpolation state. Index `i` of every buffer belongs to
/// `ids[i]`.
#[derive(Debug, Clone)]
pub struct PositionTransition {
    ids: Vec<String>,
    previous: Vec<Vec3>,
    target: Vec<Vec3>,
    current: Vec<Vec3>,
    /// Linear progress in [0, 1]; the ease is applied on read
    progress: f32,
    duration: f32,
    mode: GalaxyMode,
}

impl PositionTransition {
    /// A settled transition resting on `layout`.
    pub fn settled(mode: GalaxyMode, ids: &[String], layout: &LayoutPositionMap, duration: f32) -> Self {
        let target: Vec<Vec3> = ids.iter().map(|id| layout.get_or_origin(id)).collect();
        Self {
            ids: ids.to_vec(),
            previous: target.clone(),
            current: target.clone(),
            target,
            progress: 1.0,
            duration: duration.max(MIN_DURATION),
            mode,
        }
    }

    /// Begin moving toward `layout`.
    ///
    /// The previous snapshot is whatever is being rendered right now, which
    /// may itself be mid-flight. When the concept list changed, surviving ids
    /// keep their rendered position and new ids start on their target.
    pub fn start(&mut self, mode: GalaxyMode, ids: &[String], layout: &LayoutPositionMap) {
        let target: Vec<Vec3> = ids.iter().map(|id| layout.get_or_origin(id)).collect();
        let previous = if ids == self.ids.as_slice() {
            self.current.clone()
        } else {
            ids.iter()
                .zip(&target)
                .map(|(id, t)| self.position_of(id).unwrap_or(*t))
                .collect()
        };
        self.ids = ids.to_vec();
        self.current = previous.clone();
        self.previous = previous;
        self.target = target;
        self.progress = 0.0;
        self.mode = mode;
    }

    /// Advance by `dt` seconds and recompute the rendered positions.
    /// Returns true while still moving.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.progress >= 1.0 {
            return false;
        }
        self.progress = (self.progress + dt.max(0.0) / self.duration).min(1.0);
        let eased = self.eased();
        for ((cur, prev), tgt) in self.current.iter_mut().zip(&self.previous).zip(&self.target) {
            *cur = lerp3(*prev, *tgt, eased);
        }
        self.progress < 1.0
    }

    pub fn eased(&self) -> f32 {
        ease_in_out_cubic(self.progress)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    /// Mode whose layout the concepts are moving toward (or resting on).
    pub fn mode(&self) -> GalaxyMode {
        self.mode
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Positions as they should be drawn this frame.
    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    #[cfg(test)]
    pub(crate) fn previous(&self) -> &[Vec3] {
        &self.previous
    }

    pub fn position_of(&self, id: &str) -> Option<Vec3> {
        self.ids.iter().position(|x| x == id).map(|i| self.current[i])
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OverlaySequencer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayPhase {
    /// Lines invisible, nothing pending
    Hidden,
    /// Entered the timeline; waiting for the delay and for the stars to land
    Settling { waited: f32 },
    FadingIn,
    Shown,
    /// Leaving the timeline; stars are held until opacity reaches zero
    FadingOut,
}

/// What the position transition may do after a mode request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Handoff {
    /// Start moving toward this mode now
    StartNow(GalaxyMode),
    /// Held until the overlay finishes fading out; `advance` will release it
    Deferred,
    /// Stars already rest on (or move toward) the requested layout
    Unchanged,
}

/// Handshake between the timeline line overlay and the concept positions.
///
/// Two facts drive it: whether lines are visible (`opacity > 0`) and whether
/// the stars have settled. Stars may only leave the timeline once lines are
/// gone; lines may only appear once the stars have arrived.
#[derive(Debug, Clone)]
pub struct OverlaySequencer {
    phase: OverlayPhase,
    opacity: f32,
    stars_settled: bool,
    deferred: Option<GalaxyMode>,
    settle_delay: f32,
    fade_in: f32,
    fade_out: f32,
}

impl OverlaySequencer {
    pub fn new(cfg: &AnimationConfig) -> Self {
        Self {
            phase: OverlayPhase::Hidden,
            opacity: 0.0,
            stars_settled: true,
            deferred: None,
            settle_delay: cfg.line_settle_delay.max(0.0),
            fade_in: cfg.line_fade_in.max(MIN_DURATION),
            fade_out: cfg.line_fade_out.max(MIN_DURATION),
        }
    }

    /// Lines fully shown from the start (scene constructed in timeline mode).
    pub fn shown(cfg: &AnimationConfig) -> Self {
        Self {
            phase: OverlayPhase::Shown,
            opacity: 1.0,
            ..Self::new(cfg)
        }
    }

    /// Coordinate a mode request. `stars_mode` is the layout the stars rest
    /// on or are currently heading to.
    pub fn request(&mut self, stars_mode: GalaxyMode, to: GalaxyMode) -> Handoff {
        if to == GalaxyMode::Timeline {
            if self.phase == OverlayPhase::FadingOut {
                // Stars never left; turn the fade around
                self.deferred = None;
                self.phase = OverlayPhase::FadingIn;
                return Handoff::Unchanged;
            }
            if stars_mode == GalaxyMode::Timeline {
                return Handoff::Unchanged;
            }
            self.phase = OverlayPhase::Settling { waited: 0.0 };
            self.opacity = 0.0;
            self.stars_settled = false;
            return Handoff::StartNow(GalaxyMode::Timeline);
        }

        if stars_mode == GalaxyMode::Timeline && self.lines_visible() {
            self.phase = OverlayPhase::FadingOut;
            self.deferred = Some(to);
            return Handoff::Deferred;
        }

        self.phase = OverlayPhase::Hidden;
        self.opacity = 0.0;
        self.deferred = None;
        if to == stars_mode {
            Handoff::Unchanged
        } else {
            Handoff::StartNow(to)
        }
    }

    /// Report whether the position transition has landed.
    pub fn set_stars_settled(&mut self, settled: bool) {
        self.stars_settled = settled;
    }

    /// Step the overlay. Returns the deferred mode on the frame the lines
    /// become fully invisible; the caller starts the position transition then.
    pub fn advance(&mut self, dt: f32) -> Option<GalaxyMode> {
        let dt = dt.max(0.0);
        match self.phase {
            OverlayPhase::Settling { waited } => {
                let waited = waited + dt;
                if waited >= self.settle_delay && self.stars_settled {
                    self.phase = OverlayPhase::FadingIn;
                } else {
                    self.phase = OverlayPhase::Settling { waited };
                }
                None
            }
            OverlayPhase::FadingIn => {
                self.opacity = (self.opacity + dt / self.fade_in).min(1.0);
                if self.opacity >= 1.0 {
                    self.phase = OverlayPhase::Shown;
                }
                None
            }
            OverlayPhase::FadingOut => {
                self.opacity = (self.opacity - dt / self.fade_out).max(0.0);
                if self.opacity <= 0.0 {
                    self.phase = OverlayPhase::Hidden;
                    self.deferred.take()
                } else {
                    None
                }
            }
            OverlayPhase::Hidden | OverlayPhase::Shown => None,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn lines_visible(&self) -> bool {
        self.opacity > 0.0
    }

    #[cfg(test)]
    pub(crate) fn deferred(&self) -> Option<GalaxyMode> {
        self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn layout(entries: &[(&str, Vec3)]) -> LayoutPositionMap {
        let mut map = LayoutPositionMap::default();
        for (id, p) in entries {
            map.insert(*id, *p);
        }
        map
    }

    #[test]
    fn progress_monotonic_and_bounded() {
        let ids = ids(&["a"]);
        let from = layout(&[("a", [0.0; 3])]);
        let to = layout(&[("a", [3.0, 0.0, 0.0])]);
        let mut t = PositionTransition::settled(GalaxyMode::Galaxy, &ids, &from, 1.5);
        t.start(GalaxyMode::Clusters, &ids, &to);
        assert_eq!(t.progress(), 0.0);
        assert_eq!(t.eased(), 0.0);
        let mut last = 0.0;
        for _ in 0..200 {
            t.advance(0.016);
            assert!(t.progress() >= last);
            assert!(t.progress() <= 1.0);
            last = t.progress();
        }
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.eased(), 1.0);
        assert_eq!(t.current()[0], [3.0, 0.0, 0.0]);
    }

    #[test]
    fn interrupted_transition_continues_from_rendered_position() {
        let ids = ids(&["a", "b"]);
        let galaxy = layout(&[("a", [0.0; 3]), ("b", [1.0, 1.0, 1.0])]);
        let clusters = layout(&[("a", [4.0, 0.0, 0.0]), ("b", [-2.0, 0.0, 2.0])]);
        let timeline = layout(&[("a", [0.0, 5.0, 0.0]), ("b", [0.0, -5.0, 0.0])]);

        let mut t = PositionTransition::settled(GalaxyMode::Galaxy, &ids, &galaxy, 1.5);
        t.start(GalaxyMode::Clusters, &ids, &clusters);
        t.advance(0.5);
        assert!(t.progress() < 1.0);
        let rendered = t.current().to_vec();

        t.start(GalaxyMode::Timeline, &ids, &timeline);
        assert_eq!(t.previous(), rendered.as_slice());
        assert_eq!(t.current(), rendered.as_slice());
        // First frame of the new transition is still continuous
        t.advance(0.001);
        for (cur, prev) in t.current().iter().zip(&rendered) {
            assert!(crate::fast_math::distance_squared3(*cur, *prev) < 1e-4);
        }
    }

    #[test]
    fn concept_list_change_remaps_by_id() {
        let old_ids = ids(&["a", "b"]);
        let new_ids = ids(&["b", "c"]);
        let start = layout(&[("a", [1.0, 0.0, 0.0]), ("b", [2.0, 0.0, 0.0])]);
        let next = layout(&[("b", [9.0, 0.0, 0.0]), ("c", [7.0, 7.0, 7.0])]);
        let mut t = PositionTransition::settled(GalaxyMode::Galaxy, &old_ids, &start, 1.0);
        t.start(GalaxyMode::Galaxy, &new_ids, &next);
        assert_eq!(t.previous(), &[[2.0, 0.0, 0.0], [7.0, 7.0, 7.0]]);
        assert_eq!(t.ids(), new_ids.as_slice());
    }

    #[test]
    fn missing_layout_entry_falls_back_to_origin() {
        let ids = ids(&["ghost"]);
        let t = PositionTransition::settled(GalaxyMode::Galaxy, &ids, &LayoutPositionMap::default(), 1.0);
        assert_eq!(t.current(), &[[0.0; 3]]);
    }

    fn cfg() -> AnimationConfig {
        AnimationConfig::default()
    }

    #[test]
    fn entering_timeline_waits_then_fades_in() {
        let mut seq = OverlaySequencer::new(&cfg());
        let handoff = seq.request(GalaxyMode::Clusters, GalaxyMode::Timeline);
        assert_eq!(handoff, Handoff::StartNow(GalaxyMode::Timeline));
        seq.set_stars_settled(false);

        // Delay not yet elapsed: lines stay invisible
        for _ in 0..10 {
            seq.advance(0.1);
            assert!(!seq.lines_visible());
        }
        seq.set_stars_settled(true);
        seq.advance(0.7); // waited 1.7 ≥ 1.6 → fading in
        assert_eq!(seq.phase(), OverlayPhase::FadingIn);
        seq.advance(0.4);
        assert!((seq.opacity() - 0.5).abs() < 1e-5);
        seq.advance(0.5);
        assert_eq!(seq.phase(), OverlayPhase::Shown);
        assert_eq!(seq.opacity(), 1.0);
    }

    #[test]
    fn settle_waits_for_stars_even_after_delay() {
        let mut seq = OverlaySequencer::new(&cfg());
        seq.request(GalaxyMode::Galaxy, GalaxyMode::Timeline);
        seq.set_stars_settled(false);
        seq.advance(5.0);
        assert!(matches!(seq.phase(), OverlayPhase::Settling { .. }));
        seq.set_stars_settled(true);
        seq.advance(0.0);
        assert_eq!(seq.phase(), OverlayPhase::FadingIn);
    }

    #[test]
    fn leaving_timeline_defers_until_lines_clear() {
        let mut seq = OverlaySequencer::shown(&cfg());
        let handoff = seq.request(GalaxyMode::Timeline, GalaxyMode::Clusters);
        assert_eq!(handoff, Handoff::Deferred);
        assert_eq!(seq.advance(0.2), None);
        assert!(seq.lines_visible());
        assert_eq!(seq.advance(0.2), None);
        // 0.5s fade: the third step clears the lines and releases the mode
        assert_eq!(seq.advance(0.2), Some(GalaxyMode::Clusters));
        assert!(!seq.lines_visible());
        assert_eq!(seq.phase(), OverlayPhase::Hidden);
        assert_eq!(seq.advance(0.2), None);
    }

    #[test]
    fn reentering_timeline_during_fade_out_reverses() {
        let mut seq = OverlaySequencer::shown(&cfg());
        seq.request(GalaxyMode::Timeline, GalaxyMode::Clusters);
        seq.advance(0.25);
        let handoff = seq.request(GalaxyMode::Timeline, GalaxyMode::Timeline);
        assert_eq!(handoff, Handoff::Unchanged);
        assert_eq!(seq.deferred(), None);
        assert_eq!(seq.phase(), OverlayPhase::FadingIn);
        seq.advance(1.0);
        assert_eq!(seq.phase(), OverlayPhase::Shown);
    }

    #[test]
    fn later_request_replaces_deferred_mode() {
        let mut seq = OverlaySequencer::shown(&cfg());
        seq.request(GalaxyMode::Timeline, GalaxyMode::Clusters);
        seq.advance(0.1);
        assert_eq!(seq.request(GalaxyMode::Timeline, GalaxyMode::Galaxy), Handoff::Deferred);
        assert_eq!(seq.advance(1.0), Some(GalaxyMode::Galaxy));
    }

    #[test]
    fn leaving_timeline_before_lines_appear_is_immediate() {
        let mut seq = OverlaySequencer::new(&cfg());
        seq.request(GalaxyMode::Clusters, GalaxyMode::Timeline);
        seq.advance(0.3);
        let handoff = seq.request(GalaxyMode::Timeline, GalaxyMode::Clusters);
        assert_eq!(handoff, Handoff::StartNow(GalaxyMode::Clusters));
        assert_eq!(seq.phase(), OverlayPhase::Hidden);
    }

    #[test]
    fn non_timeline_switches_pass_straight_through() {
        let mut seq = OverlaySequencer::new(&cfg());
        assert_eq!(
            seq.request(GalaxyMode::Galaxy, GalaxyMode::Clusters),
            Handoff::StartNow(GalaxyMode::Clusters)
        );
        assert_eq!(seq.request(GalaxyMode::Clusters, GalaxyMode::Clusters), Handoff::Unchanged);
    }
}
