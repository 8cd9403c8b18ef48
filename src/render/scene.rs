//! Galaxy scene: everything the painter and picker read each frame.
//!
//! Owns the star field, the concept position transition, the timeline line
//! overlay and hover state, and keeps them consistent when the mode, the
//! concept list or the viewport aspect changes.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::concept::Concept;
use crate::config::GalaxyConfig;
use crate::constellation::{self, ConstellationPattern};
use crate::fast_math::Vec3;
use crate::layout::{EmbeddingTable, LayoutCache, Layouts, PatternAssignment};
use crate::render::animator::{
    AnimationConfig, Handoff, OverlayPhase, OverlaySequencer, PositionTransition,
};
use crate::render::camera::Ray;
use crate::render::dispersion::StarFieldState;
use crate::render::picking::{ConceptNavigator, HoverChange, HoverTracker};
use crate::render::starfield::{self, StarFieldParams};
use crate::scroll::GalaxyMode;

const DEFAULT_ASPECT: f32 = 1.6;

/// Dispersion target for a mode: the galaxy is only coalesced in Galaxy.
fn dispersion_target(mode: GalaxyMode) -> f32 {
    match mode {
        GalaxyMode::Galaxy => 0.0,
        GalaxyMode::Clusters | GalaxyMode::Timeline => 1.0,
    }
}

pub struct GalaxyScene {
    concepts: Vec<Concept>,
    ids: Vec<String>,
    aux: EmbeddingTable,
    starfield: StarFieldParams,
    patterns: &'static [ConstellationPattern],
    cache: LayoutCache,
    aspect: f32,
    /// Mode most recently asked for (may differ from the transition's
    /// while the overlay holds a deferred switch)
    requested: GalaxyMode,
    stars: StarFieldState,
    transition: PositionTransition,
    overlay: OverlaySequencer,
    hover: HoverTracker,
    proximity: f32,
}

impl GalaxyScene {
    pub fn new(concepts: Vec<Concept>, cfg: &GalaxyConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let star_data = starfield::generate(&mut rng, &cfg.starfield);
        log::info!(
            "star field: {} points, {} concepts",
            star_data.len(),
            concepts.len()
        );
        let anim: &AnimationConfig = &cfg.animation;
        let stars = StarFieldState::new(star_data, anim.dispersion_rate, anim.dispersion_spread);

        let ids: Vec<String> = concepts.iter().map(|c| c.id.clone()).collect();
        let aux = EmbeddingTable::new();
        let patterns = constellation::catalog();
        let mut cache = LayoutCache::new();
        let layouts =
            cache.get_or_compute(&concepts, &aux, &cfg.starfield, patterns, DEFAULT_ASPECT);
        let transition = PositionTransition::settled(
            GalaxyMode::Galaxy,
            &ids,
            layouts.map(GalaxyMode::Galaxy),
            anim.transition_duration,
        );

        Self {
            concepts,
            ids,
            aux,
            starfield: cfg.starfield.clone(),
            patterns,
            cache,
            aspect: DEFAULT_ASPECT,
            requested: GalaxyMode::Galaxy,
            stars,
            transition,
            overlay: OverlaySequencer::new(anim),
            hover: HoverTracker::default(),
            proximity: cfg.picking.proximity,
        }
    }

    // ── Inputs ──

    /// Switch view mode. Stars head for the new layout now, or once the
    /// timeline lines have faded out.
    pub fn set_mode(&mut self, to: GalaxyMode) {
        self.requested = to;
        self.stars.set_target(dispersion_target(to));
        match self.overlay.request(self.transition.mode(), to) {
            Handoff::StartNow(mode) => self.start_transition(mode),
            Handoff::Deferred => log::debug!("mode {:?} deferred until lines fade", to),
            Handoff::Unchanged => {}
        }
    }

    /// Replace the concept snapshot. Layouts are recomputed and concepts
    /// glide from where they are drawn to their new targets.
    pub fn set_concepts(&mut self, concepts: Vec<Concept>) {
        self.ids = concepts.iter().map(|c| c.id.clone()).collect();
        self.concepts = concepts;
        self.retarget();
    }

    /// Embeddings from the host's auxiliary table (override per-concept ones).
    pub fn set_embeddings(&mut self, aux: EmbeddingTable) {
        self.aux = aux;
        self.retarget();
    }

    /// Viewport width / height. Only changes that move the timeline path
    /// bucket trigger a layout recomputation.
    pub fn set_aspect(&mut self, aspect: f32) {
        if (aspect - self.aspect).abs() < 1e-3 {
            return;
        }
        self.aspect = aspect;
        let before = self.cache.computations();
        self.current_layouts();
        if self.cache.computations() != before {
            self.retarget();
        }
    }

    fn current_layouts(&mut self) -> &Layouts {
        self.cache.get_or_compute(
            &self.concepts,
            &self.aux,
            &self.starfield,
            self.patterns,
            self.aspect,
        )
    }

    fn start_transition(&mut self, mode: GalaxyMode) {
        let layouts = self.cache.get_or_compute(
            &self.concepts,
            &self.aux,
            &self.starfield,
            self.patterns,
            self.aspect,
        );
        self.transition.start(mode, &self.ids, layouts.map(mode));
    }

    /// Restart toward the current destination with fresh layouts.
    fn retarget(&mut self) {
        self.start_transition(self.transition.mode());
    }

    // ── Frame ──

    /// Advance all animation state by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.stars.advance(dt);
        self.transition.advance(dt);
        self.overlay.set_stars_settled(self.transition.is_settled());
        if let Some(mode) = self.overlay.advance(dt) {
            log::debug!("lines cleared, moving to {:?}", mode);
            self.start_transition(mode);
        }
    }

    /// True while anything is still moving (the host keeps repainting).
    pub fn is_animating(&self) -> bool {
        !self.stars.is_settled()
            || !self.transition.is_settled()
            || !matches!(self.overlay.phase(), OverlayPhase::Hidden | OverlayPhase::Shown)
    }

    pub fn update_hover(&mut self, ray: Option<&Ray>) -> HoverChange {
        self.hover
            .update(ray, self.transition.ids(), self.transition.current(), self.proximity)
    }

    pub fn click(&self, ray: &Ray, navigator: &mut dyn ConceptNavigator) -> Option<String> {
        self.hover.click(
            ray,
            self.transition.ids(),
            self.transition.current(),
            self.proximity,
            navigator,
        )
    }

    // ── Reads ──

    pub fn mode(&self) -> GalaxyMode {
        self.requested
    }

    pub fn stars(&self) -> &StarFieldState {
        &self.stars
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.id == id)
    }

    /// Ids and drawn positions, index-aligned.
    pub fn concept_positions(&self) -> (&[String], &[Vec3]) {
        (self.transition.ids(), self.transition.current())
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hover.hovered()
    }

    pub fn line_opacity(&self) -> f32 {
        self.overlay.opacity()
    }

    pub fn assignments(&self) -> &[PatternAssignment] {
        self.cache
            .layouts()
            .map(|l| l.timeline.assignments.as_slice())
            .unwrap_or(&[])
    }

    /// Constellation line segments between the drawn positions of assigned
    /// concepts. Empty while the lines are invisible.
    pub fn line_segments(&self) -> Vec<(Vec3, Vec3)> {
        if !self.overlay.lines_visible() {
            return Vec::new();
        }
        let mut segments = Vec::new();
        for a in self.assignments() {
            let Some(pattern) = self.patterns.get(a.pattern_index) else {
                continue;
            };
            for [i, j] in &pattern.connections {
                let (Some(from), Some(to)) = (a.concept_ids.get(*i), a.concept_ids.get(*j)) else {
                    continue;
                };
                if let (Some(p), Some(q)) =
                    (self.transition.position_of(from), self.transition.position_of(to))
                {
                    segments.push((p, q));
                }
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::test_concept;
    use crate::render::picking::nearest_to_ray;

    fn small_config() -> GalaxyConfig {
        let mut cfg = GalaxyConfig::default();
        cfg.starfield.star_count = 200;
        cfg
    }

    fn concepts() -> Vec<Concept> {
        (0..9)
            .map(|i| test_concept(&format!("c{}", i), &format!("2024-01-0{}", i + 1)))
            .collect()
    }

    fn run(scene: &mut GalaxyScene, seconds: f32) {
        let steps = (seconds / 0.05).round() as usize;
        for _ in 0..steps {
            scene.advance(0.05);
        }
    }

    #[test]
    fn starts_settled_on_galaxy() {
        let scene = GalaxyScene::new(concepts(), &small_config(), 7);
        assert_eq!(scene.mode(), GalaxyMode::Galaxy);
        assert!(!scene.is_animating());
        let (ids, pos) = scene.concept_positions();
        assert_eq!(ids.len(), 9);
        assert_eq!(pos.len(), 9);
    }

    #[test]
    fn star_field_instance_follows_seed() {
        let cfg = small_config();
        let a = GalaxyScene::new(concepts(), &cfg, 7);
        let b = GalaxyScene::new(concepts(), &cfg, 7);
        let c = GalaxyScene::new(concepts(), &cfg, 8);
        assert_eq!(a.stars().positions(), b.stars().positions());
        assert_ne!(a.stars().positions(), c.stars().positions());
        // Concept layouts do not depend on the star seed
        assert_eq!(a.concept_positions().1, c.concept_positions().1);
    }

    #[test]
    fn entering_timeline_shows_lines_after_stars_land() {
        let mut scene = GalaxyScene::new(concepts(), &small_config(), 7);
        scene.set_mode(GalaxyMode::Timeline);
        assert_eq!(scene.stars().target(), 1.0);
        run(&mut scene, 1.0);
        assert!(scene.line_segments().is_empty());
        run(&mut scene, 2.0);
        assert!(scene.line_opacity() > 0.0);
        // Ursa Major holds 7 concepts; Cassiopeia the other 2
        assert_eq!(scene.assignments().len(), 2);
        assert!(!scene.line_segments().is_empty());
    }

    #[test]
    fn leaving_timeline_waits_for_lines() {
        let mut scene = GalaxyScene::new(concepts(), &small_config(), 7);
        scene.set_mode(GalaxyMode::Timeline);
        run(&mut scene, 4.0);
        let before = scene.concept_positions().1.to_vec();

        scene.set_mode(GalaxyMode::Galaxy);
        assert_eq!(scene.mode(), GalaxyMode::Galaxy);
        run(&mut scene, 0.2);
        // Still fading: stars have not moved
        assert_eq!(scene.concept_positions().1, before.as_slice());
        run(&mut scene, 0.5);
        run(&mut scene, 0.2);
        assert_ne!(scene.concept_positions().1, before.as_slice());
        assert_eq!(scene.line_opacity(), 0.0);
    }

    #[test]
    fn hover_reevaluated_as_positions_move() {
        let mut scene = GalaxyScene::new(concepts(), &small_config(), 7);
        let (ids, pos) = scene.concept_positions();
        let ids = ids.to_vec();
        let p = pos[0];
        let ray = Ray {
            origin: [p[0], p[1], p[2] + 20.0],
            dir: [0.0, 0.0, -1.0],
        };
        assert_eq!(scene.update_hover(Some(&ray)), HoverChange::Entered(ids[0].clone()));

        scene.set_mode(GalaxyMode::Timeline);
        run(&mut scene, 2.0);
        // Same pointer, new positions: the hover matches a fresh pick
        let expected = nearest_to_ray(&ray, scene.concept_positions().1, 0.5).map(|i| ids[i].clone());
        scene.update_hover(Some(&ray));
        assert_eq!(scene.hovered().map(str::to_string), expected);

        scene.update_hover(None);
        assert_eq!(scene.hovered(), None);
    }

    #[test]
    fn new_concepts_keep_rendered_positions() {
        let mut scene = GalaxyScene::new(concepts(), &small_config(), 7);
        let before = scene.concept_positions().1[3];
        let mut list = concepts();
        list.push(test_concept("late", "2025-06-01"));
        scene.set_concepts(list);
        let (ids, _) = scene.concept_positions();
        assert_eq!(ids.len(), 10);
        // c3 starts its (possibly zero-length) move from where it was drawn
        assert_eq!(scene.transition.previous()[3], before);
    }

    #[test]
    fn aspect_change_recomputes_once_per_bucket() {
        let mut scene = GalaxyScene::new(concepts(), &small_config(), 7);
        let n = scene.cache.computations();
        scene.set_aspect(1.7);
        assert_eq!(scene.cache.computations(), n);
        scene.set_aspect(0.8);
        assert_eq!(scene.cache.computations(), n + 1);
    }
}
