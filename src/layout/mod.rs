//! Layout engines: three complete position maps for the concept list.
//!
//! - `galaxy`  : concepts scattered along the star field's spiral arms
//! - `cluster` : embeddings projected to 3D (UMAP), grouped by meaning
//! - `timeline`: concepts laid into constellation patterns by date
//!
//! Layouts are expensive relative to a frame, so `LayoutCache` recomputes
//! them only when the concept snapshot, the embeddings or the viewport
//! aspect actually change.

pub mod cluster;
pub mod galaxy;
pub mod timeline;
pub mod umap;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::concept::Concept;
use crate::constellation::ConstellationPattern;
use crate::fast_math::Vec3;
use crate::render::starfield::StarFieldParams;
use crate::scroll::GalaxyMode;

pub use cluster::EmbeddingTable;
pub use timeline::{PatternAssignment, TimelineLayout};

// ── LayoutPositionMap ──

/// Concept id → world position for one layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPositionMap {
    positions: HashMap<String, Vec3>,
}

impl LayoutPositionMap {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(n),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, position: Vec3) {
        self.positions.insert(id.into(), position);
    }

    pub fn get(&self, id: &str) -> Option<Vec3> {
        self.positions.get(id).copied()
    }

    /// Entry for `id`, or the origin. Layout engines guarantee an entry for
    /// every concept; the origin only covers ids the map has never seen.
    pub fn get_or_origin(&self, id: &str) -> Vec3 {
        self.get(id).unwrap_or([0.0; 3])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when every concept has an entry.
    pub fn covers(&self, concepts: &[Concept]) -> bool {
        concepts.iter().all(|c| self.positions.contains_key(&c.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ── Layouts ──

/// The three layouts computed from one concept snapshot.
#[derive(Debug, Clone)]
pub struct Layouts {
    pub galaxy: LayoutPositionMap,
    pub clusters: LayoutPositionMap,
    pub timeline: TimelineLayout,
}

impl Layouts {
    pub fn compute(
        concepts: &[Concept],
        aux: &EmbeddingTable,
        starfield: &StarFieldParams,
        patterns: &[ConstellationPattern],
        aspect: f32,
    ) -> Self {
        Self {
            galaxy: galaxy::galaxy_layout(concepts, starfield),
            clusters: cluster::cluster_layout(concepts, aux),
            timeline: timeline::timeline_layout(concepts, patterns, timeline_path_scale(aspect)),
        }
    }

    pub fn map(&self, mode: GalaxyMode) -> &LayoutPositionMap {
        match mode {
            GalaxyMode::Galaxy => &self.galaxy,
            GalaxyMode::Clusters => &self.clusters,
            GalaxyMode::Timeline => &self.timeline.positions,
        }
    }
}

/// Horizontal squeeze of the timeline path for narrow windows, quantized so
/// small resizes keep the cached layout.
pub fn timeline_path_scale(aspect: f32) -> f32 {
    let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.6 };
    let scale = (aspect / 1.6).clamp(0.55, 1.0);
    (scale * 20.0).round() / 20.0
}

// ── LayoutCache ──

/// Memoizes `Layouts` on a fingerprint of everything they depend on.
#[derive(Debug, Default)]
pub struct LayoutCache {
    /// Layouts with the fingerprint they were computed for
    cached: Option<(u64, Layouts)>,
    computations: usize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current layouts, recomputed only if the inputs changed.
    pub fn get_or_compute(
        &mut self,
        concepts: &[Concept],
        aux: &EmbeddingTable,
        starfield: &StarFieldParams,
        patterns: &[ConstellationPattern],
        aspect: f32,
    ) -> &Layouts {
        let key = fingerprint(concepts, aux, starfield, patterns, aspect);
        if !matches!(&self.cached, Some((cached, _)) if *cached == key) {
            log::info!(
                "recomputing layouts for {} concepts (aspect {:.2})",
                concepts.len(),
                aspect
            );
            self.computations += 1;
            self.cached = None;
        }
        let (_, layouts) = self.cached.get_or_insert_with(|| {
            (key, Layouts::compute(concepts, aux, starfield, patterns, aspect))
        });
        layouts
    }

    pub fn layouts(&self) -> Option<&Layouts> {
        self.cached.as_ref().map(|(_, layouts)| layouts)
    }

    /// How many times the layouts were actually computed.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

fn fingerprint(
    concepts: &[Concept],
    aux: &EmbeddingTable,
    starfield: &StarFieldParams,
    patterns: &[ConstellationPattern],
    aspect: f32,
) -> u64 {
    let mut h = DefaultHasher::new();
    concepts.len().hash(&mut h);
    for c in concepts {
        c.id.hash(&mut h);
        c.date_learned.hash(&mut h);
        for v in c.position_hint() {
            v.to_bits().hash(&mut h);
        }
        match &c.embedding {
            Some(e) => {
                e.len().hash(&mut h);
                e.iter().for_each(|v| v.to_bits().hash(&mut h));
            }
            None => usize::MAX.hash(&mut h),
        }
    }
    let mut aux_ids: Vec<&String> = aux.keys().collect();
    aux_ids.sort();
    for id in aux_ids {
        id.hash(&mut h);
        aux[id].iter().for_each(|v| v.to_bits().hash(&mut h));
    }
    starfield.arms.hash(&mut h);
    starfield.spiral.to_bits().hash(&mut h);
    starfield.scale.to_bits().hash(&mut h);
    patterns.len().hash(&mut h);
    for p in patterns {
        p.stars.len().hash(&mut h);
    }
    timeline_path_scale(aspect).to_bits().hash(&mut h);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::test_concept;
    use crate::constellation;

    fn concepts() -> Vec<Concept> {
        let mut list = vec![
            test_concept("a", "2024-01-01"),
            test_concept("b", "2023-05-01"),
            test_concept("c", "2024-03-01"),
        ];
        list[0].embedding = Some(vec![1.0, 0.0]);
        list[1].embedding = Some(vec![0.0, 1.0]);
        list
    }

    #[test]
    fn every_layout_covers_every_concept() {
        let list = concepts();
        let layouts = Layouts::compute(
            &list,
            &EmbeddingTable::new(),
            &StarFieldParams::default(),
            constellation::catalog(),
            1.6,
        );
        for mode in GalaxyMode::ALL {
            assert!(layouts.map(mode).covers(&list), "{:?} incomplete", mode);
            assert_eq!(layouts.map(mode).len(), list.len());
        }
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let mut list = concepts();
        let aux = EmbeddingTable::new();
        let params = StarFieldParams::default();
        let patterns = constellation::catalog();
        let mut cache = LayoutCache::new();

        cache.get_or_compute(&list, &aux, &params, patterns, 1.6);
        cache.get_or_compute(&list, &aux, &params, patterns, 1.6);
        cache.get_or_compute(&list, &aux, &params, patterns, 1.61);
        assert_eq!(cache.computations(), 1);

        list.push(test_concept("d", "2025-01-01"));
        let layouts = cache.get_or_compute(&list, &aux, &params, patterns, 1.6);
        assert!(layouts.galaxy.covers(&list));
        assert_eq!(cache.computations(), 2);

        list[0].embedding = Some(vec![0.5, 0.5]);
        cache.get_or_compute(&list, &aux, &params, patterns, 1.6);
        assert_eq!(cache.computations(), 3);

        cache.get_or_compute(&list, &aux, &params, patterns, 0.5);
        assert_eq!(cache.computations(), 4);
    }

    #[test]
    fn cached_layouts_match_last_computation() {
        let mut list = concepts();
        let aux = EmbeddingTable::new();
        let params = StarFieldParams::default();
        let patterns = constellation::catalog();
        let mut cache = LayoutCache::new();
        assert!(cache.layouts().is_none());

        cache.get_or_compute(&list, &aux, &params, patterns, 1.6);
        list.push(test_concept("late", "2026-01-01"));
        let galaxy = cache.get_or_compute(&list, &aux, &params, patterns, 1.6).galaxy.clone();
        let held = cache.layouts().map(|l| l.galaxy.clone());
        assert_eq!(held.as_ref().map(|g| g.len()), Some(list.len()));
        assert_eq!(held.and_then(|g| g.get("late")), galaxy.get("late"));
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn path_scale_quantized_and_bounded() {
        assert_eq!(timeline_path_scale(1.6), 1.0);
        assert_eq!(timeline_path_scale(3.0), 1.0);
        assert_eq!(timeline_path_scale(0.3), 0.55);
        assert_eq!(timeline_path_scale(f32::NAN), 1.0);
        assert_eq!(timeline_path_scale(1.28), timeline_path_scale(1.285));
    }
}
