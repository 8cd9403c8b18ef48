//! Semantic cluster layout.
//!
//! Concepts with an embedding are projected to 3D with UMAP and rescaled to
//! the ±3 viewing box. Concepts without a usable embedding keep their stored
//! position hint. Fewer than two usable embeddings means there is nothing to
//! project, so every concept keeps its hint.

use std::collections::HashMap;

use crate::concept::Concept;
use crate::fast_math::Vec3;
use crate::layout::umap::{self, UmapParams};
use crate::layout::LayoutPositionMap;

/// Embeddings supplied alongside the concept list, keyed by concept id.
/// An entry here wins over the concept's own embedding.
pub type EmbeddingTable = HashMap<String, Vec<f32>>;

/// Half-width of the box the projected positions are rescaled into.
pub const CLUSTER_EXTENT: f32 = 3.0;

fn usable(v: &[f32]) -> bool {
    !v.is_empty() && v.iter().all(|x| x.is_finite())
}

/// Embedding for each concept (aux table first), after dropping empty or
/// non-finite vectors and vectors whose dimension disagrees with the
/// majority.
fn resolve<'a>(concepts: &'a [Concept], aux: &'a EmbeddingTable) -> Vec<Option<&'a [f32]>> {
    let candidates: Vec<Option<&[f32]>> = concepts
        .iter()
        .map(|c| {
            let v = aux
                .get(&c.id)
                .map(|v| v.as_slice())
                .or(c.embedding.as_deref())?;
            if usable(v) {
                Some(v)
            } else {
                log::warn!("concept {}: ignoring unusable embedding", c.id);
                None
            }
        })
        .collect();

    let mut dims: HashMap<usize, usize> = HashMap::new();
    for v in candidates.iter().flatten() {
        *dims.entry(v.len()).or_default() += 1;
    }
    // Ties go to the larger dimension so the choice is deterministic.
    let Some(dim) = dims
        .iter()
        .max_by_key(|&(len, count)| (*count, *len))
        .map(|(len, _)| *len)
    else {
        return candidates;
    };

    candidates
        .into_iter()
        .zip(concepts)
        .map(|(v, c)| match v {
            Some(v) if v.len() != dim => {
                log::warn!(
                    "concept {}: embedding has {} dims, expected {}",
                    c.id,
                    v.len(),
                    dim
                );
                None
            }
            other => other,
        })
        .collect()
}

/// Min-max rescale each axis to [-extent, extent]. A flat axis maps to 0.
fn rescale(points: &mut [Vec3], extent: f32) {
    for axis in 0..3 {
        let (lo, hi) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
        let range = hi - lo;
        for p in points.iter_mut() {
            p[axis] = if range > f32::EPSILON {
                ((p[axis] - lo) / range * 2.0 - 1.0) * extent
            } else {
                0.0
            };
        }
    }
}

pub fn cluster_layout(concepts: &[Concept], aux: &EmbeddingTable) -> LayoutPositionMap {
    cluster_layout_with(concepts, aux, &UmapParams::default())
}

pub fn cluster_layout_with(
    concepts: &[Concept],
    aux: &EmbeddingTable,
    params: &UmapParams,
) -> LayoutPositionMap {
    let mut map = LayoutPositionMap::with_capacity(concepts.len());
    for c in concepts {
        map.insert(c.id.clone(), c.position_hint());
    }

    let resolved = resolve(concepts, aux);
    let (indices, rows): (Vec<usize>, Vec<&[f32]>) = resolved
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    if rows.len() < 2 {
        log::debug!("cluster layout: {} embeddings, using position hints", rows.len());
        return map;
    }

    let mut projected = umap::project(&rows, params);
    rescale(&mut projected, CLUSTER_EXTENT);
    for (i, p) in indices.into_iter().zip(projected) {
        map.insert(concepts[i].id.clone(), p);
    }
    log::debug!(
        "cluster layout: projected {} of {} concepts",
        rows.len(),
        concepts.len()
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::test_concept;

    fn with_hint(id: &str, hint: Vec3) -> Concept {
        let mut c = test_concept(id, "2024-01-01");
        c.x = hint[0];
        c.y = hint[1];
        c.z = hint[2];
        c
    }

    #[test]
    fn hints_when_nothing_to_project() {
        let mut list = vec![with_hint("a", [1.0, 2.0, 3.0]), with_hint("b", [-1.0, 0.5, 0.0])];
        let map = cluster_layout(&list, &EmbeddingTable::new());
        assert_eq!(map.get("a"), Some([1.0, 2.0, 3.0]));
        assert_eq!(map.get("b"), Some([-1.0, 0.5, 0.0]));

        // One embedding is still not enough
        list[0].embedding = Some(vec![1.0, 0.0]);
        let map = cluster_layout(&list, &EmbeddingTable::new());
        assert_eq!(map.get("a"), Some([1.0, 2.0, 3.0]));
        assert_eq!(map.get("b"), Some([-1.0, 0.5, 0.0]));
    }

    #[test]
    fn projected_points_stay_in_box_and_hints_survive() {
        let mut list: Vec<Concept> = (0..8)
            .map(|i| {
                let mut c = with_hint(&format!("c{}", i), [0.0; 3]);
                c.embedding = Some(vec![i as f32, (i % 3) as f32, 1.0]);
                c
            })
            .collect();
        list.push(with_hint("plain", [7.0, 8.0, 9.0]));
        let params = UmapParams { n_epochs: 120, ..Default::default() };
        let map = cluster_layout_with(&list, &EmbeddingTable::new(), &params);

        assert!(map.covers(&list));
        assert_eq!(map.get("plain"), Some([7.0, 8.0, 9.0]));
        for c in &list[..8] {
            let p = map.get_or_origin(&c.id);
            assert!(p.iter().all(|v| v.abs() <= CLUSTER_EXTENT + 1e-4), "{:?}", p);
        }
    }

    #[test]
    fn aux_table_overrides_and_bad_vectors_are_dropped() {
        let mut list = vec![
            with_hint("a", [0.0; 3]),
            with_hint("b", [0.0; 3]),
            with_hint("nan", [4.0, 4.0, 4.0]),
            with_hint("short", [5.0, 5.0, 5.0]),
        ];
        list[0].embedding = Some(vec![]);
        list[2].embedding = Some(vec![f32::NAN, 1.0, 0.0]);
        list[3].embedding = Some(vec![1.0]);

        let mut aux = EmbeddingTable::new();
        aux.insert("a".into(), vec![1.0, 0.0, 0.0]);
        aux.insert("b".into(), vec![0.0, 1.0, 0.0]);

        let resolved = resolve(&list, &aux);
        assert_eq!(resolved[0], Some(&[1.0, 0.0, 0.0][..]));
        assert!(resolved[2].is_none());
        assert!(resolved[3].is_none());

        let map = cluster_layout(&list, &aux);
        assert_eq!(map.get("nan"), Some([4.0, 4.0, 4.0]));
        assert_eq!(map.get("short"), Some([5.0, 5.0, 5.0]));
    }

    #[test]
    fn rescale_handles_flat_axis() {
        let mut pts = vec![[0.0, 5.0, 1.0], [10.0, 5.0, 3.0]];
        rescale(&mut pts, 3.0);
        assert_eq!(pts, vec![[-3.0, 0.0, -3.0], [3.0, 0.0, 3.0]]);
    }

    #[test]
    fn separated_groups_end_up_apart() {
        let mut list = Vec::new();
        for g in 0..2 {
            for i in 0..6 {
                let mut c = with_hint(&format!("g{}-{}", g, i), [0.0; 3]);
                let base = g as f32 * 20.0;
                c.embedding = Some(vec![base + i as f32 * 0.05, base, base + (i % 2) as f32 * 0.05]);
                list.push(c);
            }
        }
        let map = cluster_layout(&list, &EmbeddingTable::new());
        let centroid = |g: usize| -> Vec3 {
            let mut s = [0.0; 3];
            for i in 0..6 {
                let p = map.get_or_origin(&format!("g{}-{}", g, i));
                for k in 0..3 {
                    s[k] += p[k] / 6.0;
                }
            }
            s
        };
        let (c0, c1) = (centroid(0), centroid(1));
        let between = crate::fast_math::distance_squared3(c0, c1).sqrt();
        let spread0 = (0..6)
            .map(|i| crate::fast_math::distance_squared3(map.get_or_origin(&format!("g0-{}", i)), c0).sqrt())
            .fold(0.0_f32, f32::max);
        assert!(between > spread0, "between {} spread {}", between, spread0);
    }
}
