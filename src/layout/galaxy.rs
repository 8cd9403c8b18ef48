//! Galaxy layout: each concept sits in one of the star field's spiral arms.
//!
//! Positions are a pure function of (index, id): the arm comes from the
//! index, the Gaussian offsets from an RNG seeded with both, so the same
//! ordering always produces the same galaxy.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::concept::Concept;
use crate::fast_math::{fnv1a, Vec3};
use crate::layout::LayoutPositionMap;
use crate::render::starfield::{gaussian, StarFieldParams};

/// Concepts cluster tighter around the arm centre line than background stars.
const ARM_TIGHTNESS: f32 = 0.5;

pub fn galaxy_position(index: usize, id: &str, params: &StarFieldParams) -> Vec3 {
    let seed = fnv1a(id) ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = StdRng::seed_from_u64(seed);
    let arm = index % params.arms.max(1);
    let x = gaussian(&mut rng, params.arm_mean_x, params.arm_spread_x * ARM_TIGHTNESS);
    let y = gaussian(&mut rng, params.arm_mean_y, params.arm_spread_y * ARM_TIGHTNESS);
    let h = gaussian(&mut rng, 0.0, params.thickness);
    params.spiral(x, y, h, params.arm_offset(arm))
}

pub fn galaxy_layout(concepts: &[Concept], params: &StarFieldParams) -> LayoutPositionMap {
    let mut map = LayoutPositionMap::with_capacity(concepts.len());
    for (i, c) in concepts.iter().enumerate() {
        map.insert(c.id.clone(), galaxy_position(i, &c.id, params));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::test_concept;

    #[test]
    fn stable_across_calls() {
        let params = StarFieldParams::default();
        let list = vec![test_concept("a", "2024-01-01"), test_concept("b", "2024-01-02")];
        assert_eq!(galaxy_layout(&list, &params), galaxy_layout(&list, &params));
    }

    #[test]
    fn complete_and_finite() {
        let params = StarFieldParams::default();
        let list: Vec<_> = (0..40)
            .map(|i| test_concept(&format!("c{}", i), "2024-01-01"))
            .collect();
        let map = galaxy_layout(&list, &params);
        assert!(map.covers(&list));
        for (_, p) in map.iter() {
            assert!(p.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn depends_on_index_and_id() {
        let params = StarFieldParams::default();
        let a0 = galaxy_position(0, "a", &params);
        assert_eq!(a0, galaxy_position(0, "a", &params));
        assert_ne!(a0, galaxy_position(1, "a", &params));
        assert_ne!(a0, galaxy_position(0, "b", &params));
    }

    #[test]
    fn concepts_stay_within_the_disc() {
        let params = StarFieldParams::default();
        // 200 ± a few spreads, times the global scale
        let limit = (params.arm_mean_x + params.arm_mean_y + 6.0 * params.arm_spread_x) * params.scale;
        for i in 0..100 {
            let p = galaxy_position(i, &format!("id{}", i), &params);
            assert!(p[0].hypot(p[2]) < limit);
        }
    }
}
