//! Constellation patterns for the timeline view.
//!
//! Built once from the raw RA/Dec catalog: each pattern is flattened onto a
//! tangent plane around its own centre, fitted into a small box and offset
//! along a winding path so consecutive patterns read left to right.

mod catalog;

use std::f32::consts::TAU;
use std::sync::OnceLock;

use crate::fast_math::{unit_hash, Vec3};
use catalog::{RawConstellation, RAW_CATALOG};

/// Box every normalized pattern fits into (width, height).
pub const PATTERN_BOX: (f32, f32) = (1.6, 1.3);
/// Horizontal extent of the winding path.
const PATH_WIDTH: f32 = 14.0;
const PATH_AMPLITUDE_Y: f32 = 1.6;
const PATH_AMPLITUDE_Z: f32 = 2.0;
const DEPTH_JITTER: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationPattern {
    pub name: &'static str,
    /// Star positions relative to the pattern centre
    pub stars: Vec<Vec3>,
    /// Index pairs into `stars`
    pub connections: Vec<[usize; 2]>,
    /// Pattern centre in world space
    pub offset: Vec3,
}

/// The process-wide pattern list, in timeline order.
pub fn catalog() -> &'static [ConstellationPattern] {
    static PATTERNS: OnceLock<Vec<ConstellationPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let patterns = build(RAW_CATALOG);
        log::debug!(
            "built {} constellation patterns ({} stars)",
            patterns.len(),
            total_capacity(&patterns)
        );
        patterns
    })
}

/// Number of concepts the patterns can hold before overflow.
pub fn total_capacity(patterns: &[ConstellationPattern]) -> usize {
    patterns.iter().map(|p| p.stars.len()).sum()
}

/// Point `i` of `n` on the winding path.
pub fn path_offset(i: usize, n: usize) -> Vec3 {
    let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
    [
        (t - 0.5) * PATH_WIDTH,
        (t * TAU * 1.5).sin() * PATH_AMPLITUDE_Y,
        -(t * TAU).cos() * PATH_AMPLITUDE_Z,
    ]
}

fn build(raw: &[RawConstellation]) -> Vec<ConstellationPattern> {
    let mut star_counter = 0usize;
    raw.iter()
        .enumerate()
        .map(|(i, r)| {
            let stars = normalize(r.stars, &mut star_counter);
            ConstellationPattern {
                name: r.name,
                stars,
                connections: r
                    .connections
                    .iter()
                    .copied()
                    .filter(|[a, b]| *a < r.stars.len() && *b < r.stars.len())
                    .collect(),
                offset: path_offset(i, raw.len()),
            }
        })
        .collect()
}

/// Project (ra, dec) degrees onto a plane and fit into `PATTERN_BOX`,
/// centred on the bounding-box midpoint. East is to the left as on a sky map.
fn normalize(stars: &[(f32, f32)], star_counter: &mut usize) -> Vec<Vec3> {
    if stars.is_empty() {
        return Vec::new();
    }
    // Unwrap right ascension across 0°/360°
    let (ra_min, ra_max) = stars
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(ra, _)| (lo.min(ra), hi.max(ra)));
    let wraps = ra_max - ra_min > 180.0;
    let ra_of = |ra: f32| if wraps && ra < 180.0 { ra + 360.0 } else { ra };

    let n = stars.len() as f32;
    let ra_c = stars.iter().map(|&(ra, _)| ra_of(ra)).sum::<f32>() / n;
    let dec_c = stars.iter().map(|&(_, dec)| dec).sum::<f32>() / n;
    let cos_dec = dec_c.to_radians().cos();

    let flat: Vec<(f32, f32)> = stars
        .iter()
        .map(|&(ra, dec)| (-(ra_of(ra) - ra_c) * cos_dec, dec - dec_c))
        .collect();

    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) =
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY);
    for &(x, y) in &flat {
        x_lo = x_lo.min(x);
        x_hi = x_hi.max(x);
        y_lo = y_lo.min(y);
        y_hi = y_hi.max(y);
    }
    let (w, h) = (x_hi - x_lo, y_hi - y_lo);
    let sx = if w > f32::EPSILON { PATTERN_BOX.0 / w } else { f32::INFINITY };
    let sy = if h > f32::EPSILON { PATTERN_BOX.1 / h } else { f32::INFINITY };
    let scale = match sx.min(sy) {
        s if s.is_finite() => s,
        _ => 1.0,
    };
    let (mx, my) = ((x_lo + x_hi) * 0.5, (y_lo + y_hi) * 0.5);

    flat.into_iter()
        .map(|(x, y)| {
            let z = (unit_hash(*star_counter) - 0.5) * DEPTH_JITTER;
            *star_counter += 1;
            [(x - mx) * scale, (y - my) * scale, z]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape() {
        let patterns = catalog();
        assert_eq!(patterns.len(), 10);
        assert_eq!(total_capacity(patterns), 57);
        assert_eq!(patterns[0].name, "Ursa Major");
        assert!(std::ptr::eq(catalog(), patterns));
    }

    #[test]
    fn stars_fit_the_box() {
        for p in catalog() {
            for s in &p.stars {
                assert!(s[0].abs() <= PATTERN_BOX.0 / 2.0 + 1e-4, "{} {:?}", p.name, s);
                assert!(s[1].abs() <= PATTERN_BOX.1 / 2.0 + 1e-4, "{} {:?}", p.name, s);
                assert!(s[2].abs() <= DEPTH_JITTER / 2.0 + 1e-4);
            }
            for [a, b] in &p.connections {
                assert!(*a < p.stars.len() && *b < p.stars.len());
            }
        }
    }

    #[test]
    fn path_runs_left_to_right() {
        let patterns = catalog();
        assert!((patterns[0].offset[0] + PATH_WIDTH / 2.0).abs() < 1e-4);
        assert!((patterns[patterns.len() - 1].offset[0] - PATH_WIDTH / 2.0).abs() < 1e-4);
        for w in patterns.windows(2) {
            assert!(w[0].offset[0] < w[1].offset[0]);
        }
    }

    #[test]
    fn wrapping_right_ascension_stays_compact() {
        let mut counter = 0;
        let stars = normalize(&[(359.0, 10.0), (1.0, 10.0), (0.0, 11.0)], &mut counter);
        // Without unwrapping the first two stars would sit 358° apart
        let dx = (stars[0][0] - stars[1][0]).abs();
        assert!(dx <= PATTERN_BOX.0 + 1e-4);
        assert_eq!(counter, 3);
        // East (larger RA) is left
        assert!(stars[1][0] < stars[0][0]);
    }
}
