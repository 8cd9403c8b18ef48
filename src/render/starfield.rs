/// Procedural background star field.
///
/// A fixed-shape, randomized-instance spiral galaxy built from four
/// populations:
///
///   - Core       : tight Gaussian blob around the origin
///   - Outer core : wider Gaussian blob
///   - Spiral arms: Gaussian clouds bent by a logarithmic-spiral transform
///   - Haze       : dim, large, broadly spread points behind everything
///
/// Star colors and sizes follow stellar-class frequencies (M, K, G, F, A, B).
/// The field is generated once per scene and never persisted.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fast_math::{normalize3, Vec3};

// ── Palette ──

/// One stellar class: selection percentage, RGB color, relative size.
#[derive(Debug, Clone, Copy)]
pub struct StarClass {
    pub percentage: f32,
    pub color: [f32; 3],
    pub size: f32,
}

/// Six-bucket palette. Percentages follow main-sequence population counts.
pub const STAR_CLASSES: [StarClass; 6] = [
    StarClass { percentage: 76.45, color: [1.00, 0.80, 0.44], size: 0.7 }, // M
    StarClass { percentage: 12.10, color: [1.00, 0.82, 0.63], size: 0.9 }, // K
    StarClass { percentage: 7.60, color: [1.00, 0.96, 0.92], size: 1.1 },  // G
    StarClass { percentage: 3.00, color: [0.98, 0.97, 1.00], size: 1.3 },  // F
    StarClass { percentage: 0.60, color: [0.79, 0.84, 1.00], size: 1.6 },  // A
    StarClass { percentage: 0.13, color: [0.67, 0.75, 1.00], size: 2.0 },  // B
];

pub const HAZE_COLOR: [f32; 3] = [0.04, 0.10, 0.35];
pub const STAR_OPACITY: f32 = 0.9;
pub const HAZE_OPACITY: f32 = 0.2;

// ── Parameters ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarFieldParams {
    pub star_count: usize,
    pub arms: usize,
    /// How strongly radius bends the arm angle
    pub spiral: f32,
    /// Mean arm distance; also the radius unit of the spiral transform
    pub arm_mean_x: f32,
    pub arm_mean_y: f32,
    pub arm_spread_x: f32,
    pub arm_spread_y: f32,
    pub core_spread: f32,
    pub outer_core_spread: f32,
    /// Vertical Gaussian spread (disc thickness)
    pub thickness: f32,
    /// World units per generator unit
    pub scale: f32,
    /// Haze population as a fraction of `star_count`
    pub haze_ratio: f32,
    pub base_size: f32,
    pub haze_min_size: f32,
    pub haze_max_size: f32,
}

impl Default for StarFieldParams {
    fn default() -> Self {
        Self {
            star_count: 6000,
            arms: 4,
            spiral: 0.75,
            arm_mean_x: 200.0,
            arm_mean_y: 100.0,
            arm_spread_x: 100.0,
            arm_spread_y: 50.0,
            core_spread: 33.0,
            outer_core_spread: 100.0,
            thickness: 5.0,
            scale: 0.01,
            haze_ratio: 0.5,
            base_size: 1.6,
            haze_min_size: 4.0,
            haze_max_size: 9.0,
        }
    }
}

impl StarFieldParams {
    /// Angle offset of arm `arm` (evenly spaced around the disc).
    pub fn arm_offset(&self, arm: usize) -> f32 {
        let arms = self.arms.max(1) as f32;
        arm as f32 * std::f32::consts::TAU / arms
    }

    /// Logarithmic-spiral transform of a planar candidate `(x, y)` onto arm
    /// `offset`, returned in world space on the XZ plane with height `h`.
    pub fn spiral(&self, x: f32, y: f32, h: f32, offset: f32) -> Vec3 {
        let r = x.hypot(y);
        let theta = y.atan2(x) + offset + (r / self.arm_mean_x) * self.spiral;
        [
            r * theta.cos() * self.scale,
            h * self.scale,
            r * theta.sin() * self.scale,
        ]
    }
}

// ── StarDatum ──

#[derive(Debug, Clone, PartialEq)]
pub struct StarDatum {
    pub position: Vec3,
    pub color: [f32; 3],
    pub size: f32,
    pub is_haze: bool,
    /// Unit outward direction used when the field disperses
    pub direction: Vec3,
}

impl StarDatum {
    pub fn base_opacity(&self) -> f32 {
        if self.is_haze { HAZE_OPACITY } else { STAR_OPACITY }
    }
}

// ── Sampling ──

/// Gaussian sample via the Box-Muller transform.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f32, stdev: f32) -> f32 {
    // 1 - u keeps the log argument in (0, 1]
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen::<f32>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
    mean + z * stdev
}

/// Weighted draw over `STAR_CLASSES` by cumulative percentage.
pub fn pick_class<R: Rng + ?Sized>(rng: &mut R) -> &'static StarClass {
    let roll = rng.gen::<f32>() * 100.0;
    let mut cumulative = 0.0;
    for class in &STAR_CLASSES {
        cumulative += class.percentage;
        if roll < cumulative {
            return class;
        }
    }
    &STAR_CLASSES[STAR_CLASSES.len() - 1]
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ];
        let n = normalize3(v);
        if n != [0.0; 3] {
            return n;
        }
    }
}

fn star<R: Rng + ?Sized>(rng: &mut R, params: &StarFieldParams, position: Vec3) -> StarDatum {
    let class = pick_class(rng);
    StarDatum {
        position,
        color: class.color,
        size: class.size * params.base_size,
        is_haze: false,
        direction: random_direction(rng),
    }
}

/// Population sizes: (core, outer core, per-arm counts, haze).
pub fn partition(params: &StarFieldParams) -> (usize, usize, Vec<usize>, usize) {
    let quarter = params.star_count / 4;
    let arm_total = params.star_count - 2 * quarter;
    let arms = params.arms.max(1);
    let mut per_arm = vec![arm_total / arms; arms];
    if let Some(last) = per_arm.last_mut() {
        *last += arm_total % arms;
    }
    let haze = (params.star_count as f32 * params.haze_ratio.max(0.0)).round() as usize;
    (quarter, quarter, per_arm, haze)
}

/// Generate the full field.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &StarFieldParams) -> Vec<StarDatum> {
    let (core, outer, per_arm, haze) = partition(params);
    let mut stars = Vec::with_capacity(params.star_count + haze);
    let s = params.scale;

    for _ in 0..core {
        let p = [
            gaussian(rng, 0.0, params.core_spread) * s,
            gaussian(rng, 0.0, params.thickness) * s,
            gaussian(rng, 0.0, params.core_spread) * s,
        ];
        stars.push(star(rng, params, p));
    }

    for _ in 0..outer {
        let p = [
            gaussian(rng, 0.0, params.outer_core_spread) * s,
            gaussian(rng, 0.0, params.thickness) * s,
            gaussian(rng, 0.0, params.outer_core_spread) * s,
        ];
        stars.push(star(rng, params, p));
    }

    for (arm, &count) in per_arm.iter().enumerate() {
        let offset = params.arm_offset(arm);
        for _ in 0..count {
            let x = gaussian(rng, params.arm_mean_x, params.arm_spread_x);
            let y = gaussian(rng, params.arm_mean_y, params.arm_spread_y);
            let h = gaussian(rng, 0.0, params.thickness);
            let p = params.spiral(x, y, h, offset);
            stars.push(star(rng, params, p));
        }
    }

    // Haze: broader and flatter than the arms, dim blue, large soft points
    for i in 0..haze {
        let offset = params.arm_offset(i % params.arms.max(1));
        let x = gaussian(rng, params.arm_mean_x, params.arm_spread_x * 1.5);
        let y = gaussian(rng, params.arm_mean_y, params.arm_spread_y * 1.5);
        let h = gaussian(rng, 0.0, params.thickness * 2.0);
        stars.push(StarDatum {
            position: params.spiral(x, y, h, offset),
            color: HAZE_COLOR,
            size: rng.gen_range(params.haze_min_size..=params.haze_max_size.max(params.haze_min_size)),
            is_haze: true,
            direction: random_direction(rng),
        });
    }

    log::info!(
        "star field generated: {} stars + {} haze over {} arms",
        params.star_count,
        haze,
        per_arm.len()
    );
    stars
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn partition_covers_star_count() {
        let params = StarFieldParams { star_count: 1001, arms: 3, ..Default::default() };
        let (core, outer, arms, haze) = partition(&params);
        assert_eq!(core, 250);
        assert_eq!(outer, 250);
        assert_eq!(arms.len(), 3);
        assert_eq!(core + outer + arms.iter().sum::<usize>(), 1001);
        assert_eq!(haze, 501);
    }

    #[test]
    fn generate_counts_and_flags() {
        let params = StarFieldParams { star_count: 800, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(11);
        let stars = generate(&mut rng, &params);
        let haze = stars.iter().filter(|s| s.is_haze).count();
        assert_eq!(stars.len() - haze, 800);
        assert_eq!(haze, 400);
        for s in stars.iter().filter(|s| s.is_haze) {
            assert_eq!(s.color, HAZE_COLOR);
            assert!(s.size >= params.haze_min_size && s.size <= params.haze_max_size);
            assert_eq!(s.base_opacity(), HAZE_OPACITY);
        }
        for s in &stars {
            let len = crate::fast_math::length_squared3(s.direction);
            assert!((len - 1.0).abs() < 0.02);
            assert!(s.position.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let samples: Vec<f32> = (0..n).map(|_| gaussian(&mut rng, 2.0, 0.5)).collect();
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n as f32;
        assert!((mean - 2.0).abs() < 0.02, "mean {}", mean);
        assert!((var.sqrt() - 0.5).abs() < 0.02, "stdev {}", var.sqrt());
    }

    #[test]
    fn class_draw_follows_percentages() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 50_000;
        let m_class = (0..n)
            .filter(|_| pick_class(&mut rng).size == STAR_CLASSES[0].size)
            .count();
        let frac = m_class as f32 / n as f32;
        assert!((frac - 0.7645).abs() < 0.02, "M fraction {}", frac);
    }

    #[test]
    fn spiral_bends_with_radius() {
        let params = StarFieldParams::default();
        // Same base angle, larger radius → larger swept angle
        let near = params.spiral(100.0, 0.0, 0.0, 0.0);
        let far = params.spiral(300.0, 0.0, 0.0, 0.0);
        let a_near = near[2].atan2(near[0]);
        let a_far = far[2].atan2(far[0]);
        assert!(a_far > a_near);
        // Radius is preserved up to the global scale
        let r_far = far[0].hypot(far[2]);
        assert!((r_far - 300.0 * params.scale).abs() < 1e-4);
    }
}
