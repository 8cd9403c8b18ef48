//! Fast Math: vector, easing and hashing helpers shared by the galaxy.
//!
//! Everything in the visualization works on plain `[f32; 3]` arrays so that
//! position buffers can be handed to the painter without conversion.
//!
//! ## FMA (Fused Multiply-Add)
//! `a * b + c` in one instruction (and one rounding step). Interpolation and
//! dot products go through `mul_add`.
//!
//! ## Sqrt Elimination
//! Picking compares squared distances against a squared threshold; the
//! square root is only taken once for the winner.
//!
//! ## Fast Inverse Square Root
//! Used to normalize the random dispersion directions of the star field,
//! where ~0.2% error is invisible.

pub type Vec3 = [f32; 3];

/// Fast inverse square root (1/√x): the Quake III bit trick plus one
/// Newton-Raphson step.
#[inline(always)]
pub fn fast_inv_sqrt(x: f32) -> f32 {
    let half_x = 0.5 * x;
    let i = 0x5f3759df - (x.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - half_x * y * y)
}

/// Fused Multiply-Add: a * b + c
#[inline(always)]
pub fn fma(a: f32, b: f32, c: f32) -> f32 {
    a.mul_add(b, c)
}

/// Linear interpolation using FMA for precision.
/// lerp(a, b, t) = a + t * (b - a) = fma(t, b-a, a)
#[inline(always)]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    fma(t, b - a, a)
}

/// Component-wise lerp of two points.
#[inline(always)]
pub fn lerp3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

#[inline(always)]
pub fn add3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline(always)]
pub fn sub3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline(always)]
pub fn scale3(a: Vec3, s: f32) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Dot product as an FMA chain.
#[inline(always)]
pub fn dot3(a: Vec3, b: Vec3) -> f32 {
    fma(a[0], b[0], fma(a[1], b[1], a[2] * b[2]))
}

#[inline(always)]
pub fn cross3(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Squared length (no sqrt).
#[inline(always)]
pub fn length_squared3(a: Vec3) -> f32 {
    dot3(a, a)
}

/// Squared distance between two points (no sqrt needed for comparisons).
#[inline(always)]
pub fn distance_squared3(a: Vec3, b: Vec3) -> f32 {
    length_squared3(sub3(a, b))
}

/// Normalize a direction with the fast inverse square root.
/// Zero-length input stays zero.
#[inline]
pub fn normalize3(a: Vec3) -> Vec3 {
    let len_sq = length_squared3(a);
    if len_sq <= f32::EPSILON {
        return [0.0; 3];
    }
    scale3(a, fast_inv_sqrt(len_sq))
}

/// Symmetric cubic ease-in-out on [0, 1].
///
/// `t < 0.5 → 4t³`, otherwise `1 − (−2t + 2)³ / 2`. Input is clamped, so
/// ease(0) = 0 and ease(1) = 1 exactly.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * 0.5
    }
}

/// FNV-1a hash of a string. Seeds per-concept randomness so the same id
/// always lands in the same place.
pub fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Cheap index hash in [0, 1] for decorative jitter.
#[inline]
pub fn unit_hash(seed: usize) -> f32 {
    let x = seed.wrapping_mul(2654435761) ^ seed.wrapping_mul(340573321);
    ((x & 0xFFFF) as f32) / 65535.0
}
