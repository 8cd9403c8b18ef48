//! UMAP projection of embedding vectors into three dimensions.
//!
//! Sized for a personal knowledge base (tens to a few hundred points), so the
//! neighbour search is exact. Stages:
//!
//!   1. k-nearest neighbours (rayon over rows)
//!   2. smooth-kNN calibration: ρᵢ, σᵢ so that Σ exp(−(d−ρ)/σ) = log₂ k
//!   3. fuzzy union of the directed graph: w = a + b − a·b
//!   4. curve parameters (a, b) fitted to (spread, min_dist)
//!   5. stochastic gradient layout with negative sampling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::fast_math::Vec3;

const SMOOTH_K_TOLERANCE: f32 = 1e-5;
const MIN_K_DIST_SCALE: f32 = 1e-3;
const GRAD_CLIP: f32 = 4.0;
const INIT_RANGE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct UmapParams {
    pub n_neighbors: usize,
    pub min_dist: f32,
    pub spread: f32,
    pub n_epochs: usize,
    pub negative_sample_rate: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl Default for UmapParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            min_dist: 0.1,
            spread: 1.0,
            n_epochs: 500,
            negative_sample_rate: 5,
            learning_rate: 1.0,
            seed: 42,
        }
    }
}

/// Weighted undirected edge, stored in both directions.
#[derive(Debug, Clone, Copy)]
struct Edge {
    head: usize,
    tail: usize,
    weight: f32,
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Exact k nearest neighbours of every row (self excluded), nearest first.
fn knn(data: &[&[f32]], k: usize) -> Vec<Vec<(usize, f32)>> {
    (0..data.len())
        .into_par_iter()
        .map(|i| {
            let mut row: Vec<(usize, f32)> = (0..data.len())
                .filter(|&j| j != i)
                .map(|j| (j, euclidean(data[i], data[j])))
                .collect();
            row.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            row.truncate(k);
            row
        })
        .collect()
}

/// Calibrate σ for one neighbourhood; returns the membership weights.
fn smooth_knn_weights(neighbors: &[(usize, f32)], k: usize) -> Vec<f32> {
    let target = (k as f32).log2().max(f32::MIN_POSITIVE);
    let rho = neighbors
        .iter()
        .map(|&(_, d)| d)
        .find(|&d| d > 0.0)
        .unwrap_or(0.0);

    let membership_sum = |sigma: f32| -> f32 {
        neighbors
            .iter()
            .map(|&(_, d)| (-(d - rho).max(0.0) / sigma).exp())
            .sum()
    };

    let mut lo = 0.0_f32;
    let mut hi = f32::INFINITY;
    let mut mid = 1.0_f32;
    for _ in 0..64 {
        let psum = membership_sum(mid);
        if (psum - target).abs() < SMOOTH_K_TOLERANCE {
            break;
        }
        if psum > target {
            hi = mid;
            mid = (lo + hi) * 0.5;
        } else {
            lo = mid;
            if hi.is_infinite() {
                mid *= 2.0;
            } else {
                mid = (lo + hi) * 0.5;
            }
        }
    }

    let mean_dist = neighbors.iter().map(|&(_, d)| d).sum::<f32>() / neighbors.len().max(1) as f32;
    let sigma = mid.max(MIN_K_DIST_SCALE * mean_dist).max(f32::MIN_POSITIVE);

    neighbors
        .iter()
        .map(|&(_, d)| {
            if d <= rho {
                1.0
            } else {
                (-(d - rho) / sigma).exp()
            }
        })
        .collect()
}

/// Symmetric fuzzy graph as an edge list (each pair in both directions).
fn fuzzy_graph(neighbors: &[Vec<(usize, f32)>], k: usize) -> Vec<Edge> {
    let n = neighbors.len();
    let mut dense = vec![0.0_f32; n * n];
    for (i, row) in neighbors.iter().enumerate() {
        let weights = smooth_knn_weights(row, k);
        for (&(j, _), w) in row.iter().zip(weights) {
            dense[i * n + j] = w;
        }
    }
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = dense[i * n + j];
            let b = dense[j * n + i];
            let w = a + b - a * b;
            if w > 0.0 {
                edges.push(Edge { head: i, tail: j, weight: w });
                edges.push(Edge { head: j, tail: i, weight: w });
            }
        }
    }
    edges
}

/// Fit `1 / (1 + a·x^(2b))` to the target curve defined by `spread` and
/// `min_dist` with damped Gauss-Newton (Levenberg-Marquardt).
pub fn fit_ab(spread: f32, min_dist: f32) -> (f32, f32) {
    let spread = spread.max(1e-3) as f64;
    let min_dist = min_dist.max(0.0) as f64;
    let xs: Vec<f64> = (0..300).map(|i| spread * 3.0 * i as f64 / 299.0).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / spread).exp() })
        .collect();

    let sse = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(&ys)
            .map(|(&x, &y)| {
                let r = 1.0 / (1.0 + a * x.powf(2.0 * b)) - y;
                r * r
            })
            .sum()
    };

    let (mut a, mut b) = (1.0_f64, 1.0_f64);
    let mut lambda = 1e-3_f64;
    let mut err = sse(a, b);
    for _ in 0..200 {
        // Normal equations Jᵀ J δ = −Jᵀ r
        let (mut jaa, mut jab, mut jbb, mut ga, mut gb) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for (&x, &y) in xs.iter().zip(&ys) {
            if x <= 0.0 {
                continue;
            }
            let p = x.powf(2.0 * b);
            let denom = 1.0 + a * p;
            let f = 1.0 / denom;
            let r = f - y;
            let da = -p / (denom * denom);
            let db = -a * p * 2.0 * x.ln() / (denom * denom);
            jaa += da * da;
            jab += da * db;
            jbb += db * db;
            ga += da * r;
            gb += db * r;
        }
        let m00 = jaa * (1.0 + lambda);
        let m11 = jbb * (1.0 + lambda);
        let det = m00 * m11 - jab * jab;
        if det.abs() < 1e-18 {
            break;
        }
        let step_a = (-ga * m11 + gb * jab) / det;
        let step_b = (-gb * m00 + ga * jab) / det;
        let (na, nb) = ((a + step_a).max(1e-4), (b + step_b).max(1e-4));
        let new_err = sse(na, nb);
        if new_err < err {
            a = na;
            b = nb;
            lambda = (lambda / 3.0).max(1e-12);
            if err - new_err < 1e-14 {
                err = new_err;
                break;
            }
            err = new_err;
        } else {
            lambda *= 3.0;
            if lambda > 1e12 {
                break;
            }
        }
    }
    (a as f32, b as f32)
}

/// Project `data` (all rows of equal dimension) to 3D.
pub fn project(data: &[&[f32]], params: &UmapParams) -> Vec<Vec3> {
    let n = data.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![[0.0; 3]],
        _ => {}
    }
    let k = params.n_neighbors.min(n - 1).max(1);
    let graph = fuzzy_graph(&knn(data, k), k);
    let (a, b) = fit_ab(params.spread, params.min_dist);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut embedding: Vec<Vec3> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-INIT_RANGE..INIT_RANGE),
                rng.gen_range(-INIT_RANGE..INIT_RANGE),
                rng.gen_range(-INIT_RANGE..INIT_RANGE),
            ]
        })
        .collect();

    if graph.is_empty() {
        return embedding;
    }

    optimize(&mut embedding, &graph, a, b, params, &mut rng);
    embedding
}

fn optimize(embedding: &mut [Vec3], graph: &[Edge], a: f32, b: f32, params: &UmapParams, rng: &mut StdRng) {
    let n = embedding.len();
    let n_epochs = params.n_epochs.max(1);
    let neg_rate = params.negative_sample_rate as f32;

    let max_w = graph.iter().map(|e| e.weight).fold(0.0_f32, f32::max);
    let epochs_per_sample: Vec<f32> = graph
        .iter()
        .map(|e| if e.weight > 0.0 { max_w / e.weight } else { f32::INFINITY })
        .collect();
    let epochs_per_negative: Vec<f32> = epochs_per_sample
        .iter()
        .map(|&eps| if neg_rate > 0.0 { eps / neg_rate } else { f32::INFINITY })
        .collect();
    let mut next_sample = epochs_per_sample.clone();
    let mut next_negative = epochs_per_negative.clone();

    let clip = |v: f32| v.clamp(-GRAD_CLIP, GRAD_CLIP);

    for epoch in 0..n_epochs {
        let epoch_f = epoch as f32;
        let alpha = params.learning_rate * (1.0 - epoch_f / n_epochs as f32);

        for (e, edge) in graph.iter().enumerate() {
            if next_sample[e] > epoch_f {
                continue;
            }
            let (i, j) = (edge.head, edge.tail);

            // Attraction
            let current = embedding[i];
            let other = embedding[j];
            let d2: f32 = (0..3).map(|d| (current[d] - other[d]).powi(2)).sum();
            let coef = if d2 > 0.0 {
                -2.0 * a * b * d2.powf(b - 1.0) / (a * d2.powf(b) + 1.0)
            } else {
                0.0
            };
            for d in 0..3 {
                let grad = clip(coef * (current[d] - other[d]));
                embedding[i][d] += grad * alpha;
                embedding[j][d] -= grad * alpha;
            }
            next_sample[e] += epochs_per_sample[e];

            // Repulsion from random vertices
            let n_neg = ((epoch_f - next_negative[e]) / epochs_per_negative[e]).max(0.0) as usize;
            for _ in 0..n_neg {
                let k = rng.gen_range(0..n);
                if k == i {
                    continue;
                }
                let current = embedding[i];
                let other = embedding[k];
                let d2: f32 = (0..3).map(|d| (current[d] - other[d]).powi(2)).sum();
                for d in 0..3 {
                    let grad = if d2 > 0.0 {
                        let coef = 2.0 * b / ((0.001 + d2) * (a * d2.powf(b) + 1.0));
                        clip(coef * (current[d] - other[d]))
                    } else {
                        GRAD_CLIP
                    };
                    embedding[i][d] += grad * alpha;
                }
            }
            next_negative[e] += n_neg as f32 * epochs_per_negative[e];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_ab_matches_reference_curve() {
        // Reference values for spread 1.0, min_dist 0.1
        let (a, b) = fit_ab(1.0, 0.1);
        assert!((a - 1.577).abs() < 0.05, "a = {}", a);
        assert!((b - 0.895).abs() < 0.05, "b = {}", b);
    }

    #[test]
    fn smooth_knn_hits_log2_k() {
        let neighbors = vec![(1, 0.5), (2, 1.0), (3, 1.5), (4, 3.0)];
        let w = smooth_knn_weights(&neighbors, 4);
        assert_eq!(w[0], 1.0);
        let sum: f32 = w.iter().sum();
        assert!((sum - 2.0).abs() < 1e-3, "sum {}", sum);
        assert!(w.windows(2).all(|p| p[0] >= p[1]));
    }

    #[test]
    fn tiny_inputs() {
        let params = UmapParams::default();
        assert!(project(&[], &params).is_empty());
        let one: &[f32] = &[1.0, 2.0];
        assert_eq!(project(&[one], &params), vec![[0.0; 3]]);
        let two: &[f32] = &[3.0, 4.0];
        let out = project(&[one, two], &params);
        assert_eq!(out.len(), 2);
        assert!(out.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let rows: Vec<Vec<f32>> = (0..8).map(|i| vec![i as f32, (i * i) as f32 * 0.1]).collect();
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let params = UmapParams { n_epochs: 100, ..Default::default() };
        assert_eq!(project(&refs, &params), project(&refs, &params));
    }

    #[test]
    fn separated_groups_stay_separated() {
        let mut rows = Vec::new();
        for i in 0..6 {
            rows.push(vec![0.0 + i as f32 * 0.01, 0.0, 0.0, 0.02 * (i % 2) as f32]);
        }
        for i in 0..6 {
            rows.push(vec![10.0 + i as f32 * 0.01, 10.0, 10.0, 0.02 * (i % 2) as f32]);
        }
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let out = project(&refs, &UmapParams::default());

        let dist = |p: Vec3, q: Vec3| crate::fast_math::distance_squared3(p, q).sqrt();
        let mut intra = 0.0;
        let mut intra_n = 0;
        let mut inter = 0.0;
        let mut inter_n = 0;
        for i in 0..12 {
            for j in (i + 1)..12 {
                if (i < 6) == (j < 6) {
                    intra += dist(out[i], out[j]);
                    intra_n += 1;
                } else {
                    inter += dist(out[i], out[j]);
                    inter_n += 1;
                }
            }
        }
        assert!(intra / intra_n as f32 <= inter / inter_n as f32);
    }
}
