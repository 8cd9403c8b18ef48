//! Star field dispersion: coalesced galaxy ↔ scattered, invisible field.
//!
//! A single scalar `progress` walks linearly toward `target` at `rate` per
//! second, so the animation speed does not depend on the frame rate. The
//! per-star display buffers are refreshed from `progress` every frame.

use rayon::prelude::*;

use crate::fast_math::{fma, Vec3};
use crate::render::starfield::StarDatum;

/// Fields smaller than this are refreshed on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
pub struct StarFieldState {
    stars: Vec<StarDatum>,
    /// 0 = coalesced galaxy, 1 = fully dispersed
    progress: f32,
    target: f32,
    /// Progress units per second
    rate: f32,
    /// World distance travelled along `direction` at progress 1
    spread: f32,
    positions: Vec<Vec3>,
    opacities: Vec<f32>,
}

impl StarFieldState {
    pub fn new(stars: Vec<StarDatum>, rate: f32, spread: f32) -> Self {
        let positions = stars.iter().map(|s| s.position).collect();
        let opacities = stars.iter().map(|s| s.base_opacity()).collect();
        Self {
            stars,
            progress: 0.0,
            target: 0.0,
            rate: rate.max(0.0),
            spread,
            positions,
            opacities,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target.clamp(0.0, 1.0);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_settled(&self) -> bool {
        self.progress == self.target
    }

    /// Step toward the target by `rate * dt` without overshooting, then
    /// refresh the display buffers. Returns true while still moving.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let step = self.rate * dt.max(0.0);
        let delta = self.target - self.progress;
        if delta.abs() <= step {
            self.progress = self.target;
        } else {
            self.progress += step.copysign(delta);
        }
        self.refresh();
        !self.is_settled()
    }

    fn refresh(&mut self) {
        let travel = self.progress * self.spread;
        let fade = 1.0 - self.progress;
        let update = |((pos, alpha), star): ((&mut Vec3, &mut f32), &StarDatum)| {
            for k in 0..3 {
                pos[k] = fma(star.direction[k], travel, star.position[k]);
            }
            *alpha = star.base_opacity() * fade;
        };
        if self.stars.len() >= PARALLEL_THRESHOLD {
            self.positions
                .par_iter_mut()
                .zip(self.opacities.par_iter_mut())
                .zip(self.stars.par_iter())
                .for_each(update);
        } else {
            self.positions
                .iter_mut()
                .zip(self.opacities.iter_mut())
                .zip(self.stars.iter())
                .for_each(update);
        }
    }

    pub fn stars(&self) -> &[StarDatum] {
        &self.stars
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    /// Nothing left to draw once fully dispersed.
    pub fn is_invisible(&self) -> bool {
        self.progress >= 1.0
    }
}
