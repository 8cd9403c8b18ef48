//! Orbit camera shared by the painter and the picker.
//!
//! Both sides must agree on the projection exactly, otherwise hover and
//! click land next to the drawn point.

use crate::fast_math::{add3, cross3, dot3, scale3, sub3, Vec3};

/// Points closer than this to the eye plane are not drawn.
pub const NEAR_PLANE: f32 = 0.05;
const MAX_ELEVATION: f32 = 1.5;

/// Camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal orbit angle in radians (0 = looking down -Z)
    pub azimuth: f32,
    /// Vertical orbit angle in radians (positive = looking down)
    pub elevation: f32,
    /// Distance from the camera to the target point
    pub distance: f32,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.35,
            distance: 6.0,
            target: [0.0; 3],
            fov_y: 50f32.to_radians(),
        }
    }
}

/// World-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[cfg(test)]
    pub(crate) fn at(&self, t: f32) -> Vec3 {
        add3(self.origin, scale3(self.dir, t))
    }
}

fn unit(v: Vec3) -> Vec3 {
    let len = dot3(v, v).sqrt();
    if len > f32::EPSILON {
        scale3(v, 1.0 / len)
    } else {
        [0.0, 0.0, -1.0]
    }
}

struct Basis {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    tan_half: f32,
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let el = self.elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION);
        let d = self.distance.max(NEAR_PLANE);
        add3(
            self.target,
            [
                d * self.azimuth.sin() * el.cos(),
                d * el.sin(),
                d * self.azimuth.cos() * el.cos(),
            ],
        )
    }

    fn basis(&self) -> Basis {
        let eye = self.eye();
        let forward = unit(sub3(self.target, eye));
        let right = unit(cross3(forward, [0.0, 1.0, 0.0]));
        let up = cross3(right, forward);
        Basis {
            eye,
            forward,
            right,
            up,
            tan_half: (self.fov_y.clamp(0.1, 3.0) * 0.5).tan(),
        }
    }

    /// Project to NDC (x right, y up, both in [-1, 1] on screen) plus view
    /// depth. `None` behind the near plane.
    pub fn project(&self, world: Vec3, aspect: f32) -> Option<([f32; 2], f32)> {
        let b = self.basis();
        let rel = sub3(world, b.eye);
        let depth = dot3(rel, b.forward);
        if depth < NEAR_PLANE {
            return None;
        }
        let aspect = aspect.max(1e-3);
        let x = dot3(rel, b.right) / (depth * b.tan_half * aspect);
        let y = dot3(rel, b.up) / (depth * b.tan_half);
        Some(([x, y], depth))
    }

    /// Ray from the eye through an NDC point.
    pub fn ray(&self, ndc: [f32; 2], aspect: f32) -> Ray {
        let b = self.basis();
        let aspect = aspect.max(1e-3);
        let dir = add3(
            b.forward,
            add3(
                scale3(b.right, ndc[0] * b.tan_half * aspect),
                scale3(b.up, ndc[1] * b.tan_half),
            ),
        );
        Ray {
            origin: b.eye,
            dir: unit(dir),
        }
    }

    /// Screen pixels per world unit at `depth` for a viewport `height_px` tall.
    pub fn pixels_per_unit(&self, depth: f32, height_px: f32) -> f32 {
        let tan_half = (self.fov_y.clamp(0.1, 3.0) * 0.5).tan();
        height_px * 0.5 / (depth.max(NEAR_PLANE) * tan_half)
    }
}
