//! Pointer picking: which concept is under the cursor.
//!
//! The pointer becomes a world ray and each concept is tested by its
//! perpendicular distance to that ray, the same way whatever the layout.
//! Hover is recomputed every frame, since concepts move under a pointer that
//! stays still.

use serde::{Deserialize, Serialize};

use crate::fast_math::{dot3, length_squared3, sub3, Vec3};
use crate::render::camera::Ray;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Maximum ray-to-point distance (world units) that counts as a hit
    pub proximity: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self { proximity: 0.5 }
    }
}

/// Receiver of concept clicks (the host application's router).
pub trait ConceptNavigator {
    fn navigate_to_concept_detail(&mut self, id: &str);
}

/// Squared distance from `point` to the ray. Points behind the origin
/// measure to the origin itself.
pub fn ray_distance_squared(ray: &Ray, point: Vec3) -> f32 {
    let rel = sub3(point, ray.origin);
    let t = dot3(rel, ray.dir);
    if t <= 0.0 {
        return length_squared3(rel);
    }
    (length_squared3(rel) - t * t).max(0.0)
}

/// Index of the point closest to the ray within `threshold`.
pub fn nearest_to_ray(ray: &Ray, positions: &[Vec3], threshold: f32) -> Option<usize> {
    let limit = threshold * threshold;
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| (i, ray_distance_squared(ray, *p)))
        .filter(|&(_, d2)| d2 <= limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Change reported by `HoverTracker::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverChange {
    Entered(String),
    Left(String),
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: Option<String>,
}

impl HoverTracker {
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Re-test the pointer against this frame's positions. `ray` is `None`
    /// when the pointer left the canvas.
    pub fn update(
        &mut self,
        ray: Option<&Ray>,
        ids: &[String],
        positions: &[Vec3],
        threshold: f32,
    ) -> HoverChange {
        let hit = ray
            .and_then(|r| nearest_to_ray(r, positions, threshold))
            .and_then(|i| ids.get(i))
            .cloned();
        if hit == self.hovered {
            return HoverChange::Unchanged;
        }
        let previous = std::mem::replace(&mut self.hovered, hit);
        match (&self.hovered, previous) {
            (Some(id), _) => HoverChange::Entered(id.clone()),
            (None, Some(old)) => HoverChange::Left(old),
            (None, None) => HoverChange::Unchanged,
        }
    }

    /// Click at `ray`: navigates when it hits a concept.
    pub fn click(
        &self,
        ray: &Ray,
        ids: &[String],
        positions: &[Vec3],
        threshold: f32,
        navigator: &mut dyn ConceptNavigator,
    ) -> Option<String> {
        let id = nearest_to_ray(ray, positions, threshold).and_then(|i| ids.get(i))?;
        log::info!("navigate to concept {}", id);
        navigator.navigate_to_concept_detail(id);
        Some(id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray_down_z() -> Ray {
        Ray {
            origin: [0.0, 0.0, 10.0],
            dir: [0.0, 0.0, -1.0],
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn perpendicular_distance() {
        let r = ray_down_z();
        assert!((ray_distance_squared(&r, [0.3, 0.4, 0.0]) - 0.25).abs() < 1e-6);
        // Behind the origin: distance to the origin
        assert!((ray_distance_squared(&r, [0.0, 0.0, 12.0]) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn picks_closest_within_threshold() {
        let r = ray_down_z();
        let pts = vec![[0.45, 0.0, 0.0], [0.1, 0.0, -3.0], [2.0, 0.0, 0.0]];
        assert_eq!(nearest_to_ray(&r, &pts, 0.5), Some(1));
        assert_eq!(nearest_to_ray(&r, &pts[2..], 0.5), None);
        assert_eq!(nearest_to_ray(&r, &[], 0.5), None);
    }

    #[test]
    fn hover_clears_when_points_move_away() {
        let r = ray_down_z();
        let ids = ids(1);
        let mut hover = HoverTracker::default();
        assert_eq!(
            hover.update(Some(&r), &ids, &[[0.1, 0.0, 0.0]], 0.5),
            HoverChange::Entered("c0".into())
        );
        assert_eq!(hover.update(Some(&r), &ids, &[[0.2, 0.0, 0.0]], 0.5), HoverChange::Unchanged);
        // Pointer still; the concept slid out from under it
        assert_eq!(
            hover.update(Some(&r), &ids, &[[3.0, 0.0, 0.0]], 0.5),
            HoverChange::Left("c0".into())
        );
        assert_eq!(hover.hovered(), None);
    }

    #[test]
    fn hover_clears_on_pointer_leave() {
        let r = ray_down_z();
        let ids = ids(1);
        let mut hover = HoverTracker::default();
        hover.update(Some(&r), &ids, &[[0.0; 3]], 0.5);
        assert_eq!(hover.update(None, &ids, &[[0.0; 3]], 0.5), HoverChange::Left("c0".into()));
    }

    struct Recorder(Vec<String>);

    impl ConceptNavigator for Recorder {
        fn navigate_to_concept_detail(&mut self, id: &str) {
            self.0.push(id.to_string());
        }
    }

    #[test]
    fn click_navigates_only_on_hit() {
        let r = ray_down_z();
        let ids = ids(2);
        let pts = [[5.0, 0.0, 0.0], [0.0, 0.2, 1.0]];
        let mut nav = Recorder(Vec::new());
        let hover = HoverTracker::default();
        assert_eq!(hover.click(&r, &ids, &pts, 0.5, &mut nav), Some("c1".into()));
        assert_eq!(hover.click(&r, &ids, &pts[..1], 0.5, &mut nav), None);
        assert_eq!(nav.0, vec!["c1".to_string()]);
    }
}
