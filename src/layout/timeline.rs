//! Timeline layout: concepts fill constellation patterns in learning order.

use std::f32::consts::PI;

use crate::concept::{Concept, LearnedDate};
use crate::constellation::ConstellationPattern;
use crate::fast_math::{add3, Vec3};
use crate::layout::LayoutPositionMap;

/// Radius of the arc that holds concepts beyond the catalog capacity.
pub const OVERFLOW_RADIUS: f32 = 1.5;
/// Gap between a pattern's top star and its label.
const LABEL_GAP: f32 = 0.45;

/// One pattern and the concepts placed on its stars.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternAssignment {
    pub pattern_index: usize,
    pub name: &'static str,
    /// Ids in star order (= learning order)
    pub concept_ids: Vec<String>,
    /// Learning date of the first concept, shown in the label
    pub first_date: LearnedDate,
    /// World position of the label
    pub label_anchor: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineLayout {
    pub positions: LayoutPositionMap,
    pub assignments: Vec<PatternAssignment>,
    /// Ids that did not fit into any pattern
    pub overflow: Vec<String>,
}

fn scaled_offset(pattern: &ConstellationPattern, path_scale: f32) -> Vec3 {
    [pattern.offset[0] * path_scale, pattern.offset[1], pattern.offset[2]]
}

/// `path_scale` squeezes the path horizontally (1.0 = full width).
pub fn timeline_layout(
    concepts: &[Concept],
    patterns: &[ConstellationPattern],
    path_scale: f32,
) -> TimelineLayout {
    let mut order: Vec<&Concept> = concepts.iter().collect();
    order.sort_by_key(|c| c.date_learned);

    let mut layout = TimelineLayout {
        positions: LayoutPositionMap::with_capacity(concepts.len()),
        ..Default::default()
    };

    let mut queue = order.into_iter().peekable();
    for (pattern_index, pattern) in patterns.iter().enumerate() {
        let Some(first) = queue.peek() else { break };
        let first_date = first.date_learned;
        let offset = scaled_offset(pattern, path_scale);

        let mut ids = Vec::with_capacity(pattern.stars.len());
        for star in &pattern.stars {
            let Some(c) = queue.next() else { break };
            layout.positions.insert(c.id.clone(), add3(*star, offset));
            ids.push(c.id.clone());
        }
        if ids.is_empty() {
            continue;
        }

        let top = pattern
            .stars
            .iter()
            .map(|s| s[1])
            .fold(f32::NEG_INFINITY, f32::max);
        let top = if top.is_finite() { top } else { 0.0 };
        layout.assignments.push(PatternAssignment {
            pattern_index,
            name: pattern.name,
            concept_ids: ids,
            first_date,
            label_anchor: add3(offset, [0.0, top + LABEL_GAP, 0.0]),
        });
    }

    let rest: Vec<&Concept> = queue.collect();
    if !rest.is_empty() {
        let center = patterns
            .last()
            .map(|p| scaled_offset(p, path_scale))
            .unwrap_or([0.0; 3]);
        log::debug!(
            "timeline: {} concepts overflow the {} patterns",
            rest.len(),
            patterns.len()
        );
        let n = rest.len();
        for (i, c) in rest.into_iter().enumerate() {
            let angle = if n > 1 { PI * i as f32 / (n - 1) as f32 } else { PI * 0.5 };
            let p = add3(
                center,
                [OVERFLOW_RADIUS * angle.cos(), -OVERFLOW_RADIUS * angle.sin(), 0.0],
            );
            layout.positions.insert(c.id.clone(), p);
            layout.overflow.push(c.id.clone());
        }
    }

    layout
}
