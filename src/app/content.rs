//! Content-area rendering for `GalaxyApp`.
//!
//! Contains the per-frame page pipeline and its painters:
//!
//! - `draw_page`        : input → scroll machine → scene → picking → paint
//! - `paint_galaxy`     : star field, constellation lines, concepts, tooltip
//! - `paint_content`    : concept cards below the visualization
//! - `draw_detail_panel`: right-side concept detail view

use std::f32::consts::TAU;

use eframe::egui;
use egui::{pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke};

use concept_galaxy::fast_math::{lerp, Vec3};
use concept_galaxy::render::{OrbitCamera, Ray};
use concept_galaxy::scroll::{GalaxyMode, Viewport, VizBounds};

use super::GalaxyApp;

const HERO_HEIGHT: f32 = 140.0;
const CARD_HEIGHT: f32 = 92.0;
const CARD_GAP: f32 = 12.0;
const CONTENT_PADDING: f32 = 48.0;
const CONTENT_HEADING: f32 = 44.0;
const MAX_CARD_WIDTH: f32 = 720.0;

const GALAXY_SPIN: f32 = 0.04;
const CAMERA_EASE: f32 = 3.0;

const SPACE: Color32 = Color32::from_rgb(3, 4, 12);
const CONCEPT_RGB: [f32; 3] = [1.0, 0.86, 0.58];
const LINE_RGB: [f32; 3] = [0.55, 0.72, 1.0];

/// Camera distance and elevation for each mode.
fn camera_pose(mode: GalaxyMode) -> (f32, f32) {
    match mode {
        GalaxyMode::Galaxy => (6.0, 0.55),
        GalaxyMode::Clusters => (9.0, 0.25),
        GalaxyMode::Timeline => (14.0, 0.05),
    }
}

fn rgba(rgb: [f32; 3], alpha: f32) -> Color32 {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(c(rgb[0]), c(rgb[1]), c(rgb[2]), c(alpha))
}

/// Maps between world space and the on-screen visualization rect.
struct Projector {
    camera: OrbitCamera,
    rect: Rect,
}

impl Projector {
    fn aspect(&self) -> f32 {
        self.rect.width() / self.rect.height().max(1.0)
    }

    fn to_screen(&self, world: Vec3) -> Option<(Pos2, f32)> {
        let (ndc, depth) = self.camera.project(world, self.aspect())?;
        let c = self.rect.center();
        Some((
            pos2(
                c.x + ndc[0] * self.rect.width() * 0.5,
                c.y - ndc[1] * self.rect.height() * 0.5,
            ),
            depth,
        ))
    }

    fn ray(&self, screen: Pos2) -> Ray {
        let c = self.rect.center();
        let ndc = [
            (screen.x - c.x) / (self.rect.width() * 0.5).max(1.0),
            -(screen.y - c.y) / (self.rect.height() * 0.5).max(1.0),
        ];
        self.camera.ray(ndc, self.aspect())
    }

    fn pixels_per_unit(&self, depth: f32) -> f32 {
        self.camera.pixels_per_unit(depth, self.rect.height())
    }
}

impl GalaxyApp {
    fn content_height(&self) -> f32 {
        let n = self.scene.concepts().len() as f32;
        CONTENT_PADDING * 2.0 + CONTENT_HEADING + n * (CARD_HEIGHT + CARD_GAP)
    }

    // ── Frame pipeline ───────────────────────────────────────────────────────

    pub fn draw_page(&mut self, ui: &mut egui::Ui, now: f64, dt: f32) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let viewport_h = rect.height().max(1.0);
        let bounds = VizBounds {
            top: HERO_HEIGHT,
            height: viewport_h,
        };
        self.page
            .set_geometry(viewport_h, HERO_HEIGHT + viewport_h + self.content_height());

        // 1. Scroll input
        let wheel = if ui.rect_contains_pointer(rect) {
            ui.input(|i| -i.raw_scroll_delta.y)
        } else {
            0.0
        };
        if wheel != 0.0 {
            let r = self.scroll.on_wheel(wheel, bounds, &mut self.page, now);
            if !r.consumed {
                self.page.wheel(wheel);
            }
            if let Some(mode) = r.mode_changed {
                self.scene.set_mode(mode);
            }
        }
        let step = self.page.step(now, dt);
        if step.moved {
            if let Some(mode) = self.scroll.on_scroll(bounds, &mut self.page, now) {
                self.scene.set_mode(mode);
            }
        }
        if step.scroll_ended {
            self.scroll.on_scroll_end(now);
        }
        self.scroll.tick(bounds, &mut self.page, now);

        // 2. Scene
        self.scene.set_aspect(rect.width() / viewport_h);
        self.scene.advance(dt);
        if response.dragged() {
            self.orbit_offset += response.drag_delta() * 0.005;
            self.orbit_offset.y = self.orbit_offset.y.clamp(-0.5, 0.9);
        }
        self.update_camera(dt);

        let offset = self.page.scroll_offset();
        let viz_rect = Rect::from_min_size(
            pos2(rect.left(), rect.top() + bounds.top - offset),
            vec2(rect.width(), viewport_h),
        );
        let projector = Projector {
            camera: self.camera,
            rect: viz_rect,
        };

        // 3. Picking, re-evaluated every frame
        let pointer = ui.input(|i| i.pointer.hover_pos());
        let visible = viz_rect.intersect(rect);
        let ray = pointer
            .filter(|p| visible.contains(*p))
            .map(|p| projector.ray(p));
        self.scene.update_hover(ray.as_ref());
        if response.clicked() {
            if let Some(ray) = &ray {
                self.scene.click(ray, &mut self.detail);
            }
        }

        // 4. Paint
        let painter = ui.painter_at(rect);
        self.paint_hero(&painter, rect, offset);
        if viz_rect.intersects(rect) {
            self.paint_galaxy(&painter, &projector, pointer);
        }
        self.paint_content(&painter, rect, rect.top() + bounds.bottom() - offset);
    }

    fn update_camera(&mut self, dt: f32) {
        let mode = self.scene.mode();
        let k = 1.0 - (-CAMERA_EASE * dt).exp();
        if mode == GalaxyMode::Galaxy {
            self.spin += GALAXY_SPIN * dt;
        } else {
            let rest = (self.spin / TAU).round() * TAU;
            self.spin = lerp(self.spin, rest, k);
        }
        let (distance, elevation) = camera_pose(mode);
        self.camera.distance = lerp(self.camera.distance, distance, k);
        self.camera.elevation = lerp(self.camera.elevation, elevation + self.orbit_offset.y, k);
        self.camera.azimuth = self.spin + self.orbit_offset.x;
    }

    // ── Painters ─────────────────────────────────────────────────────────────

    fn paint_hero(&self, painter: &Painter, rect: Rect, offset: f32) {
        let top = rect.top() - offset;
        if top + HERO_HEIGHT < rect.top() {
            return;
        }
        let center = rect.center().x;
        painter.text(
            pos2(center, top + 56.0),
            Align2::CENTER_CENTER,
            "Concept Galaxy",
            FontId::proportional(30.0),
            Color32::from_gray(235),
        );
        painter.text(
            pos2(center, top + 96.0),
            Align2::CENTER_CENTER,
            format!(
                "{} concepts learned \u{00B7} scroll to explore",
                self.scene.concepts().len()
            ),
            FontId::proportional(14.0),
            Color32::from_gray(150),
        );
    }

    fn paint_galaxy(&self, painter: &Painter, projector: &Projector, pointer: Option<Pos2>) {
        let viz = projector.rect;
        painter.rect_filled(viz, 0.0, SPACE);

        // Star field (skipped entirely once dispersed)
        let stars = self.scene.stars();
        if !stars.is_invisible() {
            for ((p, alpha), datum) in stars
                .positions()
                .iter()
                .zip(stars.opacities())
                .zip(stars.stars())
            {
                if *alpha < 0.01 {
                    continue;
                }
                let Some((pos, depth)) = projector.to_screen(*p) else {
                    continue;
                };
                if !viz.contains(pos) {
                    continue;
                }
                let radius = if datum.is_haze {
                    (datum.size * 0.02 * projector.pixels_per_unit(depth)).clamp(2.0, 40.0)
                } else {
                    (datum.size * 0.8).clamp(0.5, 3.0)
                };
                painter.circle_filled(pos, radius, rgba(datum.color, *alpha));
            }
        }

        // Constellation lines and labels
        let line_alpha = self.scene.line_opacity();
        if line_alpha > 0.0 {
            let stroke = Stroke::new(1.2, rgba(LINE_RGB, 0.6 * line_alpha));
            for (a, b) in self.scene.line_segments() {
                if let (Some((pa, _)), Some((pb, _))) = (projector.to_screen(a), projector.to_screen(b)) {
                    painter.line_segment([pa, pb], stroke);
                }
            }
            for assignment in self.scene.assignments() {
                if let Some((pos, _)) = projector.to_screen(assignment.label_anchor) {
                    painter.text(
                        pos,
                        Align2::CENTER_BOTTOM,
                        format!("{} \u{00B7} {}", assignment.name, assignment.first_date),
                        FontId::proportional(12.0),
                        rgba([0.8, 0.86, 1.0], line_alpha),
                    );
                }
            }
        }

        // Concepts with a soft glow halo
        let hovered = self.scene.hovered();
        let (ids, positions) = self.scene.concept_positions();
        for (id, p) in ids.iter().zip(positions) {
            let Some((pos, depth)) = projector.to_screen(*p) else {
                continue;
            };
            if !viz.expand(20.0).contains(pos) {
                continue;
            }
            let is_hovered = hovered == Some(id.as_str());
            let mut r = (0.06 * projector.pixels_per_unit(depth)).clamp(3.0, 9.0);
            if is_hovered {
                r *= 1.4;
            }
            painter.circle_filled(pos, r * 3.0, rgba(CONCEPT_RGB, 0.08));
            painter.circle_filled(pos, r * 1.8, rgba(CONCEPT_RGB, 0.22));
            painter.circle_filled(pos, r, rgba([1.0, 0.97, 0.9], 0.95));
            if is_hovered || self.scene.mode() == GalaxyMode::Timeline {
                if let Some(c) = self.scene.concept(id) {
                    painter.text(
                        pos + vec2(0.0, r + 4.0),
                        Align2::CENTER_TOP,
                        &c.name,
                        FontId::proportional(if is_hovered { 14.0 } else { 11.0 }),
                        Color32::from_gray(if is_hovered { 245 } else { 170 }),
                    );
                }
            }
        }

        // Tooltip for the hovered concept
        if let (Some(id), Some(pointer)) = (hovered, pointer) {
            if let Some(c) = self.scene.concept(id) {
                let text = if c.short_summary.is_empty() {
                    format!("{}\n{}", c.name, c.date_learned)
                } else {
                    format!("{}\n{}\n{}", c.name, c.date_learned, c.short_summary)
                };
                let galley = painter.layout(
                    text,
                    FontId::proportional(13.0),
                    Color32::from_gray(230),
                    260.0,
                );
                let tip = Rect::from_min_size(pointer + vec2(14.0, 14.0), galley.size() + vec2(16.0, 12.0));
                painter.rect_filled(tip, 6.0, Color32::from_rgba_unmultiplied(12, 16, 32, 235));
                painter.galley(tip.min + vec2(8.0, 6.0), galley, Color32::WHITE);
            }
        }
    }

    /// Concept cards below the visualization, newest first.
    fn paint_content(&self, painter: &Painter, rect: Rect, top: f32) {
        if top > rect.bottom() {
            return;
        }
        let width = (rect.width() - 2.0 * CONTENT_PADDING).min(MAX_CARD_WIDTH);
        let left = rect.center().x - width * 0.5;
        painter.text(
            pos2(left, top + CONTENT_PADDING),
            Align2::LEFT_TOP,
            "All concepts",
            FontId::proportional(22.0),
            Color32::from_gray(230),
        );

        let mut concepts: Vec<_> = self.scene.concepts().iter().collect();
        concepts.sort_by(|a, b| b.date_learned.cmp(&a.date_learned));

        let mut y = top + CONTENT_PADDING + CONTENT_HEADING;
        for c in concepts {
            let card = Rect::from_min_size(pos2(left, y), vec2(width, CARD_HEIGHT));
            y += CARD_HEIGHT + CARD_GAP;
            if card.bottom() < rect.top() {
                continue;
            }
            if card.top() > rect.bottom() {
                break;
            }
            painter.rect_filled(card, 8.0, Color32::from_rgb(14, 18, 34));
            painter.text(
                card.min + vec2(16.0, 12.0),
                Align2::LEFT_TOP,
                &c.name,
                FontId::proportional(16.0),
                Color32::from_gray(235),
            );
            painter.text(
                pos2(card.right() - 16.0, card.top() + 14.0),
                Align2::RIGHT_TOP,
                c.date_learned.to_string(),
                FontId::monospace(12.0),
                Color32::from_gray(130),
            );
            let summary = painter.layout(
                c.short_summary.clone(),
                FontId::proportional(13.0),
                Color32::from_gray(170),
                width - 32.0,
            );
            painter.galley(card.min + vec2(16.0, 40.0), summary, Color32::from_gray(170));
        }
    }

    // ── Detail panel ─────────────────────────────────────────────────────────

    pub fn draw_detail_panel(&mut self, ui: &mut egui::Ui) {
        let mut close = false;
        match self.detail.open.as_deref().and_then(|id| self.scene.concept(id)) {
            Some(c) => {
                ui.add_space(8.0);
                ui.heading(&c.name);
                ui.label(egui::RichText::new(c.date_learned.to_string()).weak());
                ui.separator();
                if !c.short_summary.is_empty() {
                    ui.label(egui::RichText::new(&c.short_summary).italics());
                    ui.add_space(6.0);
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.label(&c.long_summary);
                });
            }
            None => {
                ui.label("This concept is no longer in the knowledge base.");
            }
        }
        ui.add_space(8.0);
        if ui.button("Close").clicked() {
            close = true;
        }
        if close {
            self.detail.open = None;
        }
    }
}
