//! `GalaxyApp`: the top-level egui application state.
//!
//! This module declares the `GalaxyApp` struct and its constructor.
//! All methods are split across the sibling sub-modules:
//!
//! - `page`   : simulated page scroll hosting the visualization
//! - `toolbar`: mode buttons and status
//! - `content`: galaxy painting, picking, detail panel, page content

pub mod content;
pub mod page;
pub mod toolbar;

use eframe::egui;
use rand::Rng;

use concept_galaxy::concept::Concept;
use concept_galaxy::config::GalaxyConfig;
use concept_galaxy::render::picking::ConceptNavigator;
use concept_galaxy::render::{GalaxyScene, OrbitCamera};
use concept_galaxy::scroll::ScrollStateMachine;

use page::PageScroller;

/// Concept detail view opened by clicking a concept.
#[derive(Debug, Default)]
pub struct DetailRouter {
    pub open: Option<String>,
}

impl ConceptNavigator for DetailRouter {
    fn navigate_to_concept_detail(&mut self, id: &str) {
        self.open = Some(id.to_string());
    }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct GalaxyApp {
    pub config: GalaxyConfig,
    pub scene: GalaxyScene,
    pub scroll: ScrollStateMachine,
    pub page: PageScroller,
    pub camera: OrbitCamera,
    /// Slow galaxy rotation (radians), eased back to a full turn outside Galaxy
    pub spin: f32,
    /// User drag added on top of the per-mode camera pose
    pub orbit_offset: egui::Vec2,
    pub detail: DetailRouter,
    pub last_frame_time: Option<f64>,
    pub load_error: Option<String>,
}

impl GalaxyApp {
    pub fn new(concepts: Vec<Concept>, config: GalaxyConfig) -> Self {
        // A fresh galaxy instance on every launch
        let seed: u64 = rand::thread_rng().gen();
        log::debug!("star field seed {:#x}", seed);
        let scene = GalaxyScene::new(concepts, &config, seed);
        Self {
            scroll: ScrollStateMachine::new(config.scroll.clone()),
            scene,
            page: PageScroller::new(),
            camera: OrbitCamera::default(),
            spin: 0.0,
            orbit_offset: egui::Vec2::ZERO,
            detail: DetailRouter::default(),
            last_frame_time: None,
            load_error: None,
            config,
        }
    }

    /// Re-read the concept source and hand the new snapshot to the scene.
    pub fn reload_concepts(&mut self) {
        match crate::load_concepts(&self.config) {
            Ok(concepts) => {
                self.load_error = None;
                self.scene.set_concepts(concepts);
            }
            Err(e) => {
                log::warn!("reload failed: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }
}

impl eframe::App for GalaxyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        let dt = self
            .last_frame_time
            .map(|t| (now - t).clamp(0.0, 0.1) as f32)
            .unwrap_or(0.0);
        self.last_frame_time = Some(now);

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        // Concept detail side panel
        if self.detail.open.is_some() {
            egui::SidePanel::right("detail")
                .default_width(320.0)
                .show(ctx, |ui| {
                    self.draw_detail_panel(ui);
                });
        }

        // Page: hero, pinned visualization, concept list
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(6, 8, 18)))
            .show(ctx, |ui| {
                self.draw_page(ui, now, dt);
            });

        // The galaxy slowly rotates, so the idle view still animates
        if self.scene.is_animating() || self.page.is_moving() || self.scroll.is_locked() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(33));
        }
    }
}
