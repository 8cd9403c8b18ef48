//! Toolbar rendering for `GalaxyApp`.
//!
//! Draws the mode buttons, the scroll state readout and the reload button.

use eframe::egui;
use concept_galaxy::scroll::GalaxyMode;

use super::GalaxyApp;

impl GalaxyApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("\u{2726} Concept Galaxy").strong());
            ui.separator();

            // Mode buttons bypass the wheel cooldown and lock
            for mode in GalaxyMode::ALL {
                let selected = self.scroll.mode() == mode;
                if ui.selectable_label(selected, mode.label()).clicked() && self.scroll.select_mode(mode) {
                    log::info!("mode {:?} selected from toolbar", mode);
                    self.scene.set_mode(mode);
                }
            }

            ui.separator();
            if ui.button("\u{21BB} Reload").clicked() {
                self.reload_concepts();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(8.0);
                let state = if self.scroll.is_past() {
                    "content"
                } else if self.scroll.is_locked() {
                    "scrolling"
                } else {
                    "pinned"
                };
                ui.label(
                    egui::RichText::new(format!(
                        "{} concepts \u{00B7} {}",
                        self.scene.concepts().len(),
                        state
                    ))
                    .weak(),
                );
                if let Some(err) = &self.load_error {
                    ui.colored_label(egui::Color32::from_rgb(230, 110, 90), err);
                }
            });
        });
    }
}
