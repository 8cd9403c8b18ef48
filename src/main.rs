use eframe::egui;

use concept_galaxy::concept::{Concept, ConceptSource, JsonConceptSource, StaticConceptSource};
use concept_galaxy::config::GalaxyConfig;
use concept_galaxy::error::LoadError;

mod app;

use app::GalaxyApp;

/// Concepts from the configured JSON file, or the bundled sample data.
fn load_concepts(config: &GalaxyConfig) -> Result<Vec<Concept>, LoadError> {
    match &config.concepts_path {
        Some(path) => JsonConceptSource::new(path).list(),
        None => StaticConceptSource::sample()?.list(),
    }
}

fn main() {
    env_logger::init();

    let config_path = GalaxyConfig::default_path();
    let config = GalaxyConfig::load(&config_path).unwrap_or_else(|e| {
        log::warn!("{} ({}); using defaults", e, config_path.display());
        GalaxyConfig::default()
    });

    let concepts = load_concepts(&config).unwrap_or_else(|e| {
        log::warn!("{}; falling back to the bundled sample concepts", e);
        StaticConceptSource::sample()
            .and_then(|s| s.list())
            .unwrap_or_default()
    });
    log::info!("starting with {} concepts", concepts.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Concept Galaxy",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(GalaxyApp::new(concepts, config)))
        }),
    );
    if let Err(e) = result {
        log::error!("failed to start Concept Galaxy: {}", e);
        std::process::exit(1);
    }
}
