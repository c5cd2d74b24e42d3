mod app;
mod color;
mod config;
mod data;
mod error;
mod estimate;
mod state;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use app::CostViewerApp;
use config::AppConfig;
use eframe::egui;
use estimate::client::OpenAiCompatClient;
use estimate::pipeline::Estimator;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut config = AppConfig::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.dataset = Some(PathBuf::from(path));
    }
    if config.model.api_key.is_none() {
        log::warn!("LLM_API_KEY is not set; estimates will fail until it is configured");
    }

    let estimator = Estimator::new(OpenAiCompatClient::new(&config.model), config.estimator);
    let mut state = AppState::new(estimator);
    if let Some(path) = &config.dataset {
        // A failed startup load is reported in the status bar.
        let _ = state.load_dataset(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Abatement Cost Viewer",
        options,
        Box::new(move |cc| {
            if let Some(font) = &config.font {
                install_font(&cc.egui_ctx, font);
            }
            Ok(Box::new(CostViewerApp::new(state)))
        }),
    )
}

/// Add a font (typically CJK) as fallback for both font families, so
/// Chinese region and industry names render.
fn install_font(ctx: &egui::Context, path: &Path) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Cannot read font {}: {e}", path.display());
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("dataset".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("dataset".to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Installed font {}", path.display());
}
