use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{estimate, panels, plot, table};

/// How often to check on a pending estimate.
const ESTIMATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CostViewerApp {
    pub state: AppState,
}

impl CostViewerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CostViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_estimate();
        if self.state.is_estimating() {
            ctx.request_repaint_after(ESTIMATE_POLL_INTERVAL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: grounded estimate ----
        egui::TopBottomPanel::bottom("estimate_panel")
            .resizable(true)
            .min_height(160.0)
            .default_height(220.0)
            .show(ctx, |ui| {
                estimate::estimate_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, records ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.store.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a cost dataset to begin  (File → Open…)");
                });
                return;
            }
            plot::metrics_row(ui, &self.state);
            ui.add_space(8.0);
            plot::group_charts(ui, &self.state);
            ui.separator();
            table::records_table(ui, &self.state);
        });
    }
}
