use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CostField;
use crate::estimate::pipeline::EstimationResult;
use crate::state::{AppState, EstimateState};

/// Industry text, pollutant selector, and the latest estimate.
pub fn estimate_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Cost estimate");

    let Some(store) = state.store.clone() else {
        ui.label("Load a dataset to estimate costs for new industry / pollutant combinations.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Industry");
        ui.add(
            egui::TextEdit::singleline(&mut state.estimate_industry)
                .hint_text("e.g. 制药")
                .desired_width(180.0),
        );

        ui.label("Pollutant");
        let selected_text = state.estimate_pollutant.clone().unwrap_or_default();
        egui::ComboBox::from_id_salt("estimate_pollutant")
            .selected_text(selected_text)
            .show_ui(ui, |ui: &mut Ui| {
                for value in store.distinct(CostField::PollutantType) {
                    ui.selectable_value(
                        &mut state.estimate_pollutant,
                        Some(value.clone()),
                        value.as_str(),
                    );
                }
            });

        let button = ui.add_enabled(state.can_estimate(), egui::Button::new("Estimate"));
        if button.clicked() {
            state.start_estimate();
        }
        if state.is_estimating() {
            ui.spinner();
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &state.estimate {
            EstimateState::Idle => {
                ui.label("Results are generated by an external model from matching historical records.");
            }
            EstimateState::Pending { request, .. } => {
                ui.label(format!(
                    "Estimating {} / {}…",
                    request.industry, request.pollutant
                ));
            }
            EstimateState::Finished { request, outcome } => {
                ui.strong(format!("{} / {}", request.industry, request.pollutant));
                match outcome {
                    Ok(EstimationResult::Narrative {
                        text,
                        matched_records,
                    }) => {
                        ui.weak(format!("Grounded on {matched_records} historical records"));
                        ui.label(text.as_str());
                    }
                    Ok(EstimationResult::NoHistoricalBasis) => {
                        ui.label("No historical records match this pollutant; no estimate was requested.");
                    }
                    Err(e) => {
                        ui.label(RichText::new(format!("Estimation failed: {e}")).color(Color32::RED));
                        if e.is_auth_failure() {
                            ui.weak("Check LLM_API_KEY in the environment or .env file.");
                        }
                    }
                }
            }
        });
}
