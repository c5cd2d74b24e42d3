use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Criterion;
use crate::data::model::CostField;
use crate::state::AppState;

/// Label of the "no constraint" entry in each selector.
const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(store) = state.store.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for field in CostField::ALL {
                ui.strong(field.display_name());

                let current = state.criteria.get(field).clone();
                let mut selected = current.clone();
                let selected_text = match &current {
                    Criterion::Unconstrained => ALL_LABEL.to_string(),
                    Criterion::Equals(v) => v.clone(),
                };

                egui::ComboBox::from_id_salt(field.name())
                    .selected_text(selected_text)
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut selected, Criterion::Unconstrained, ALL_LABEL);
                        for value in store.distinct(field) {
                            ui.selectable_value(
                                &mut selected,
                                Criterion::Equals(value.clone()),
                                value.as_str(),
                            );
                        }
                    });

                if selected != current {
                    state.set_criterion(field, selected);
                }
                ui.add_space(6.0);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                for field in CostField::ALL {
                    state.set_criterion(field, Criterion::Unconstrained);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.store.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(store) = &state.store {
            ui.label(format!(
                "{} records loaded, {} visible",
                store.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open cost dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are logged and shown through `status_message`.
        let _ = state.load_dataset(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .add_filter("CSV", &["csv"])
        .set_file_name("废气治理成本数据.csv")
        .save_file();

    let Some(path) = file else {
        return;
    };
    let result = crate::data::export::write_view_csv(&path, &state.visible_view());
    if let Err(e) = result {
        log::error!("Export failed: {e:#}");
        state.status_message = Some(format!("Export failed: {e:#}"));
    }
}
