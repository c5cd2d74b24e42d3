use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::CostField;
use crate::state::AppState;
use crate::ui::format::{UNDEFINED, format_cost};

const ROW_HEIGHT: f32 = 20.0;

/// Detailed table of the visible records.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(store) = &state.store else {
        return;
    };
    if state.visible_indices.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(100.0), CostField::ALL.len())
        .column(Column::remainder().at_least(120.0))
        .min_scrolled_height(0.0)
        .header(ROW_HEIGHT, |mut header| {
            for field in CostField::ALL {
                header.col(|ui| {
                    ui.strong(field.display_name());
                });
            }
            header.col(|ui| {
                ui.strong("Unit cost");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let Some(rec) = store.get(state.visible_indices[row.index()]) else {
                    return;
                };
                for field in CostField::ALL {
                    row.col(|ui| {
                        ui.label(field.value(rec).unwrap_or(UNDEFINED));
                    });
                }
                row.col(|ui| {
                    let text = rec.unit_cost.map_or_else(|| UNDEFINED.to_string(), format_cost);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(text);
                    });
                });
            });
        });
}
