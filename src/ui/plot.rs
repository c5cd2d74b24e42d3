use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::stats::GroupMean;
use crate::state::AppState;
use crate::ui::format::summary_cells;

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Mean / max / min cost of the visible records.
pub fn metrics_row(ui: &mut Ui, state: &AppState) {
    let [mean, max, min] = summary_cells(&state.summary);
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Mean treatment cost", &mean);
        metric(&mut cols[1], "Highest treatment cost", &max);
        metric(&mut cols[2], "Lowest treatment cost", &min);
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(label);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Grouped mean bar charts (central panel)
// ---------------------------------------------------------------------------

/// Mean cost per region and per industry, side by side.
pub fn group_charts(ui: &mut Ui, state: &AppState) {
    ui.columns(2, |cols: &mut [Ui]| {
        group_chart(
            &mut cols[0],
            "region_means",
            "Mean cost by region",
            &state.region_means,
            &state.region_colors,
        );
        group_chart(
            &mut cols[1],
            "industry_means",
            "Mean cost by industry",
            &state.industry_means,
            &state.industry_colors,
        );
    });
}

fn group_chart(ui: &mut Ui, id: &str, title: &str, means: &[GroupMean], colors: &ColorMap) {
    ui.strong(title);
    if means.iter().all(|g| g.mean.is_none()) {
        ui.label("No cost data for the current filters.");
        return;
    }

    Plot::new(id)
        .height(240.0)
        .legend(Legend::default())
        .y_axis_label("¥/吨")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            // One chart per group so each key shows up in the legend.
            for (i, group) in means.iter().enumerate() {
                let Some(mean) = group.mean else {
                    continue;
                };
                let bar = Bar::new(i as f64, mean).width(0.7).name(&group.key);
                let chart = BarChart::new(vec![bar])
                    .name(&group.key)
                    .color(colors.color_for(&group.key));
                plot_ui.bar_chart(chart);
            }
        });
}
