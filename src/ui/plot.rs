use eframe::egui::{RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::data::filter::Chart;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Offense snaps chart (bottom panel)
// ---------------------------------------------------------------------------

/// Render one snaps-per-week line per player, or the "no data" placeholder.
pub fn snaps_plot(ui: &mut Ui, state: &AppState) {
    let series = match &state.view.chart {
        Chart::Lines(series) => series,
        Chart::NoData => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("No Data Available");
            });
            return;
        }
    };

    ui.label(RichText::new("Offense Snaps Over Time").strong());

    Plot::new("offense-snaps-graph")
        .legend(Legend::default())
        .x_axis_label("week")
        .y_axis_label("offense_snaps")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let color = state.color_map.color_for(&s.name);

                let line_points: PlotPoints = s.points.iter().copied().collect();
                plot_ui.line(Line::new(line_points).name(&s.name).color(color).width(1.5));

                // Markers keep single-week players visible.
                let marker_points: PlotPoints = s.points.iter().copied().collect();
                plot_ui.points(Points::new(marker_points).name(&s.name).color(color).radius(2.5));
            }
        });
}
