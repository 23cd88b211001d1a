use eframe::egui;

use crate::data::model::PreparedTable;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SnapScopeApp {
    pub state: AppState,
}

impl SnapScopeApp {
    pub fn new(table: PreparedTable, page_size: usize) -> Self {
        Self {
            state: AppState::new(table, page_size),
        }
    }
}

impl eframe::App for SnapScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: cascading filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: chart ----
        egui::TopBottomPanel::bottom("chart_panel")
            .default_height(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::snaps_plot(ui, &self.state);
            });

        // ---- Central panel: table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::data_table(ui, &mut self.state);
        });
    }
}
