mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Result, anyhow};
use app::SnapScopeApp;
use config::{CONFIG_FILE, DashboardConfig};
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))?;

    // Sources are fetched once, before the window opens; failures abort startup.
    let table = data::prepare::load_and_prepare(&config)
        .inspect_err(|e| log::error!("Failed to prepare dashboard data: {e:#}"))?;
    let page_size = config.page_size;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NFL Player Performance Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SnapScopeApp::new(table, page_size)))),
    )
    .map_err(|e| anyhow!("running dashboard window: {e}"))
}
