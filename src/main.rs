//! Smoking Dashboard - Global Smoking Statistics Viewer
//!
//! Loads smoking prevalence data once and renders filterable charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = DashboardConfig::default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("🚬 Smoking Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Smoking Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
