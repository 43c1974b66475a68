//! Smoking Dashboard Main Application
//! Main window with the filter panel and the dashboard view.

use crate::config::DashboardConfig;
use crate::data::{DashboardPipeline, DataLoader, DataProcessor};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use anyhow::{Context, Result};
use egui::{Color32, RichText, SidePanel};
use log::{error, info};
use polars::prelude::DataFrame;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Complete(&'static DataFrame),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    dataset: Option<&'static DataFrame>,
    load_error: Option<String>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(&config),
            chart_viewer: ChartViewer::new(),
            config,
            dataset: None,
            load_error: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load the dataset in a background thread.
    fn start_loading(&mut self) {
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;

        let path = self.config.csv_path.clone();
        thread::spawn(move || {
            let result = match DataLoader::shared(&path).load() {
                Ok(df) => LoadResult::Complete(df),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(df)) => {
                self.is_loading = false;
                if let Err(e) = self.on_dataset_loaded(df) {
                    error!("{e:#}");
                    self.load_error = Some(format!("{e:#}"));
                }
            }
            Ok(LoadResult::Error(e)) => {
                error!("Data load failed: {e}");
                self.is_loading = false;
                self.load_error = Some(e);
            }
            Err(_) => self.load_rx = Some(rx),
        }
    }

    fn on_dataset_loaded(&mut self, df: &'static DataFrame) -> Result<()> {
        let years = DataProcessor::distinct_years(df).context("reading years")?;
        let countries = DataProcessor::distinct_countries(df).context("reading countries")?;
        let initial = self.config.initial_countries(&countries);
        info!(
            "{} years and {} countries available, {} pre-selected",
            years.len(),
            countries.len(),
            initial.len()
        );

        self.control_panel.set_options(years, countries, initial);
        self.dataset = Some(df);
        self.recompute();
        Ok(())
    }

    /// Run the pipeline for the current selection.
    fn recompute(&mut self) {
        let Some(df) = self.dataset else {
            return;
        };

        let request = self.control_panel.settings.to_request();
        match DashboardPipeline::respond(df, &request) {
            Ok(tables) => {
                self.control_panel
                    .set_status(&format!("{} rows selected", tables.row_count));
                self.chart_viewer.set_tables(tables);
            }
            Err(e) => {
                error!("{e:#}");
                self.control_panel.set_status(&format!("Error: {e:#}"));
            }
        }
    }

    fn show_blocking_error(ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(format!("❌ Unable to load data\n\n{message}"))
                        .size(18.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        if let Some(message) = &self.load_error {
            Self::show_blocking_error(ctx, message);
            return;
        }

        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged | ControlPanelAction::Refresh => {
                            self.recompute()
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            self.chart_viewer.show(ui);
        });
    }
}
