//! Control Panel Widget
//! Left side panel with the year/country multiselects and view options.

use crate::config::{DashboardConfig, SNAPSHOT_SIZES};
use crate::data::DashboardRequest;
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeSet;

/// Current filter selection and view options
#[derive(Debug, Default, Clone)]
pub struct FilterSettings {
    pub years: BTreeSet<i64>,
    pub countries: BTreeSet<String>,
    pub live_variation: bool,
    pub snapshot_rows: usize,
    pub top_n: usize,
}

impl FilterSettings {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            years: BTreeSet::new(),
            countries: BTreeSet::new(),
            live_variation: config.live_variation,
            snapshot_rows: config.snapshot_rows,
            top_n: config.top_n,
        }
    }

    pub fn to_request(&self) -> DashboardRequest {
        DashboardRequest {
            years: self.years.clone(),
            countries: self.countries.clone(),
            live_variation: self.live_variation,
            snapshot_rows: self.snapshot_rows,
            top_n: self.top_n,
        }
    }
}

/// Left side control panel with the filter widgets.
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub years: Vec<i64>,
    pub countries: Vec<String>,
    pub country_search: String,
    pub status: String,
}

impl ControlPanel {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            settings: FilterSettings::from_config(config),
            years: Vec::new(),
            countries: Vec::new(),
            country_search: String::new(),
            status: "Loading data...".to_string(),
        }
    }

    /// Populate the widgets once the dataset is available.
    pub fn set_options(&mut self, years: Vec<i64>, countries: Vec<String>, initial: Vec<String>) {
        self.settings.years = years.iter().copied().collect();
        self.settings.countries = initial.into_iter().collect();
        self.years = years;
        self.countries = countries;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🔍 Filter Options")
                    .size(20.0)
                    .color(Color32::from_rgb(231, 76, 60)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Years =====
        ui.label(
            RichText::new(format!(
                "Select Year(s): {}/{}",
                self.settings.years.len(),
                self.years.len()
            ))
            .size(14.0)
            .strong(),
        );
        ui.horizontal(|ui| {
            if ui.small_button("All").clicked() {
                self.settings.years = self.years.iter().copied().collect();
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("None").clicked() {
                self.settings.years.clear();
                action = ControlPanelAction::SelectionChanged;
            }
        });
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("year_list")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for year in &self.years {
                            let mut checked = self.settings.years.contains(year);
                            if ui.checkbox(&mut checked, year.to_string()).changed() {
                                if checked {
                                    self.settings.years.insert(*year);
                                } else {
                                    self.settings.years.remove(year);
                                }
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });

        ui.add_space(10.0);
        ui.separator();

        // ===== Countries =====
        ui.label(
            RichText::new(format!(
                "Select Country(ies): {}/{}",
                self.settings.countries.len(),
                self.countries.len()
            ))
            .size(14.0)
            .strong(),
        );
        ui.horizontal(|ui| {
            if ui.small_button("All").clicked() {
                self.settings.countries = self.countries.iter().cloned().collect();
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("None").clicked() {
                self.settings.countries.clear();
                action = ControlPanelAction::SelectionChanged;
            }
        });
        ui.add(egui::TextEdit::singleline(&mut self.country_search).hint_text("Search..."));

        let query = self.country_search.to_lowercase();
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("country_list")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        for country in &self.countries {
                            if !query.is_empty() && !country.to_lowercase().contains(&query) {
                                continue;
                            }
                            let mut checked = self.settings.countries.contains(country);
                            if ui.checkbox(&mut checked, country).changed() {
                                if checked {
                                    self.settings.countries.insert(country.clone());
                                } else {
                                    self.settings.countries.remove(country);
                                }
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });

        ui.add_space(10.0);
        ui.separator();

        // ===== View Options =====
        ui.label(RichText::new("⚙️ View Options").size(14.0).strong());
        if ui
            .checkbox(&mut self.settings.live_variation, "Simulate live variation (±5%)")
            .changed()
        {
            action = ControlPanelAction::SelectionChanged;
        }
        ui.horizontal(|ui| {
            ui.label("Table rows:");
            for size in SNAPSHOT_SIZES {
                if ui
                    .radio_value(&mut self.settings.snapshot_rows, size, size.to_string())
                    .changed()
                {
                    action = ControlPanelAction::SelectionChanged;
                }
            }
        });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.settings.live_variation, |ui| {
                if ui.button("🔄 Refresh").clicked() {
                    action = ControlPanelAction::Refresh;
                }
            });
        });

        ui.add_space(10.0);
        ui.separator();

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    Refresh,
}
