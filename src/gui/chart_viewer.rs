//! Chart Viewer Widget
//! Central scrollable panel with metrics, charts, map and the raw table.

use crate::charts::ChartPlotter;
use crate::data::DashboardTables;
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;

/// Scrollable dashboard for the latest computed tables.
#[derive(Default)]
pub struct ChartViewer {
    pub tables: Option<DashboardTables>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tables(&mut self, tables: DashboardTables) {
        self.tables = Some(tables);
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(6.0);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(tables) = &self.tables else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("🚬 Global Smoking Statistics Dashboard")
                        .size(26.0)
                        .strong(),
                );
                ui.label(
                    RichText::new(format!("{} rows match the current filters", tables.row_count))
                        .size(12.0)
                        .color(Color32::GRAY),
                );

                if tables.is_empty() {
                    ui.add_space(6.0);
                    ChartPlotter::empty_state(ui, "No rows match the current filters");
                }

                Self::section(ui, "📊 Key Smoking Metrics");
                ChartPlotter::draw_kpi_cards(ui, &tables.kpis);

                ui.columns(2, |columns| {
                    Self::section(&mut columns[0], "👫 Smoking Rate by Gender");
                    ChartPlotter::draw_gender_boxplot(
                        &mut columns[0],
                        &tables.gender_summaries,
                        &tables.gender_rates,
                    );

                    Self::section(&mut columns[1], "📈 Trend Over Years");
                    ChartPlotter::draw_trend_chart(&mut columns[1], &tables.trend);
                });

                Self::section(ui, "🏆 Top Countries by Average Smoking Rate");
                ChartPlotter::draw_top_countries_chart(ui, &tables.top_countries);

                Self::section(ui, "🗺️ Average Smoking Rate by Country");
                match &tables.map {
                    Ok(layer) => ChartPlotter::draw_map(ui, layer),
                    Err(err) => {
                        ui.label(
                            RichText::new(format!("⚠ Map unavailable: {err}"))
                                .color(Color32::from_rgb(243, 156, 18)),
                        );
                    }
                }

                Self::section(ui, "🔍 Filtered Data Snapshot");
                ChartPlotter::draw_snapshot_table(ui, &tables.snapshot);
                ui.add_space(SECTION_SPACING);
            });
    }
}
