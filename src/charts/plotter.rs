//! Chart Plotter Module
//! Draws the dashboard charts with egui_plot.

use super::{reds, MapLayer};
use crate::data::{Gender, GenderRate, PrevalenceColumn, YearMean};
use crate::stats::{BoxSummary, Kpis};
use egui::{Color32, RichText};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};
use polars::prelude::{AnyValue, DataFrame};
use std::collections::HashMap;

pub const MALE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const FEMALE_COLOR: Color32 = Color32::from_rgb(233, 30, 99); // Pink
pub const TREND_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const BAR_COLOR: Color32 = Color32::from_rgb(203, 24, 29);

const CHART_HEIGHT: f32 = 280.0;

/// Draws the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn gender_color(gender: Gender) -> Color32 {
        match gender {
            Gender::Male => MALE_COLOR,
            Gender::Female => FEMALE_COLOR,
        }
    }

    /// Placeholder shown instead of a chart with no data.
    pub fn empty_state(ui: &mut egui::Ui, message: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(message).size(14.0).color(Color32::GRAY));
                });
            });
    }

    /// Calculate beeswarm positions for points with duplicate values.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        // Round values and find duplicates
        let precision = 1e6;
        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();

        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Three metric cards: average total, male and female rate.
    pub fn draw_kpi_cards(ui: &mut egui::Ui, kpis: &Kpis) {
        ui.columns(3, |columns| {
            for (ui, column) in columns.iter_mut().zip(PrevalenceColumn::ALL) {
                let title = match column {
                    PrevalenceColumn::Total => "Avg. Smoking Rate (%)".to_string(),
                    other => format!("Avg. {} Smoking Rate (%)", other.label()),
                };
                let value = kpis
                    .get(column)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "–".to_string());

                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(28.0).strong());
                    });
            }
        });
    }

    /// Box plot per gender with the individual rates overlaid.
    pub fn draw_gender_boxplot(
        ui: &mut egui::Ui,
        summaries: &[(Gender, BoxSummary)],
        rates: &[GenderRate],
    ) {
        if summaries.is_empty() {
            Self::empty_state(ui, "No gender data for this selection");
            return;
        }

        let labels: Vec<String> = summaries.iter().map(|(g, _)| g.to_string()).collect();

        Plot::new("gender_boxplot")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Gender")
            .y_axis_label("Rate (%)")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (gender, summary)) in summaries.iter().enumerate() {
                    let color = Self::gender_color(*gender);
                    let x = i as f64;

                    let elem = BoxElem::new(
                        x,
                        BoxSpread::new(
                            summary.min,
                            summary.q1,
                            summary.median,
                            summary.q3,
                            summary.max,
                        ),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(gender.as_str()));

                    let values: Vec<f64> = rates
                        .iter()
                        .filter(|r| r.gender == *gender)
                        .map(|r| r.rate)
                        .collect();
                    let xs = Self::beeswarm_positions(&values, x, 0.35);
                    let points: PlotPoints =
                        xs.iter().zip(&values).map(|(&x, &y)| [x, y]).collect();

                    plot_ui.points(
                        Points::new(points)
                            .radius(2.5)
                            .color(color.gamma_multiply(0.7))
                            .name(gender.as_str()),
                    );
                }
            });
    }

    /// Average rate per year as a line with markers.
    pub fn draw_trend_chart(ui: &mut egui::Ui, trend: &[YearMean]) {
        if trend.is_empty() {
            Self::empty_state(ui, "No yearly data for this selection");
            return;
        }

        let points: Vec<[f64; 2]> = trend.iter().map(|t| [t.year as f64, t.mean]).collect();

        Plot::new("trend_chart")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("Avg. Rate (%)")
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract().abs() < 1e-6 {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(TREND_COLOR)
                        .width(2.0)
                        .name("Average"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(TREND_COLOR),
                );
            });
    }

    /// Bar chart of the highest country averages.
    pub fn draw_top_countries_chart(ui: &mut egui::Ui, top: &[(String, f64)]) {
        if top.is_empty() {
            Self::empty_state(ui, "No countries in this selection");
            return;
        }

        let labels: Vec<String> = top.iter().map(|(c, _)| c.clone()).collect();
        let bars: Vec<Bar> = top
            .iter()
            .enumerate()
            .map(|(i, (country, mean))| {
                Bar::new(i as f64, *mean)
                    .width(0.6)
                    .fill(BAR_COLOR)
                    .name(format!("{country}: {mean:.2}%"))
            })
            .collect();

        Plot::new("top_countries_chart")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .allow_drag(false)
            .y_axis_label("Avg. Rate (%)")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Top countries"));
            });
    }

    /// Country centroids on a longitude/latitude plane, shaded by value.
    pub fn draw_map(ui: &mut egui::Ui, layer: &MapLayer) {
        if layer.is_empty() {
            Self::empty_state(ui, "No countries to map");
            return;
        }

        Plot::new("choropleth_map")
            .height(CHART_HEIGHT + 60.0)
            .data_aspect(1.0)
            .allow_scroll(false)
            .include_x(-180.0)
            .include_x(180.0)
            .include_y(-60.0)
            .include_y(85.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(ui, |plot_ui| {
                for region in &layer.regions {
                    let [r, g, b] = region.color;
                    plot_ui.points(
                        Points::new(vec![[region.location.lon, region.location.lat]])
                            .radius(7.0)
                            .filled(true)
                            .color(Color32::from_rgb(r, g, b))
                            .name(format!(
                                "{} ({}): {:.2}%",
                                region.country, region.location.iso3, region.value
                            )),
                    );
                }
            });

        Self::draw_color_scale(ui, layer.min, layer.max);
    }

    /// Horizontal Reds gradient labelled with the layer range.
    fn draw_color_scale(ui: &mut egui::Ui, min: f64, max: f64) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{min:.1}%")).size(11.0));

            let (rect, _) = ui.allocate_exact_size(egui::vec2(200.0, 12.0), egui::Sense::hover());
            let steps = 40;
            let step_width = rect.width() / steps as f32;
            for i in 0..steps {
                let [r, g, b] = reds(i as f64 / (steps - 1) as f64);
                let x = rect.left() + i as f32 * step_width;
                let cell = egui::Rect::from_min_size(
                    egui::pos2(x, rect.top()),
                    egui::vec2(step_width + 0.5, rect.height()),
                );
                ui.painter().rect_filled(cell, 0.0, Color32::from_rgb(r, g, b));
            }

            ui.label(RichText::new(format!("{max:.1}%")).size(11.0));
        });
    }

    /// Raw rows of the filtered view.
    pub fn draw_snapshot_table(ui: &mut egui::Ui, df: &DataFrame) {
        if df.height() == 0 {
            Self::empty_state(ui, "No rows match the current filters");
            return;
        }

        let columns = df.get_columns();

        egui::ScrollArea::both()
            .id_salt("snapshot_scroll")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("snapshot_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for column in columns {
                            ui.label(RichText::new(column.name().as_str()).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in 0..df.height() {
                            for column in columns {
                                let text = column
                                    .get(row)
                                    .map(Self::format_cell)
                                    .unwrap_or_default();
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn format_cell(value: AnyValue) -> String {
        match value {
            AnyValue::Null => String::new(),
            AnyValue::Float64(v) => format!("{v:.2}"),
            AnyValue::Float32(v) => format!("{v:.2}"),
            other => other.to_string().trim_matches('"').to_string(),
        }
    }
}
