//! Statistics Calculator Module
//! Headline metrics and box-plot summaries for the dashboard.

use crate::data::{FilteredView, Gender, GenderRate, PrevalenceColumn};
use polars::prelude::ChunkAgg;
use statrs::statistics::{Data, Max, Median, Min};

/// Average prevalence over the filtered view.
///
/// A field is `None` when the view holds no value for that measure.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total: Option<f64>,
    pub male: Option<f64>,
    pub female: Option<f64>,
}

impl Kpis {
    pub fn get(&self, column: PrevalenceColumn) -> Option<f64> {
        match column {
            PrevalenceColumn::Total => self.total,
            PrevalenceColumn::Male => self.male,
            PrevalenceColumn::Female => self.female,
        }
    }
}

/// Five-number summary of one distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Handles statistical calculations over filtered views.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Mean of each prevalence column, reading live columns when present.
    pub fn compute_kpis(view: &FilteredView) -> Kpis {
        let mean = |column| view.values(column).and_then(|ca| ca.mean());
        Kpis {
            total: mean(PrevalenceColumn::Total),
            male: mean(PrevalenceColumn::Male),
            female: mean(PrevalenceColumn::Female),
        }
    }

    /// Box summary of a sample. NaN values are ignored.
    ///
    /// Quartiles use linear interpolation between order statistics
    /// (type 7), so q1 of `[1, 2, 3, 4, 5]` is 2.
    pub fn compute_box_summary(values: &[f64]) -> Option<BoxSummary> {
        let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if clean.is_empty() {
            return None;
        }
        clean.sort_by(f64::total_cmp);

        let count = clean.len();
        let q1 = Self::percentile(&clean, 25.0);
        let q3 = Self::percentile(&clean, 75.0);
        let data = Data::new(clean);
        Some(BoxSummary {
            count,
            min: data.min(),
            q1,
            median: data.median(),
            q3,
            max: data.max(),
        })
    }

    /// Linearly interpolated percentile of sorted, non-empty values.
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }

    /// Box summary per gender, skipping genders without data.
    pub fn gender_summaries(rates: &[GenderRate]) -> Vec<(Gender, BoxSummary)> {
        Gender::ALL
            .iter()
            .filter_map(|&gender| {
                let values: Vec<f64> = rates
                    .iter()
                    .filter(|r| r.gender == gender)
                    .map(|r| r.rate)
                    .collect();
                Self::compute_box_summary(&values).map(|summary| (gender, summary))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn kpis_average_each_column() {
        let df = df!(
            "Country" => ["France", "Chad"],
            "Year" => [2000i64, 2000],
            "Data.Percentage.Total" => [20.0, 10.0],
            "Data.Percentage.Male" => [Some(30.0), None],
            "Data.Percentage.Female" => [12.0, 4.0]
        )
        .unwrap();

        let kpis = StatsCalculator::compute_kpis(&FilteredView::new(df));
        assert_eq!(kpis.total, Some(15.0));
        assert_eq!(kpis.male, Some(30.0));
        assert_eq!(kpis.female, Some(8.0));
    }

    #[test]
    fn kpis_of_empty_view_are_absent() {
        let df = df!(
            "Country" => Vec::<String>::new(),
            "Year" => Vec::<i64>::new(),
            "Data.Percentage.Total" => Vec::<f64>::new()
        )
        .unwrap();

        assert_eq!(StatsCalculator::compute_kpis(&FilteredView::new(df)), Kpis::default());
    }

    #[test]
    fn box_summary_of_sample() {
        let summary = StatsCalculator::compute_box_summary(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.q3, 4.0);
    }

    #[test]
    fn quartiles_interpolate_between_values() {
        let summary = StatsCalculator::compute_box_summary(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((summary.q1 - 1.75).abs() < 1e-12);
        assert_eq!(summary.median, 2.5);
        assert!((summary.q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn box_summary_ignores_nan_and_empty() {
        assert!(StatsCalculator::compute_box_summary(&[]).is_none());
        assert!(StatsCalculator::compute_box_summary(&[f64::NAN]).is_none());

        let summary = StatsCalculator::compute_box_summary(&[f64::NAN, 7.0]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.median, 7.0);
    }

    #[test]
    fn gender_summaries_split_by_gender() {
        let rate = |gender, rate| GenderRate {
            country: "France".to_string(),
            year: 2000,
            gender,
            rate,
        };
        let rates = vec![
            rate(Gender::Male, 30.0),
            rate(Gender::Female, 20.0),
            rate(Gender::Male, 40.0),
        ];

        let summaries = StatsCalculator::gender_summaries(&rates);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].0, Gender::Male);
        assert_eq!(summaries[0].1.count, 2);
        assert_eq!(summaries[0].1.median, 35.0);
        assert_eq!(summaries[1].0, Gender::Female);
        assert_eq!(summaries[1].1.max, 20.0);
    }
}
