//! Data Processor Module
//! Filtering, live variation, aggregation and gender reshaping.

use super::{PrevalenceColumn, COUNTRY, YEAR};
use log::debug;
use polars::prelude::*;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Bounds of the multiplicative live variation.
pub const JITTER_RANGE: (f64, f64) = (0.95, 1.05);

const MEAN_COLUMN: &str = "mean";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Rows of the dataset matching a filter selection.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub df: DataFrame,
    /// Whether `.Live` columns were derived for this view.
    pub live: bool,
}

impl FilteredView {
    pub fn new(df: DataFrame) -> Self {
        Self { df, live: false }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Column to read for a prevalence measure: the live copy when present.
    pub fn value_column(&self, column: PrevalenceColumn) -> &'static str {
        if self.live && self.df.column(column.live_name()).is_ok() {
            column.live_name()
        } else {
            column.name()
        }
    }

    /// Values of a prevalence column, `None` when the column is absent.
    pub fn values(&self, column: PrevalenceColumn) -> Option<&Float64Chunked> {
        self.df
            .column(self.value_column(column))
            .ok()
            .and_then(|c| c.f64().ok())
    }
}

/// Mean prevalence for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMean {
    pub year: i64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn column(self) -> PrevalenceColumn {
        match self {
            Gender::Male => PrevalenceColumn::Male,
            Gender::Female => PrevalenceColumn::Female,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the long-form gender table.
#[derive(Debug, Clone, PartialEq)]
pub struct GenderRate {
    pub country: String,
    pub year: i64,
    pub gender: Gender,
    pub rate: f64,
}

/// Stateless operations over the loaded dataset.
pub struct DataProcessor;

impl DataProcessor {
    /// Sorted distinct years.
    pub fn distinct_years(df: &DataFrame) -> Result<Vec<i64>, ProcessorError> {
        let years: BTreeSet<i64> = df.column(YEAR)?.i64()?.into_iter().flatten().collect();
        Ok(years.into_iter().collect())
    }

    /// Sorted distinct countries.
    pub fn distinct_countries(df: &DataFrame) -> Result<Vec<String>, ProcessorError> {
        let countries: BTreeSet<String> = df
            .column(COUNTRY)?
            .str()?
            .into_iter()
            .flatten()
            .map(|c| c.to_string())
            .collect();
        Ok(countries.into_iter().collect())
    }

    /// Keep rows whose year and country are both selected.
    pub fn filter(
        df: &DataFrame,
        years: &BTreeSet<i64>,
        countries: &BTreeSet<String>,
    ) -> Result<FilteredView, ProcessorError> {
        let year_ca = df.column(YEAR)?.i64()?;
        let country_ca = df.column(COUNTRY)?.str()?;

        let mask: BooleanChunked = year_ca
            .into_iter()
            .zip(country_ca)
            .map(|(year, country)| match (year, country) {
                (Some(y), Some(c)) => years.contains(&y) && countries.contains(c),
                _ => false,
            })
            .collect();

        Ok(FilteredView::new(df.filter(&mask)?))
    }

    /// Scale each prevalence column by its own uniform factor in
    /// [`JITTER_RANGE`], writing the result to the `.Live` columns.
    pub fn derive_jitter<R: Rng>(
        view: &FilteredView,
        rng: &mut R,
    ) -> Result<FilteredView, ProcessorError> {
        let mut exprs = Vec::new();

        for column in PrevalenceColumn::ALL {
            let scale: f64 = rng.gen_range(JITTER_RANGE.0..=JITTER_RANGE.1);
            if view.df.column(column.name()).is_err() {
                continue;
            }
            debug!("{} scaled by {:.4}", column.label(), scale);
            exprs.push((col(column.name()) * lit(scale)).alias(column.live_name()));
        }

        let df = view.df.clone().lazy().with_columns(exprs).collect()?;
        Ok(FilteredView { df, live: true })
    }

    /// Mean total prevalence per year, ascending by year.
    pub fn aggregate_by_year(view: &FilteredView) -> Result<Vec<YearMean>, ProcessorError> {
        let grouped = Self::mean_by(view, YEAR)?;
        let years = grouped.column(YEAR)?.i64()?;
        let means = grouped.column(MEAN_COLUMN)?.f64()?;

        Ok(years
            .into_iter()
            .zip(means)
            .filter_map(|(year, mean)| Some(YearMean { year: year?, mean: mean? }))
            .collect())
    }

    /// Mean total prevalence per country.
    pub fn aggregate_by_country(
        view: &FilteredView,
    ) -> Result<BTreeMap<String, f64>, ProcessorError> {
        let grouped = Self::mean_by(view, COUNTRY)?;
        let countries = grouped.column(COUNTRY)?.str()?;
        let means = grouped.column(MEAN_COLUMN)?.f64()?;

        Ok(countries
            .into_iter()
            .zip(means)
            .filter_map(|(country, mean)| Some((country?.to_string(), mean?)))
            .collect())
    }

    /// Highest `n` country means, descending. Ties are ordered by name.
    pub fn top_countries(means: &BTreeMap<String, f64>, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> =
            means.iter().map(|(c, m)| (c.clone(), *m)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Reshape the male and female columns into one row per gender.
    pub fn melt_by_gender(view: &FilteredView) -> Result<Vec<GenderRate>, ProcessorError> {
        let countries = view.df.column(COUNTRY)?.str()?;
        let years = view.df.column(YEAR)?.i64()?;
        let rates: Vec<(Gender, &Float64Chunked)> = Gender::ALL
            .iter()
            .filter_map(|&g| view.values(g.column()).map(|ca| (g, ca)))
            .collect();

        let mut rows = Vec::with_capacity(view.height() * rates.len());
        for i in 0..view.height() {
            let (Some(country), Some(year)) = (countries.get(i), years.get(i)) else {
                continue;
            };
            for (gender, ca) in &rates {
                if let Some(rate) = ca.get(i) {
                    if !rate.is_nan() {
                        rows.push(GenderRate {
                            country: country.to_string(),
                            year,
                            gender: *gender,
                            rate,
                        });
                    }
                }
            }
        }

        Ok(rows)
    }

    /// First `n` rows of the view for the raw table.
    pub fn snapshot(view: &FilteredView, n: usize) -> DataFrame {
        view.df.head(Some(n))
    }

    fn mean_by(view: &FilteredView, key: &str) -> Result<DataFrame, ProcessorError> {
        let value = view.value_column(PrevalenceColumn::Total);
        let grouped = view
            .df
            .clone()
            .lazy()
            .group_by([col(key)])
            .agg([col(value).mean().alias(MEAN_COLUMN)])
            .sort([key], SortMultipleOptions::default())
            .collect()?;
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> DataFrame {
        df!(
            "Country" => ["France", "France", "Lebanon", "Lebanon", "Chad"],
            "Year" => [2000i64, 2001, 2000, 2001, 2000],
            "Data.Percentage.Total" => [25.0, 24.0, 33.0, 31.0, 11.0],
            "Data.Percentage.Male" => [Some(30.0), Some(29.0), Some(40.0), None, Some(18.0)],
            "Data.Percentage.Female" => [20.0, 19.0, 26.0, 24.0, 4.0]
        )
        .unwrap()
    }

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    fn countries(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn distinct_values_are_sorted() {
        let df = sample();
        assert_eq!(DataProcessor::distinct_years(&df).unwrap(), vec![2000, 2001]);
        assert_eq!(
            DataProcessor::distinct_countries(&df).unwrap(),
            vec!["Chad", "France", "Lebanon"]
        );
    }

    #[test]
    fn filter_keeps_only_selected_rows() {
        let df = sample();
        let view =
            DataProcessor::filter(&df, &set(&[2000]), &countries(&["France", "Chad"])).unwrap();

        let rows: Vec<(String, i64)> = view
            .df
            .column(COUNTRY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .zip(view.df.column(YEAR).unwrap().i64().unwrap())
            .map(|(c, y)| (c.unwrap().to_string(), y.unwrap()))
            .collect();

        assert_eq!(
            rows,
            vec![("France".to_string(), 2000), ("Chad".to_string(), 2000)]
        );
    }

    #[test]
    fn filter_with_everything_selected_is_identity() {
        let df = sample();
        let years: BTreeSet<i64> = DataProcessor::distinct_years(&df)
            .unwrap()
            .into_iter()
            .collect();
        let all: BTreeSet<String> = DataProcessor::distinct_countries(&df)
            .unwrap()
            .into_iter()
            .collect();

        let view = DataProcessor::filter(&df, &years, &all).unwrap();
        assert!(view.df.equals_missing(&df));
    }

    #[test]
    fn filter_without_matches_is_empty() {
        let df = sample();
        let view = DataProcessor::filter(&df, &set(&[1990]), &countries(&["France"])).unwrap();
        assert!(view.is_empty());
        assert!(DataProcessor::aggregate_by_year(&view).unwrap().is_empty());
        assert!(DataProcessor::aggregate_by_country(&view).unwrap().is_empty());
        assert!(DataProcessor::melt_by_gender(&view).unwrap().is_empty());
    }

    #[test]
    fn filter_does_not_touch_source() {
        let df = sample();
        let before = df.clone();
        let view = DataProcessor::filter(&df, &set(&[2001]), &countries(&["Lebanon"])).unwrap();
        let _ = DataProcessor::derive_jitter(&view, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn aggregate_by_year_averages_and_sorts() {
        let df = df!(
            "Country" => ["A", "B", "C"],
            "Year" => [2001i64, 2000, 2000],
            "Data.Percentage.Total" => [10.0, 20.0, 30.0]
        )
        .unwrap();
        let view = FilteredView::new(df);

        assert_eq!(
            DataProcessor::aggregate_by_year(&view).unwrap(),
            vec![
                YearMean { year: 2000, mean: 25.0 },
                YearMean { year: 2001, mean: 10.0 },
            ]
        );
    }

    #[test]
    fn aggregate_by_country_averages() {
        let view = FilteredView::new(sample());
        let means = DataProcessor::aggregate_by_country(&view).unwrap();

        assert_eq!(means.len(), 3);
        assert_eq!(means["France"], 24.5);
        assert_eq!(means["Lebanon"], 32.0);
        assert_eq!(means["Chad"], 11.0);
    }

    #[test]
    fn top_countries_descending_and_truncated() {
        let view = FilteredView::new(sample());
        let means = DataProcessor::aggregate_by_country(&view).unwrap();

        assert_eq!(
            DataProcessor::top_countries(&means, 2),
            vec![("Lebanon".to_string(), 32.0), ("France".to_string(), 24.5)]
        );
        assert_eq!(DataProcessor::top_countries(&means, 10).len(), 3);
    }

    #[test]
    fn melt_single_row() {
        let df = df!(
            "Country" => ["France"],
            "Year" => [2000i64],
            "Data.Percentage.Total" => [25.0],
            "Data.Percentage.Male" => [30.0],
            "Data.Percentage.Female" => [20.0]
        )
        .unwrap();
        let rows = DataProcessor::melt_by_gender(&FilteredView::new(df)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            (rows[0].country.as_str(), rows[0].year, rows[0].gender.as_str(), rows[0].rate),
            ("France", 2000, "Male", 30.0)
        );
        assert_eq!(
            (rows[1].country.as_str(), rows[1].year, rows[1].gender.as_str(), rows[1].rate),
            ("France", 2000, "Female", 20.0)
        );
    }

    #[test]
    fn melt_skips_missing_rates() {
        let rows = DataProcessor::melt_by_gender(&FilteredView::new(sample())).unwrap();
        // one null male rate among five rows
        assert_eq!(rows.len(), 9);
        assert!(rows
            .iter()
            .all(|r| !(r.country == "Lebanon" && r.year == 2001 && r.gender == Gender::Male)));
    }

    #[test]
    fn melt_without_gender_columns_is_empty() {
        let df = df!(
            "Country" => ["France"],
            "Year" => [2000i64],
            "Data.Percentage.Total" => [25.0]
        )
        .unwrap();
        assert!(DataProcessor::melt_by_gender(&FilteredView::new(df))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let view = FilteredView::new(sample());
        for seed in 0..20 {
            let live = DataProcessor::derive_jitter(&view, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(live.live);

            for column in PrevalenceColumn::ALL {
                let source = view.df.column(column.name()).unwrap().f64().unwrap();
                let jittered = live.df.column(column.live_name()).unwrap().f64().unwrap();

                for (v, j) in source.into_iter().zip(jittered) {
                    match (v, j) {
                        (Some(v), Some(j)) => {
                            assert!(j >= v * JITTER_RANGE.0 - 1e-9, "{j} below {v}");
                            assert!(j <= v * JITTER_RANGE.1 + 1e-9, "{j} above {v}");
                        }
                        (None, None) => {}
                        other => panic!("null mismatch: {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn jitter_uses_one_scale_per_column() {
        let view = FilteredView::new(sample());
        let live = DataProcessor::derive_jitter(&view, &mut StdRng::seed_from_u64(7)).unwrap();

        let source = view.df.column("Data.Percentage.Total").unwrap().f64().unwrap();
        let jittered = live
            .df
            .column("Data.Percentage.Total.Live")
            .unwrap()
            .f64()
            .unwrap();
        let ratios: Vec<f64> = source
            .into_iter()
            .zip(jittered)
            .map(|(v, j)| j.unwrap() / v.unwrap())
            .collect();

        assert!(ratios.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-12));
    }

    #[test]
    fn aggregates_read_live_columns() {
        let view = FilteredView::new(sample());
        let live = DataProcessor::derive_jitter(&view, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(
            live.value_column(PrevalenceColumn::Total),
            "Data.Percentage.Total.Live"
        );

        let plain = DataProcessor::aggregate_by_year(&view).unwrap();
        let jittered = DataProcessor::aggregate_by_year(&live).unwrap();
        assert_eq!(plain.len(), jittered.len());
        for (p, j) in plain.iter().zip(&jittered) {
            assert_eq!(p.year, j.year);
            assert!(j.mean >= p.mean * JITTER_RANGE.0 - 1e-9);
            assert!(j.mean <= p.mean * JITTER_RANGE.1 + 1e-9);
        }
    }

    #[test]
    fn snapshot_truncates() {
        let view = FilteredView::new(sample());
        assert_eq!(DataProcessor::snapshot(&view, 2).height(), 2);
        assert_eq!(DataProcessor::snapshot(&view, 50).height(), 5);
    }
}
