//! Dashboard Pipeline
//! Turns one filter selection into every table the dashboard draws.

use super::{DataProcessor, FilteredView, Gender, GenderRate, YearMean};
use crate::charts::{build_map_layer, MapError, MapLayer};
use crate::stats::{BoxSummary, Kpis, StatsCalculator};
use anyhow::{Context, Result};
use log::info;
use polars::prelude::DataFrame;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// A filter selection plus presentation options.
#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    pub years: BTreeSet<i64>,
    pub countries: BTreeSet<String>,
    pub live_variation: bool,
    pub snapshot_rows: usize,
    pub top_n: usize,
}

/// Derived tables for one request.
#[derive(Debug, Clone)]
pub struct DashboardTables {
    pub row_count: usize,
    pub kpis: Kpis,
    pub gender_rates: Vec<GenderRate>,
    pub gender_summaries: Vec<(Gender, BoxSummary)>,
    pub trend: Vec<YearMean>,
    pub country_means: BTreeMap<String, f64>,
    pub top_countries: Vec<(String, f64)>,
    pub map: Result<MapLayer, MapError>,
    pub snapshot: DataFrame,
}

impl DashboardTables {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Request/response handler over the loaded dataset.
pub struct DashboardPipeline;

impl DashboardPipeline {
    pub fn respond(dataset: &DataFrame, request: &DashboardRequest) -> Result<DashboardTables> {
        Self::respond_with_rng(dataset, request, &mut rand::thread_rng())
    }

    pub fn respond_with_rng<R: Rng>(
        dataset: &DataFrame,
        request: &DashboardRequest,
        rng: &mut R,
    ) -> Result<DashboardTables> {
        let view = DataProcessor::filter(dataset, &request.years, &request.countries)
            .context("filtering dataset")?;

        let view: FilteredView = if request.live_variation {
            DataProcessor::derive_jitter(&view, rng).context("deriving live columns")?
        } else {
            view
        };

        let kpis = StatsCalculator::compute_kpis(&view);
        let gender_rates =
            DataProcessor::melt_by_gender(&view).context("reshaping gender columns")?;
        let gender_summaries = StatsCalculator::gender_summaries(&gender_rates);
        let trend = DataProcessor::aggregate_by_year(&view).context("aggregating by year")?;
        let country_means =
            DataProcessor::aggregate_by_country(&view).context("aggregating by country")?;
        let top_countries = DataProcessor::top_countries(&country_means, request.top_n);
        let map = build_map_layer(&country_means);
        let snapshot = DataProcessor::snapshot(&view, request.snapshot_rows);

        if view.is_empty() {
            info!(
                "Selection of {} year(s) x {} country(ies) matched no rows",
                request.years.len(),
                request.countries.len()
            );
        } else {
            info!(
                "Selection of {} year(s) x {} country(ies) matched {} rows",
                request.years.len(),
                request.countries.len(),
                view.height()
            );
        }

        Ok(DashboardTables {
            row_count: view.height(),
            kpis,
            gender_rates,
            gender_summaries,
            trend,
            country_means,
            top_countries,
            map,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset() -> DataFrame {
        df!(
            "Country" => ["France", "France", "Lebanon", "Atlantis"],
            "Year" => [2000i64, 2001, 2000, 2000],
            "Data.Percentage.Total" => [20.0, 30.0, 40.0, 5.0],
            "Data.Percentage.Male" => [25.0, 35.0, 50.0, 6.0],
            "Data.Percentage.Female" => [15.0, 25.0, 30.0, 4.0]
        )
        .unwrap()
    }

    fn request(countries: &[&str], live: bool) -> DashboardRequest {
        DashboardRequest {
            years: [2000, 2001].into_iter().collect(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            live_variation: live,
            snapshot_rows: 50,
            top_n: 10,
        }
    }

    #[test]
    fn builds_every_table() {
        let tables =
            DashboardPipeline::respond(&dataset(), &request(&["France", "Lebanon"], false))
                .unwrap();

        assert_eq!(tables.row_count, 3);
        assert_eq!(tables.kpis.total, Some(30.0));
        assert_eq!(tables.gender_rates.len(), 6);
        assert_eq!(tables.gender_summaries.len(), 2);
        assert_eq!(
            tables.trend,
            vec![
                YearMean { year: 2000, mean: 30.0 },
                YearMean { year: 2001, mean: 30.0 },
            ]
        );
        assert_eq!(tables.country_means["France"], 25.0);
        assert_eq!(tables.top_countries[0], ("Lebanon".to_string(), 40.0));
        assert_eq!(tables.map.as_ref().unwrap().regions.len(), 2);
        assert_eq!(tables.snapshot.height(), 3);
    }

    #[test]
    fn unknown_country_only_drops_the_map() {
        let tables =
            DashboardPipeline::respond(&dataset(), &request(&["France", "Atlantis"], false))
                .unwrap();

        assert!(tables.map.is_err());
        assert_eq!(tables.row_count, 3);
        assert_eq!(tables.country_means.len(), 2);
    }

    #[test]
    fn empty_selection_is_not_an_error() {
        let tables = DashboardPipeline::respond(&dataset(), &request(&[], true)).unwrap();

        assert!(tables.is_empty());
        assert_eq!(tables.kpis, Kpis::default());
        assert!(tables.trend.is_empty());
        assert!(tables.country_means.is_empty());
        assert!(tables.top_countries.is_empty());
        assert!(tables.gender_summaries.is_empty());
        assert!(tables.map.unwrap().is_empty());
        assert_eq!(tables.snapshot.height(), 0);
    }

    #[test]
    fn live_variation_stays_near_source() {
        let mut rng = StdRng::seed_from_u64(42);
        let tables =
            DashboardPipeline::respond_with_rng(&dataset(), &request(&["Lebanon"], true), &mut rng)
                .unwrap();

        let total = tables.kpis.total.unwrap();
        assert!((38.0..=42.0).contains(&total));
        assert!(tables.snapshot.column("Data.Percentage.Total.Live").is_ok());
    }

    #[test]
    fn dataset_is_left_untouched() {
        let df = dataset();
        let before = df.clone();
        DashboardPipeline::respond(&df, &request(&["France"], true)).unwrap();
        assert!(df.equals_missing(&before));
        assert!(df.column("Data.Percentage.Total.Live").is_err());
    }
}
