//! Dashboard Configuration
//! Compiled-in defaults for the data source and the dashboard views.

use std::path::PathBuf;

/// Default CSV file, resolved against the working directory.
pub const DEFAULT_CSV_PATH: &str = "smoking.csv";

/// Countries pre-selected in the filter panel when present in the data.
pub const DEFAULT_COUNTRIES: [&str; 3] = ["Lebanon", "France", "United States"];

/// Row counts offered by the raw data table.
pub const SNAPSHOT_SIZES: [usize; 2] = [50, 100];

/// Dashboard settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    pub default_countries: Vec<String>,
    pub snapshot_rows: usize,
    pub top_n: usize,
    pub live_variation: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            default_countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            snapshot_rows: SNAPSHOT_SIZES[0],
            top_n: 10,
            live_variation: true,
        }
    }
}

impl DashboardConfig {
    /// Initial country selection: configured defaults that exist in the
    /// data, or every country when none of them do.
    pub fn initial_countries(&self, available: &[String]) -> Vec<String> {
        let picked: Vec<String> = available
            .iter()
            .filter(|c| self.default_countries.contains(c))
            .cloned()
            .collect();

        if picked.is_empty() {
            available.to_vec()
        } else {
            picked
        }
    }
}
