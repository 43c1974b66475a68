//! Data module - CSV loading, filtering and aggregation

mod loader;
mod pipeline;
mod processor;

pub use loader::DataLoader;
pub use pipeline::{DashboardPipeline, DashboardRequest, DashboardTables};
pub use processor::{DataProcessor, FilteredView, Gender, GenderRate, YearMean};

pub const COUNTRY: &str = "Country";
pub const YEAR: &str = "Year";

/// Columns every source file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [COUNTRY, YEAR, "Data.Percentage.Total"];

/// Prevalence columns of the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrevalenceColumn {
    Total,
    Male,
    Female,
}

impl PrevalenceColumn {
    pub const ALL: [PrevalenceColumn; 3] = [
        PrevalenceColumn::Total,
        PrevalenceColumn::Male,
        PrevalenceColumn::Female,
    ];

    /// Column name in the source file.
    pub fn name(self) -> &'static str {
        match self {
            PrevalenceColumn::Total => "Data.Percentage.Total",
            PrevalenceColumn::Male => "Data.Percentage.Male",
            PrevalenceColumn::Female => "Data.Percentage.Female",
        }
    }

    /// Name of the jittered copy of this column.
    pub fn live_name(self) -> &'static str {
        match self {
            PrevalenceColumn::Total => "Data.Percentage.Total.Live",
            PrevalenceColumn::Male => "Data.Percentage.Male.Live",
            PrevalenceColumn::Female => "Data.Percentage.Female.Live",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrevalenceColumn::Total => "Total",
            PrevalenceColumn::Male => "Male",
            PrevalenceColumn::Female => "Female",
        }
    }
}
