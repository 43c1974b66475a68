//! CSV Data Loader Module
//! Loads the smoking statistics file once and caches the result.

use super::{PrevalenceColumn, COUNTRY, REQUIRED_COLUMNS, YEAR};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("No usable rows in {}: every row lacks a country or year", .0.display())]
    Malformed(PathBuf),
}

static SHARED: OnceLock<DataLoader> = OnceLock::new();

/// Loads the dataset with Polars and keeps the first successful result.
///
/// The cached frame is never handed out mutably; every downstream
/// operation produces a new frame.
pub struct DataLoader {
    path: PathBuf,
    cache: OnceLock<DataFrame>,
}

impl DataLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    /// Process-wide loader. The path of the first call wins.
    pub fn shared(path: &Path) -> &'static DataLoader {
        SHARED.get_or_init(|| DataLoader::new(path))
    }

    /// Load the dataset, reading the file only on the first successful call.
    pub fn load(&self) -> Result<&DataFrame, LoaderError> {
        if let Some(df) = self.cache.get() {
            return Ok(df);
        }

        let df = Self::read_csv(&self.path)?;
        Ok(self.cache.get_or_init(|| df))
    }

    /// Read and normalise a CSV file.
    ///
    /// `Year` becomes Int64, `Country` String and the prevalence columns
    /// Float64. Rows without a country or year are dropped. Values of `Year`
    /// or `Data.Percentage.Total` that do not parse fail the load.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let raw = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let columns: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !columns.iter().any(|c| c == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        let mut casts = vec![
            col(COUNTRY).cast(DataType::String),
            col(YEAR).strict_cast(DataType::Int64),
        ];
        for column in PrevalenceColumn::ALL {
            if column == PrevalenceColumn::Total {
                casts.push(col(column.name()).strict_cast(DataType::Float64));
            } else if columns.iter().any(|c| c == column.name()) {
                casts.push(col(column.name()).cast(DataType::Float64));
            }
        }

        let raw_rows = raw.height();
        let df = raw
            .lazy()
            .with_columns(casts)
            .filter(col(COUNTRY).is_not_null().and(col(YEAR).is_not_null()))
            .collect()?;

        if raw_rows > 0 && df.height() == 0 {
            return Err(LoaderError::Malformed(path.to_path_buf()));
        }

        info!(
            "Loaded {} rows, {} columns from {} ({} rows without country/year dropped)",
            df.height(),
            df.width(),
            path.display(),
            raw_rows - df.height()
        );

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SAMPLE: &str = "\
Country,Year,Data.Percentage.Total,Data.Percentage.Male,Data.Percentage.Female
France,2000,25.5,30.0,21.0
France,2001,24.0,29.0,19.5
Lebanon,2000,33.0,40.0,26.0
,2001,10.0,12.0,8.0
Chad,,11.0,18.0,4.0
";

    #[test]
    fn reads_and_normalises_columns() {
        let file = write_csv(SAMPLE);
        let df = DataLoader::read_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column(YEAR).unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column(COUNTRY).unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("Data.Percentage.Total").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn drops_rows_without_country_or_year() {
        let file = write_csv(SAMPLE);
        let df = DataLoader::read_csv(file.path()).unwrap();

        let countries: Vec<&str> = df
            .column(COUNTRY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(countries, vec!["France", "France", "Lebanon"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DataLoader::new("/definitely/not/here/smoking.csv")
            .load()
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn missing_required_columns_is_an_error() {
        let file = write_csv("Country,Data.Percentage.Male\nFrance,30.0\n");
        let err = DataLoader::read_csv(file.path()).unwrap_err();
        match err {
            LoaderError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Year".to_string(), "Data.Percentage.Total".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_values_are_an_error() {
        let file = write_csv("Country,Year,Data.Percentage.Total\nFrance,abc,twenty\nChad,xyz,foo\n");
        assert!(DataLoader::read_csv(file.path()).is_err());
    }

    #[test]
    fn file_without_usable_rows_is_malformed() {
        let file = write_csv("Country,Year,Data.Percentage.Total\n,2000,25.0\n,2001,24.0\n");
        let err = DataLoader::read_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
    }

    #[test]
    fn shared_loader_keeps_the_first_path() {
        let file = write_csv(SAMPLE);
        let first = DataLoader::shared(file.path());
        let second = DataLoader::shared(Path::new("/definitely/not/here/smoking.csv"));

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.load().unwrap().height(), 3);
        assert!(std::ptr::eq(first.load().unwrap(), second.load().unwrap()));
    }

    #[test]
    fn optional_gender_columns_may_be_absent() {
        let file = write_csv("Country,Year,Data.Percentage.Total\nFrance,2000,25.0\n");
        let df = DataLoader::read_csv(file.path()).unwrap();
        assert_eq!(df.height(), 1);
        assert!(df.column("Data.Percentage.Male").is_err());
    }

    #[test]
    fn load_is_cached_after_first_success() {
        let file = write_csv(SAMPLE);
        let path = file.path().to_path_buf();
        let loader = DataLoader::new(&path);

        let first = loader.load().unwrap().height();
        drop(file);
        assert!(!path.exists());

        let second = loader.load().unwrap();
        assert_eq!(second.height(), first);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoking.csv");
        let loader = DataLoader::new(&path);
        assert!(loader.load().is_err());

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(loader.load().unwrap().height(), 3);
    }
}
