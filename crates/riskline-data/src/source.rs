//! Tabular sources of price data.
//!
//! A [`TabularSource`] yields a polars [`DataFrame`] with a `Date` column and
//! one or more price columns. CSV files are read with every column as text so
//! that date and number parsing stays under the loader's control.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// A source of tabular price data.
pub trait TabularSource: fmt::Debug {
    /// Human-readable description used in errors and logs.
    fn describe(&self) -> String;

    /// Read the whole table into memory.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingData`] if the source cannot be read.
    fn read_frame(&self) -> Result<DataFrame>;
}

/// CSV file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    /// Create a source for the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl TabularSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_frame(&self) -> Result<DataFrame> {
        if !self.exists() {
            return Err(DataError::MissingData {
                table: self.describe(),
                reason: "file not found".to_string(),
            });
        }

        LazyCsvReader::new(&self.path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(LazyFrame::collect)
            .map_err(|e| DataError::MissingData {
                table: self.describe(),
                reason: e.to_string(),
            })
    }
}

/// In-memory table, mostly useful for callers that already hold a frame.
#[derive(Debug, Clone)]
pub struct FrameSource {
    name: String,
    frame: DataFrame,
}

impl FrameSource {
    /// Wrap an existing frame under a descriptive name.
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

impl TabularSource for FrameSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_frame(&self) -> Result<DataFrame> {
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_csv_is_missing_data() {
        let source = CsvSource::new(std::env::temp_dir().join("riskline_does_not_exist.csv"));
        assert!(!source.exists());

        let err = source.read_frame().unwrap_err();
        assert!(err.is_missing_data());
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_csv_columns_are_read_as_text() {
        let path = std::env::temp_dir().join("riskline_source_text.csv");
        std::fs::write(&path, "Date,Close\n2024-01-02,100.5\n2024-01-03,101\n").unwrap();

        let frame = CsvSource::new(&path).read_frame().unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("Close").unwrap().dtype(), &DataType::String);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_frame_source_returns_frame() {
        let frame = df!(
            "Date" => &["2024-01-02", "2024-01-03"],
            "Close" => &[1.0, 2.0],
        )
        .unwrap();
        let source = FrameSource::new("inline", frame);

        assert_eq!(source.describe(), "inline");
        assert_eq!(source.read_frame().unwrap().height(), 2);
    }
}
