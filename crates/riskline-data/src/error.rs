//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading price data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Source could not be read or holds no usable rows
    #[error("Missing data in {table}: {reason}")]
    MissingData {
        /// Description of the tabular source
        table: String,
        /// Reason the data is missing
        reason: String,
    },

    /// A required column is absent
    #[error("Missing column '{column}' in {table}")]
    MissingColumn {
        /// Description of the tabular source
        table: String,
        /// Name of the missing column
        column: String,
    },

    /// A date cell could not be parsed
    #[error("Invalid date '{value}' at row {row} in {table}")]
    InvalidDate {
        /// Description of the tabular source
        table: String,
        /// One-based data row
        row: usize,
        /// Raw cell contents
        value: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Returns true when the error means the input itself is unusable
    /// (absent file, absent column, empty table).
    pub const fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. } | Self::MissingColumn { .. })
    }
}
