//! Schema validation for price tables.
//!
//! Every price table carries a [`DATE_COLUMN`] and at least one price column.
//! Which price column is used is decided here, up front, and reported as a
//! typed [`ColumnResolution`] instead of being guessed at read time.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the date column every price table must carry.
pub const DATE_COLUMN: &str = "Date";

/// Date-only layouts accepted by [`parse_date`], tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Date-time layouts accepted by [`parse_date`]; the time part is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// How the price column should be picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Use the named column, falling back to the last non-date column.
    Named(String),
    /// Use the first non-date column.
    First,
}

/// Outcome of price column resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnResolution {
    /// The configured column was present.
    Named(String),
    /// The configured column was absent and the last column was used instead.
    Fallback {
        /// Column that was asked for
        requested: String,
        /// Column that was used
        used: String,
    },
    /// The column was picked by position.
    Positional(String),
}

impl ColumnResolution {
    /// Name of the column that was actually read.
    pub fn column(&self) -> &str {
        match self {
            Self::Named(name) | Self::Positional(name) => name,
            Self::Fallback { used, .. } => used,
        }
    }

    /// Whether the configured column was missing.
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl fmt::Display for ColumnResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "'{}'", name),
            Self::Fallback { requested, used } => {
                write!(f, "'{}' (fallback, '{}' not found)", used, requested)
            }
            Self::Positional(name) => write!(f, "'{}' (first column)", name),
        }
    }
}

/// Validate the frame's schema and pick its price column.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`] if the date column is absent, or if
/// the frame has no column besides the date column.
pub fn resolve_price_column(
    frame: &DataFrame,
    selector: &ColumnSelector,
    table: &str,
) -> Result<ColumnResolution> {
    let names: Vec<&str> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();

    if !names.contains(&DATE_COLUMN) {
        return Err(DataError::MissingColumn {
            table: table.to_string(),
            column: DATE_COLUMN.to_string(),
        });
    }

    let candidates: Vec<&str> = names
        .into_iter()
        .filter(|name| *name != DATE_COLUMN)
        .collect();

    let missing = |column: &str| DataError::MissingColumn {
        table: table.to_string(),
        column: column.to_string(),
    };

    match selector {
        ColumnSelector::Named(requested) => {
            if candidates.contains(&requested.as_str()) {
                Ok(ColumnResolution::Named(requested.clone()))
            } else {
                candidates
                    .last()
                    .map(|used| ColumnResolution::Fallback {
                        requested: requested.clone(),
                        used: (*used).to_string(),
                    })
                    .ok_or_else(|| missing(requested))
            }
        }
        ColumnSelector::First => candidates
            .first()
            .map(|name| ColumnResolution::Positional((*name).to_string()))
            .ok_or_else(|| missing("<price>")),
    }
}

/// Parse a date cell in any of the accepted layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Parse a price cell. Thousands separators are ignored; anything that is not
/// a number becomes NaN so the row survives until the cleaning stage.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().unwrap_or(f64::NAN)
}
