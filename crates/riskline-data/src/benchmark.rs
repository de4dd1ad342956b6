//! Benchmark resolution.
//!
//! The benchmark normally comes from its own table, read with the
//! first-column rule. When no benchmark table exists the loader enters a
//! degraded mode and compounds the asset's own returns into a synthetic
//! benchmark. A regression against such a benchmark is numerically valid but
//! self-referential (beta is ~1 and residuals ~0), so the origin is carried
//! alongside the prices and must be surfaced to the reader of any report.

use crate::error::Result;
use crate::prices::{PriceSeries, load_prices};
use crate::schema::{ColumnResolution, ColumnSelector};
use crate::source::{CsvSource, TabularSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Where the benchmark prices come from.
#[derive(Debug)]
pub enum BenchmarkSource {
    /// An external benchmark table.
    External(Box<dyn TabularSource>),
    /// Compound the asset's own returns.
    SyntheticFromAsset,
}

impl BenchmarkSource {
    /// Use an external table as the benchmark.
    pub fn external(source: impl TabularSource + 'static) -> Self {
        Self::External(Box::new(source))
    }

    /// Use the CSV file at `path` if it exists, else fall back to a synthetic
    /// benchmark.
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        match path.map(CsvSource::new) {
            Some(source) if source.exists() => Self::external(source),
            Some(source) => {
                warn!(
                    path = %source.path().display(),
                    "benchmark file not found, synthesizing benchmark from asset returns"
                );
                Self::SyntheticFromAsset
            }
            None => {
                warn!("no benchmark given, synthesizing benchmark from asset returns");
                Self::SyntheticFromAsset
            }
        }
    }
}

/// Provenance of the benchmark series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkOrigin {
    /// Read from an external table.
    External {
        /// Description of the table
        table: String,
        /// Column the prices came from
        column: ColumnResolution,
    },
    /// Compounded from the asset's own returns.
    SyntheticFromAsset,
}

impl BenchmarkOrigin {
    /// Whether the benchmark was derived from the asset itself.
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, Self::SyntheticFromAsset)
    }
}

/// Benchmark prices with their provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBenchmark {
    /// Benchmark price levels.
    pub prices: PriceSeries,
    /// Where they came from.
    pub origin: BenchmarkOrigin,
}

/// Resolve the benchmark series for `asset`.
///
/// # Errors
///
/// Propagates loader errors for an external benchmark. The synthetic
/// variant cannot fail.
pub fn load_benchmark(source: &BenchmarkSource, asset: &PriceSeries) -> Result<LoadedBenchmark> {
    match source {
        BenchmarkSource::External(table) => {
            let loaded = load_prices(table.as_ref(), &ColumnSelector::First)?;
            Ok(LoadedBenchmark {
                prices: loaded.series,
                origin: BenchmarkOrigin::External {
                    table: table.describe(),
                    column: loaded.column,
                },
            })
        }
        BenchmarkSource::SyntheticFromAsset => Ok(LoadedBenchmark {
            prices: synthesize_from_asset(asset),
            origin: BenchmarkOrigin::SyntheticFromAsset,
        }),
    }
}

/// Compound the asset's period returns into a price index starting at 1.0.
///
/// Returns that are not finite (missing prices, division by zero) are
/// treated as zero, so the index keeps one level per asset date.
pub fn synthesize_from_asset(asset: &PriceSeries) -> PriceSeries {
    let prices = asset.prices();
    let mut level = 1.0;

    let levels = asset.dates().iter().enumerate().map(|(i, date)| {
        if i > 0 {
            let period_return = prices[i] / prices[i - 1] - 1.0;
            if period_return.is_finite() {
                level *= 1.0 + period_return;
            }
        }
        (*date, level)
    });

    PriceSeries::from_observations(levels.collect::<Vec<_>>())
}
