#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/riskline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod error;
pub mod prices;
pub mod schema;
pub mod source;

pub use benchmark::{
    BenchmarkOrigin, BenchmarkSource, LoadedBenchmark, load_benchmark, synthesize_from_asset,
};
pub use error::{DataError, Result};
pub use prices::{LoadedPrices, PriceSeries, load_prices, order_by_date};
pub use schema::{ColumnResolution, ColumnSelector, DATE_COLUMN, parse_date, parse_price};
pub use source::{CsvSource, FrameSource, TabularSource};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
