//! Pipeline error type.

use crate::config::ConfigError;
use riskline_data::DataError;
use riskline_output::{ExportError, ReportError};
use riskline_risk::{MetricsError, RegressionError, ReturnError, RollingError};
use thiserror::Error;

/// Any fatal failure of a run. Nothing is written once one occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input could not be loaded
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Asset and benchmark returns share no usable dates
    #[error("Alignment error: {0}")]
    Alignment(#[from] ReturnError),

    /// Summary statistics failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// CAPM regression failed
    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),

    /// Rolling analysis failed
    #[error("Rolling error: {0}")]
    Rolling(#[from] RollingError),

    /// Report assembly failed
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Report export failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
