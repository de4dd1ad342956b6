#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/riskline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod capm;
pub mod decomposition;
pub mod metrics;
pub mod portfolio;
pub mod rate;
pub mod returns;
pub mod rolling;
pub mod stats;

// Re-export main types
pub use capm::{CapmRegression, CoefficientEstimate, FactorModelResult, RegressionError};
pub use decomposition::RiskDecomposition;
pub use metrics::{MetricsError, SummaryMetrics};
pub use portfolio::PortfolioWeights;
pub use rate::RiskFreeRate;
pub use returns::{AlignedReturns, CleaningReport, ReturnError, ReturnSeries, align, to_returns};
pub use rolling::{RollingAnalyzer, RollingError, RollingMetrics, RollingPoint};
