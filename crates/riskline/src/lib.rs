#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/riskline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use riskline_data as data;
pub use riskline_output as output;
pub use riskline_risk as risk;

pub use config::{ConfigError, RiskConfig};
pub use error::PipelineError;
pub use pipeline::RiskPipeline;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
