#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/riskline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod table;

pub use export::{ExportError, ExportFormat, Exporter, write_atomically};
pub use report::{
    ReportBuilder, ReportError, ReportMetadata, ReportSettings, ReportWarning, RiskReport,
    SECTION_LABELS,
};
pub use table::{Cell, ReportTable, TableRow};
