//! Export of a [`RiskReport`] as CSV or JSON.
//!
//! The CSV layout is one document holding every section:
//!
//! ```text
//! # asset: ACME
//! # ...
//! # Section: Summary
//! Asset,Annual Return,...
//! ACME,0.12,...
//!
//! # Section: CAPM_Regression
//! ...
//! ```
//!
//! JSON carries the report fields plus a `sections` object keyed by section
//! label, each value being the same table the CSV prints.

use crate::report::RiskReport;
use crate::table::ReportTable;
use riskline_data::BenchmarkOrigin;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated sections with a metadata comment block.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// The whole document is rendered before the file is touched, then
    /// written to a temporary sibling and renamed over `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails. `path` is
    /// left unchanged in that case.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        write_atomically(path, content.as_bytes())
    }
}

impl Exporter for RiskReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => render_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(&JsonDocument::new(self))?),
            ExportFormat::PrettyJson => {
                Ok(serde_json::to_string_pretty(&JsonDocument::new(self))?)
            }
        }
    }
}

#[derive(serde::Serialize)]
struct JsonDocument<'a> {
    #[serde(flatten)]
    report: &'a RiskReport,
    sections: Sections,
}

impl<'a> JsonDocument<'a> {
    fn new(report: &'a RiskReport) -> Self {
        Self {
            report,
            sections: Sections(report.sections()),
        }
    }
}

/// Tables serialized as a map from label to table, in output order.
struct Sections(Vec<ReportTable>);

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for table in &self.0 {
            map.serialize_entry(&table.label, table)?;
        }
        map.end()
    }
}

fn render_csv(report: &RiskReport) -> Result<String, ExportError> {
    let mut out = String::new();
    for (key, value) in metadata_lines(report) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "# {}: {}", key, value);
    }
    out.push('\n');

    for table in report.sections() {
        let _ = writeln!(out, "# Section: {}", table.label);
        out.push_str(&table_to_csv(&table)?);
        out.push('\n');
    }
    Ok(out)
}

fn table_to_csv(table: &ReportTable) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);
    wtr.write_record(table.header_record())?;
    for row in &table.rows {
        let record: Vec<String> = std::iter::once(row.label.clone())
            .chain(row.cells.iter().map(ToString::to_string))
            .collect();
        wtr.write_record(&record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn metadata_lines(report: &RiskReport) -> Vec<(&'static str, String)> {
    let m = &report.metadata;
    let s = &m.settings;
    let benchmark = match &m.benchmark {
        BenchmarkOrigin::External { table, column } => format!("{} column {}", table, column),
        BenchmarkOrigin::SyntheticFromAsset => "synthetic (compounded asset returns)".to_string(),
    };
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();

    let mut lines = vec![
        ("asset", m.asset_name.clone()),
        ("asset_column", m.asset_column.to_string()),
        ("benchmark", benchmark),
        ("annual_risk_free_rate", s.annual_risk_free_rate.to_string()),
        (
            "per_period_risk_free_rate",
            s.per_period_risk_free_rate.to_string(),
        ),
        ("periods_per_year", s.periods_per_year.to_string()),
        ("target_volatility", s.target_volatility.to_string()),
        ("rolling_window", s.rolling_window.to_string()),
        ("sample_start", date(m.period_start)),
        ("sample_end", date(m.period_end)),
        ("observations", m.cleaning.retained.to_string()),
        ("unmatched_dates", m.cleaning.unmatched_dates().to_string()),
        ("non_finite_pairs", m.cleaning.non_finite_pairs().to_string()),
        ("generated_at", m.generated_at.to_rfc3339()),
    ];
    lines.extend(report.warnings.iter().map(|w| ("warning", w.to_string())));
    lines
}

/// Write `content` to a temporary file next to `path` and rename it into
/// place.
///
/// # Errors
///
/// Returns [`ExportError::Io`] on any file system failure; the temporary file
/// is removed on a best-effort basis.
pub fn write_atomically(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    let tmp = temp_sibling(path)?;
    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    debug!(path = %path.display(), bytes = content.len(), "wrote report");
    Ok(())
}

fn temp_sibling(path: &Path) -> Result<PathBuf, ExportError> {
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a file path: {}", path.display()),
        )
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}
