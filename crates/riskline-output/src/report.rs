//! The assembled risk report.
//!
//! A [`RiskReport`] is built once per run from the outputs of every
//! analysis stage. Its sections are exposed as [`ReportTable`]s so that all
//! export formats share one layout.

use crate::table::{Cell, ReportTable};
use chrono::{DateTime, NaiveDate, Utc};
use riskline_data::{BenchmarkOrigin, ColumnResolution};
use riskline_risk::{
    CleaningReport, FactorModelResult, PortfolioWeights, RiskDecomposition, RollingMetrics,
    SummaryMetrics,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Section labels in output order.
pub const SECTION_LABELS: [&str; 5] = [
    "Summary",
    "CAPM_Regression",
    "Risk_Decomposition",
    "Portfolio_Construction",
    "Rolling_Metrics",
];

/// Errors that can occur while assembling a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A required part was never supplied to the builder.
    #[error("Report is missing its {0} section")]
    MissingSection(&'static str),
}

/// Configuration echoed into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Annual risk-free rate.
    pub annual_risk_free_rate: f64,
    /// Per-period risk-free rate derived from the annual rate.
    pub per_period_risk_free_rate: f64,
    /// Return periods per year.
    pub periods_per_year: u32,
    /// Target annual volatility for the allocation.
    pub target_volatility: f64,
    /// Rolling window length.
    pub rolling_window: usize,
    /// Configured asset price column.
    pub price_column: String,
}

/// Everything about the run that is not a statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Asset label used in row headers.
    pub asset_name: String,
    /// How the asset price column was resolved.
    pub asset_column: ColumnResolution,
    /// Where the benchmark came from.
    pub benchmark: BenchmarkOrigin,
    /// Settings the run used.
    pub settings: ReportSettings,
    /// What alignment removed.
    pub cleaning: CleaningReport,
    /// First aligned date.
    pub period_start: Option<NaiveDate>,
    /// Last aligned date.
    pub period_end: Option<NaiveDate>,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
}

/// Conditions the reader of a report should know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// The benchmark was compounded from the asset itself.
    SyntheticBenchmark,
    /// The configured asset column was missing.
    ColumnFallback {
        /// Configured column
        requested: String,
        /// Column read instead
        used: String,
    },
    /// Alignment removed observations.
    RowsDropped {
        /// Dates present in only one series
        unmatched_dates: usize,
        /// Common dates with a non-finite return
        non_finite_pairs: usize,
    },
    /// The allocation borrows at the risk-free rate.
    LeveragedAllocation {
        /// Risky weight above one
        risky_weight: f64,
    },
    /// No allocation could be computed.
    AllocationUndefined,
    /// The Sortino ratio is undefined.
    SortinoUndefined,
    /// The decomposition shares are undefined.
    DecompositionUndefined,
    /// Some rolling windows were dropped.
    DegenerateWindows {
        /// Number of windows dropped
        count: usize,
    },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntheticBenchmark => f.write_str(
                "benchmark synthesized from the asset's own returns; the CAPM regression is self-referential",
            ),
            Self::ColumnFallback { requested, used } => write!(
                f,
                "price column '{}' not found, used '{}' instead",
                requested, used
            ),
            Self::RowsDropped {
                unmatched_dates,
                non_finite_pairs,
            } => write!(
                f,
                "alignment dropped {} unmatched dates and {} non-finite pairs",
                unmatched_dates, non_finite_pairs
            ),
            Self::LeveragedAllocation { risky_weight } => write!(
                f,
                "allocation is leveraged (risky weight {:.4})",
                risky_weight
            ),
            Self::AllocationUndefined => {
                f.write_str("asset volatility unavailable, no allocation computed")
            }
            Self::SortinoUndefined => f.write_str(
                "Sortino ratio undefined (fewer than two returns below the risk-free rate)",
            ),
            Self::DecompositionUndefined => {
                f.write_str("risk decomposition shares undefined (zero total variance)")
            }
            Self::DegenerateWindows { count } => {
                write!(f, "{} rolling windows dropped as degenerate", count)
            }
        }
    }
}

/// Complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Run metadata.
    pub metadata: ReportMetadata,
    /// Summary statistics of the asset.
    pub summary: SummaryMetrics,
    /// CAPM regression.
    pub capm: FactorModelResult,
    /// Variance decomposition.
    pub decomposition: RiskDecomposition,
    /// Target-volatility allocation, absent when undefined.
    pub portfolio: Option<PortfolioWeights>,
    /// Rolling statistics.
    pub rolling: RollingMetrics,
    /// Warnings raised while assembling the report.
    pub warnings: Vec<ReportWarning>,
}

impl RiskReport {
    /// All sections in output order.
    pub fn sections(&self) -> Vec<ReportTable> {
        vec![
            self.summary_table(),
            self.capm_table(),
            self.decomposition_table(),
            self.portfolio_table(),
            self.rolling_table(),
        ]
    }

    /// Look up a section by label.
    pub fn section(&self, label: &str) -> Option<ReportTable> {
        self.sections().into_iter().find(|t| t.label == label)
    }

    fn summary_table(&self) -> ReportTable {
        let mut table = ReportTable::new(
            SECTION_LABELS[0],
            "Asset",
            &[
                "Annual Return",
                "Annual Volatility",
                "Sharpe Ratio",
                "Sortino Ratio",
                "Max Drawdown",
            ],
        );
        let s = &self.summary;
        table.push(
            self.metadata.asset_name.as_str(),
            vec![
                Cell::number(s.annual_return),
                Cell::number(s.annual_volatility),
                Cell::number(s.sharpe),
                Cell::number(s.sortino),
                Cell::number(Some(s.max_drawdown)),
            ],
        );
        table
    }

    fn capm_table(&self) -> ReportTable {
        let mut table =
            ReportTable::new(SECTION_LABELS[1], "Term", &["Coefficient", "t-Stat", "p-Value"]);
        for (label, estimate) in [("const", &self.capm.alpha), ("slope", &self.capm.beta)] {
            table.push(
                label,
                vec![
                    Cell::number(Some(estimate.value)),
                    Cell::number(estimate.t_stat),
                    Cell::number(estimate.p_value),
                ],
            );
        }
        table.push(
            "R-Squared",
            vec![Cell::number(self.capm.r_squared), Cell::Missing, Cell::Missing],
        );
        table
    }

    fn decomposition_table(&self) -> ReportTable {
        let mut table =
            ReportTable::new(SECTION_LABELS[2], "Component", &["Variance", "Contribution %"]);
        let d = &self.decomposition;
        table.push(
            "Systematic Risk",
            vec![
                Cell::number(Some(d.systematic_variance)),
                Cell::number(d.systematic_share),
            ],
        );
        table.push(
            "Idiosyncratic Risk",
            vec![
                Cell::number(Some(d.idiosyncratic_variance)),
                Cell::number(d.idiosyncratic_share),
            ],
        );
        table
    }

    fn portfolio_table(&self) -> ReportTable {
        let mut table = ReportTable::new(SECTION_LABELS[3], "Position", &["Weight", "Explanation"]);
        let risky_label = format!("{} (Risky)", self.metadata.asset_name);
        match &self.portfolio {
            Some(w) => {
                table.push(
                    risky_label,
                    vec![
                        Cell::number(Some(w.risky_weight)),
                        Cell::text(w.risky_explanation()),
                    ],
                );
                table.push(
                    "Risk-Free",
                    vec![
                        Cell::number(Some(w.risk_free_weight)),
                        Cell::text(w.risk_free_explanation()),
                    ],
                );
            }
            None => {
                let reason = Cell::text("Undefined: asset volatility unavailable");
                table.push(risky_label, vec![Cell::Missing, reason.clone()]);
                table.push("Risk-Free", vec![Cell::Missing, reason]);
            }
        }
        table
    }

    fn rolling_table(&self) -> ReportTable {
        let mut table =
            ReportTable::new(SECTION_LABELS[4], "Date", &["Rolling Sharpe", "Rolling Beta"]);
        for point in &self.rolling.points {
            table.push(
                point.date.to_string(),
                vec![Cell::number(Some(point.sharpe)), Cell::number(Some(point.beta))],
            );
        }
        table
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;
        match (m.period_start, m.period_end) {
            (Some(start), Some(end)) => writeln!(
                f,
                "Risk Report: {} ({} to {}, {} observations)",
                m.asset_name, start, end, m.cleaning.retained
            )?,
            _ => writeln!(f, "Risk Report: {}", m.asset_name)?,
        }
        match &m.benchmark {
            BenchmarkOrigin::External { table, column } => {
                writeln!(f, "  Benchmark: {} column {}", table, column)?
            }
            BenchmarkOrigin::SyntheticFromAsset => {
                writeln!(f, "  Benchmark: synthesized from asset")?
            }
        }

        let s = &self.summary;
        writeln!(f, "  Annual Return: {}", fmt_pct(s.annual_return))?;
        writeln!(f, "  Annual Volatility: {}", fmt_pct(s.annual_volatility))?;
        writeln!(f, "  Sharpe Ratio: {}", fmt_num(s.sharpe))?;
        writeln!(f, "  Sortino Ratio: {}", fmt_num(s.sortino))?;
        writeln!(f, "  Max Drawdown: {}", fmt_pct(Some(s.max_drawdown)))?;

        writeln!(
            f,
            "  Alpha: {} (p = {})",
            fmt_num(Some(self.capm.alpha.value)),
            fmt_num(self.capm.alpha.p_value)
        )?;
        writeln!(
            f,
            "  Beta: {} (p = {})",
            fmt_num(Some(self.capm.beta.value)),
            fmt_num(self.capm.beta.p_value)
        )?;
        writeln!(f, "  R-Squared: {}", fmt_num(self.capm.r_squared))?;
        writeln!(
            f,
            "  Systematic / Idiosyncratic: {} / {}",
            fmt_pct(self.decomposition.systematic_share),
            fmt_pct(self.decomposition.idiosyncratic_share)
        )?;

        match &self.portfolio {
            Some(w) => writeln!(
                f,
                "  Allocation: {} risky / {} risk-free",
                fmt_pct(Some(w.risky_weight)),
                fmt_pct(Some(w.risk_free_weight))
            )?,
            None => writeln!(f, "  Allocation: n/a")?,
        }
        writeln!(
            f,
            "  Rolling windows ({}): {}",
            self.rolling.window,
            self.rolling.len()
        )?;

        for warning in &self.warnings {
            writeln!(f, "  Warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Builder for [`RiskReport`].
#[derive(Debug, Default)]
pub struct ReportBuilder {
    asset_name: Option<String>,
    asset_column: Option<ColumnResolution>,
    benchmark: Option<BenchmarkOrigin>,
    settings: Option<ReportSettings>,
    cleaning: Option<CleaningReport>,
    period: Option<(NaiveDate, NaiveDate)>,
    generated_at: Option<DateTime<Utc>>,
    summary: Option<SummaryMetrics>,
    capm: Option<FactorModelResult>,
    decomposition: Option<RiskDecomposition>,
    portfolio: Option<PortfolioWeights>,
    rolling: Option<RollingMetrics>,
}

impl ReportBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the asset label.
    pub fn asset_name(mut self, name: impl Into<String>) -> Self {
        self.asset_name = Some(name.into());
        self
    }

    /// Set how the asset column was resolved.
    pub fn asset_column(mut self, column: ColumnResolution) -> Self {
        self.asset_column = Some(column);
        self
    }

    /// Set the benchmark provenance.
    pub fn benchmark(mut self, origin: BenchmarkOrigin) -> Self {
        self.benchmark = Some(origin);
        self
    }

    /// Set the configuration echo.
    pub fn settings(mut self, settings: ReportSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set the cleaning counts.
    pub const fn cleaning(mut self, cleaning: CleaningReport) -> Self {
        self.cleaning = Some(cleaning);
        self
    }

    /// Set the sample period.
    pub const fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Override the generation timestamp (defaults to now).
    pub const fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Set the summary statistics.
    pub const fn summary(mut self, summary: SummaryMetrics) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Set the regression.
    pub fn capm(mut self, capm: FactorModelResult) -> Self {
        self.capm = Some(capm);
        self
    }

    /// Set the decomposition.
    pub const fn decomposition(mut self, decomposition: RiskDecomposition) -> Self {
        self.decomposition = Some(decomposition);
        self
    }

    /// Set the allocation; leave unset when it is undefined.
    pub const fn portfolio(mut self, portfolio: Option<PortfolioWeights>) -> Self {
        self.portfolio = portfolio;
        self
    }

    /// Set the rolling statistics.
    pub fn rolling(mut self, rolling: RollingMetrics) -> Self {
        self.rolling = Some(rolling);
        self
    }

    /// Assemble the report and derive its warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingSection`] if a required part is unset.
    pub fn build(self) -> Result<RiskReport, ReportError> {
        let metadata = ReportMetadata {
            asset_name: self.asset_name.ok_or(ReportError::MissingSection("asset name"))?,
            asset_column: self
                .asset_column
                .ok_or(ReportError::MissingSection("asset column"))?,
            benchmark: self.benchmark.ok_or(ReportError::MissingSection("benchmark"))?,
            settings: self.settings.ok_or(ReportError::MissingSection("settings"))?,
            cleaning: self.cleaning.unwrap_or_default(),
            period_start: self.period.map(|(start, _)| start),
            period_end: self.period.map(|(_, end)| end),
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
        };

        let mut report = RiskReport {
            metadata,
            summary: self.summary.ok_or(ReportError::MissingSection(SECTION_LABELS[0]))?,
            capm: self.capm.ok_or(ReportError::MissingSection(SECTION_LABELS[1]))?,
            decomposition: self
                .decomposition
                .ok_or(ReportError::MissingSection(SECTION_LABELS[2]))?,
            portfolio: self.portfolio,
            rolling: self.rolling.ok_or(ReportError::MissingSection(SECTION_LABELS[4]))?,
            warnings: Vec::new(),
        };
        report.warnings = collect_warnings(&report);
        Ok(report)
    }
}

fn collect_warnings(report: &RiskReport) -> Vec<ReportWarning> {
    let mut warnings = Vec::new();
    let m = &report.metadata;

    if m.benchmark.is_synthetic() {
        warnings.push(ReportWarning::SyntheticBenchmark);
    }
    if let ColumnResolution::Fallback { requested, used } = &m.asset_column {
        warnings.push(ReportWarning::ColumnFallback {
            requested: requested.clone(),
            used: used.clone(),
        });
    }
    if m.cleaning.dropped_any() {
        warnings.push(ReportWarning::RowsDropped {
            unmatched_dates: m.cleaning.unmatched_dates(),
            non_finite_pairs: m.cleaning.non_finite_pairs(),
        });
    }
    match &report.portfolio {
        Some(w) if w.is_leveraged() => warnings.push(ReportWarning::LeveragedAllocation {
            risky_weight: w.risky_weight,
        }),
        Some(_) => {}
        None => warnings.push(ReportWarning::AllocationUndefined),
    }
    if report.summary.sortino.is_none() {
        warnings.push(ReportWarning::SortinoUndefined);
    }
    if !report.decomposition.is_defined() {
        warnings.push(ReportWarning::DecompositionUndefined);
    }
    if report.rolling.degenerate_windows > 0 {
        warnings.push(ReportWarning::DegenerateWindows {
            count: report.rolling.degenerate_windows,
        });
    }
    warnings
}
