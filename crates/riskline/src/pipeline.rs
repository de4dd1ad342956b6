//! End-to-end run: load, align, analyze, report.

use crate::{config::RiskConfig, error::PipelineError};
use riskline_data::{
    BenchmarkSource, ColumnSelector, LoadedBenchmark, LoadedPrices, TabularSource, load_benchmark,
    load_prices,
};
use riskline_output::{ExportFormat, Exporter, ReportBuilder, RiskReport};
use riskline_risk::{
    CapmRegression, PortfolioWeights, RiskDecomposition, RollingAnalyzer, SummaryMetrics, align,
    to_returns,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs every analysis stage for one asset under a fixed configuration.
#[derive(Debug, Clone)]
pub struct RiskPipeline {
    config: RiskConfig,
}

impl RiskPipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: RiskConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Load both tables and build the report.
    pub fn run(
        &self,
        asset: &dyn TabularSource,
        benchmark: &BenchmarkSource,
    ) -> Result<RiskReport, PipelineError> {
        info!(asset = %asset.describe(), "starting risk report");

        let selector = ColumnSelector::Named(self.config.price_column.clone());
        let asset_prices = load_prices(asset, &selector)?;
        let benchmark_prices = load_benchmark(benchmark, &asset_prices.series)?;

        self.run_loaded(&asset_prices, &benchmark_prices)
    }

    /// Build the report from already loaded prices.
    pub fn run_loaded(
        &self,
        asset: &LoadedPrices,
        benchmark: &LoadedBenchmark,
    ) -> Result<RiskReport, PipelineError> {
        if benchmark.origin.is_synthetic() {
            warn!("benchmark is synthetic, CAPM statistics are self-referential");
        }

        let aligned = align(&to_returns(&asset.series), &to_returns(&benchmark.prices))?;
        let cleaning = *aligned.cleaning();
        if cleaning.dropped_any() {
            warn!(
                unmatched_dates = cleaning.unmatched_dates(),
                non_finite_pairs = cleaning.non_finite_pairs(),
                "dropped observations while aligning returns"
            );
        }
        info!(observations = aligned.len(), "aligned returns");

        let rate = self.config.risk_free_rate();
        debug!(per_period = rate.per_period(), "risk-free rate");

        let summary = SummaryMetrics::compute(aligned.asset().view(), &rate)?;

        let capm = CapmRegression::new(rate).fit(&aligned)?;
        info!(
            alpha = capm.alpha.value,
            beta = capm.beta.value,
            r_squared = capm.r_squared,
            "fitted CAPM regression"
        );

        let decomposition = RiskDecomposition::compute(&capm, aligned.market().view());

        let portfolio = PortfolioWeights::target_volatility(
            summary.annual_volatility,
            self.config.target_volatility,
        );
        match &portfolio {
            Some(w) if w.is_leveraged() => {
                warn!(risky_weight = w.risky_weight, "target volatility requires leverage")
            }
            Some(_) => {}
            None => warn!("asset volatility unavailable, allocation skipped"),
        }

        let rolling = RollingAnalyzer::new(self.config.rolling_window, rate)?.analyze(&aligned);

        let mut builder = ReportBuilder::new()
            .asset_name(self.config.asset_name.as_str())
            .asset_column(asset.column.clone())
            .benchmark(benchmark.origin.clone())
            .settings(self.config.report_settings())
            .cleaning(cleaning)
            .summary(summary)
            .capm(capm)
            .decomposition(decomposition)
            .portfolio(portfolio)
            .rolling(rolling);
        if let (Some(start), Some(end)) = (aligned.dates().first(), aligned.dates().last()) {
            builder = builder.period(*start, *end);
        }
        let report = builder.build()?;

        info!(warnings = report.warnings.len(), "risk report complete");
        Ok(report)
    }

    /// Write `report` to `path` in one step.
    pub fn emit(
        &self,
        report: &RiskReport,
        path: &Path,
        format: ExportFormat,
    ) -> Result<(), PipelineError> {
        report.export_to_file(path, format)?;
        info!(path = %path.display(), format = format.extension(), "report written");
        Ok(())
    }
}
