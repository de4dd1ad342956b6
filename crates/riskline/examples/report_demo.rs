//! Builds a risk report from in-memory price tables and prints it.
//!
//! Run with `cargo run -p riskline --example report_demo`.

use polars::prelude::*;
use riskline::data::{BenchmarkSource, FrameSource};
use riskline::output::{ExportFormat, Exporter};
use riskline::{RiskConfig, RiskPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let days = 120;
    let dates: Vec<String> = (0..days)
        .map(|i| {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
                + chrono::Days::new(i);
            date.to_string()
        })
        .collect();

    // Deterministic wiggles so the demo is reproducible.
    let market: Vec<f64> = (0..days)
        .map(|i| 100.0 * (1.0 + 0.0004 * i as f64 + 0.01 * (i as f64 * 0.7).sin()))
        .collect();
    let asset: Vec<f64> = market
        .iter()
        .enumerate()
        .map(|(i, m)| 0.5 * m * (1.0 + 0.006 * (i as f64 * 1.3).cos()))
        .collect();

    let asset_frame = df!("Date" => &dates, "Adj Close" => &asset)?;
    let market_frame = df!("Date" => &dates, "Index" => &market)?;

    let pipeline = RiskPipeline::new(RiskConfig {
        asset_name: "DEMO".into(),
        price_column: "Adj Close".into(),
        annual_risk_free_rate: 0.06,
        periods_per_year: 252,
        target_volatility: 0.12,
        rolling_window: 20,
    })?;

    let report = pipeline.run(
        &FrameSource::new("demo asset", asset_frame),
        &BenchmarkSource::external(FrameSource::new("demo market", market_frame)),
    )?;

    println!("{}", report);
    println!("{}", report.export_to_string(ExportFormat::Csv)?);
    Ok(())
}
