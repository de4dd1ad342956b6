//! End-to-end tests of the risk pipeline.

use approx::assert_relative_eq;
use polars::prelude::*;
use riskline::data::{BenchmarkSource, CsvSource, DataError, FrameSource};
use riskline::output::{Cell, ExportFormat, Exporter, ReportWarning, SECTION_LABELS};
use riskline::risk::RegressionError;
use riskline::{PipelineError, RiskConfig, RiskPipeline};

const DATES: [&str; 5] = [
    "2024-01-02",
    "2024-01-03",
    "2024-01-04",
    "2024-01-05",
    "2024-01-08",
];

fn config(window: usize) -> RiskConfig {
    RiskConfig {
        asset_name: "SBI".into(),
        price_column: "Adj Close".into(),
        annual_risk_free_rate: 0.06,
        periods_per_year: 252,
        target_volatility: 0.12,
        rolling_window: window,
    }
}

fn asset_source() -> FrameSource {
    let frame = df!(
        "Date" => &DATES,
        "Adj Close" => &[100.0, 102.0, 101.0, 105.0, 107.0],
    )
    .unwrap();
    FrameSource::new("asset", frame)
}

fn benchmark_source(prices: &[f64]) -> BenchmarkSource {
    let frame = df!(
        "Date" => &DATES,
        "Market" => prices,
    )
    .unwrap();
    BenchmarkSource::external(FrameSource::new("market", frame))
}

#[test]
fn test_end_to_end_report() {
    let pipeline = RiskPipeline::new(config(2)).unwrap();
    let report = pipeline
        .run(&asset_source(), &benchmark_source(&[50.0, 51.0, 50.5, 52.0, 52.5]))
        .unwrap();

    assert_eq!(report.metadata.cleaning.retained, 4);
    assert_eq!(report.capm.observations, 4);
    assert!(!report.metadata.benchmark.is_synthetic());

    let r2 = report.capm.r_squared.unwrap();
    assert!((0.0..=1.0).contains(&r2));

    let d = &report.decomposition;
    assert_relative_eq!(
        d.systematic_share.unwrap() + d.idiosyncratic_share.unwrap(),
        1.0,
        epsilon = 1e-9
    );

    let w = report.portfolio.unwrap();
    assert_relative_eq!(w.risky_weight + w.risk_free_weight, 1.0, epsilon = 1e-12);
    assert_relative_eq!(
        w.risky_weight,
        0.12 / report.summary.annual_volatility.unwrap(),
        epsilon = 1e-12
    );

    assert_eq!(report.rolling.len() + report.rolling.degenerate_windows, 3);
    assert_eq!(report.metadata.period_start.unwrap().to_string(), "2024-01-03");
    assert_eq!(report.metadata.period_end.unwrap().to_string(), "2024-01-08");
}

#[test]
fn test_constant_benchmark_fails_regression() {
    let pipeline = RiskPipeline::new(config(2)).unwrap();
    let err = pipeline
        .run(&asset_source(), &benchmark_source(&[50.0; 5]))
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Regression(RegressionError::ZeroVarianceRegressor { .. })
    ));
}

#[test]
fn test_synthetic_benchmark_is_flagged() {
    let pipeline = RiskPipeline::new(config(2)).unwrap();
    let report = pipeline
        .run(&asset_source(), &BenchmarkSource::SyntheticFromAsset)
        .unwrap();

    assert!(report.metadata.benchmark.is_synthetic());
    assert!(report.warnings.contains(&ReportWarning::SyntheticBenchmark));
    assert_relative_eq!(report.capm.beta.value, 1.0, epsilon = 1e-9);
}

#[test]
fn test_missing_benchmark_file_falls_back_to_synthetic() {
    let missing = std::env::temp_dir().join("riskline_no_such_market.csv");
    let source = BenchmarkSource::from_optional_path(Some(missing.as_path()));
    assert!(matches!(source, BenchmarkSource::SyntheticFromAsset));
}

#[test]
fn test_csv_export_contains_every_section() {
    let pipeline = RiskPipeline::new(config(2)).unwrap();
    let report = pipeline
        .run(&asset_source(), &benchmark_source(&[50.0, 51.0, 50.5, 52.0, 52.5]))
        .unwrap();

    let path = std::env::temp_dir().join("riskline_pipeline_report.csv");
    pipeline.emit(&report, &path, ExportFormat::Csv).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();

    for label in SECTION_LABELS {
        assert!(csv.contains(&format!("# Section: {}", label)));
    }
    assert!(csv.contains("SBI (Risky),"));
    assert!(!csv.contains("NaN"));
    assert!(!csv.contains(",inf"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_all_returns_above_rate_leave_sortino_missing() {
    let frame = df!(
        "Date" => &DATES,
        "Adj Close" => &[100.0, 101.0, 102.5, 103.0, 105.0],
    )
    .unwrap();
    let pipeline = RiskPipeline::new(config(3)).unwrap();
    let report = pipeline
        .run(
            &FrameSource::new("asset", frame),
            &benchmark_source(&[50.0, 51.0, 50.5, 52.0, 52.5]),
        )
        .unwrap();

    assert_eq!(report.summary.sortino, None);
    assert!(report.warnings.contains(&ReportWarning::SortinoUndefined));

    let summary = report.section("Summary").unwrap();
    assert!(summary.cell("SBI", "Sortino Ratio").unwrap().is_missing());
    assert!(matches!(
        summary.cell("SBI", "Sharpe Ratio"),
        Some(Cell::Number(_))
    ));

    let json = report.export_to_string(ExportFormat::Json).unwrap();
    assert!(json.contains("\"sortino\":null"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = RiskPipeline::new(config(1)).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn test_missing_asset_file_is_missing_data() {
    let pipeline = RiskPipeline::new(config(2)).unwrap();
    let source = CsvSource::new(std::env::temp_dir().join("riskline_no_such_asset.csv"));
    let err = pipeline
        .run(&source, &BenchmarkSource::SyntheticFromAsset)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Data(ref e) if e.is_missing_data()));
    assert!(matches!(err, PipelineError::Data(DataError::MissingData { .. })));
}
