//! Integration tests for loading price tables from CSV files.

use chrono::NaiveDate;
use riskline_data::{
    BenchmarkOrigin, BenchmarkSource, ColumnResolution, ColumnSelector, CsvSource, DataError,
    load_benchmark, load_prices,
};
use std::path::PathBuf;

fn write_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_asset_csv_with_unsorted_rows_and_fallback_column() {
    let path = write_csv(
        "riskline_loader_asset.csv",
        "Date,Open,High,Low,Close\n\
         01/04/2024,10,11,9,\"1,010.0\"\n\
         01/02/2024,10,11,9,\"1,000.0\"\n\
         01/03/2024,10,11,9,\"1,005.0\"\n",
    );

    let loaded = load_prices(
        &CsvSource::new(&path),
        &ColumnSelector::Named("Adj Close".into()),
    )
    .unwrap();

    assert_eq!(
        loaded.column,
        ColumnResolution::Fallback {
            requested: "Adj Close".into(),
            used: "Close".into()
        }
    );
    assert_eq!(
        loaded.series.first_date(),
        NaiveDate::from_ymd_opt(2024, 1, 2)
    );
    assert_eq!(loaded.series.prices(), &[1000.0, 1005.0, 1010.0]);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_csv_without_date_column_is_rejected() {
    let path = write_csv("riskline_loader_no_date.csv", "Day,Close\n2024-01-02,1\n");

    let err = load_prices(&CsvSource::new(&path), &ColumnSelector::First).unwrap_err();
    assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "Date"));
    assert!(err.is_missing_data());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_benchmark_from_existing_path() {
    let path = write_csv(
        "riskline_loader_market.csv",
        "Date,Market\n2024-01-02,50\n2024-01-03,51\n",
    );
    let asset = load_prices(
        &CsvSource::new(&path),
        &ColumnSelector::Named("Market".into()),
    )
    .unwrap();

    let source = BenchmarkSource::from_optional_path(Some(path.as_path()));
    let benchmark = load_benchmark(&source, &asset.series).unwrap();

    assert!(matches!(benchmark.origin, BenchmarkOrigin::External { .. }));
    assert_eq!(benchmark.prices.prices(), &[50.0, 51.0]);

    std::fs::remove_file(path).ok();
}
