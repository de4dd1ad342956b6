//! Date-indexed price series and the loader that builds them.

use crate::error::{DataError, Result};
use crate::schema::{
    ColumnResolution, ColumnSelector, DATE_COLUMN, parse_date, parse_price, resolve_price_column,
};
use crate::source::TabularSource;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sort dated observations ascending and keep the last value for a
/// repeated date. Returns parallel date and value vectors.
pub fn order_by_date(
    observations: impl IntoIterator<Item = (NaiveDate, f64)>,
) -> (Vec<NaiveDate>, Vec<f64>) {
    let mut observations: Vec<(NaiveDate, f64)> = observations.into_iter().collect();
    // Stable sort keeps input order among equal dates.
    observations.sort_by_key(|(date, _)| *date);

    let mut dates: Vec<NaiveDate> = Vec::with_capacity(observations.len());
    let mut values: Vec<f64> = Vec::with_capacity(observations.len());
    for (date, value) in observations {
        match (dates.last(), values.last_mut()) {
            (Some(last), Some(slot)) if *last == date => *slot = value,
            _ => {
                dates.push(date);
                values.push(value);
            }
        }
    }
    (dates, values)
}

/// Ordered price observations with strictly increasing, unique dates.
///
/// Prices are expected to be positive but this is not enforced: a cell that
/// could not be read is kept as NaN and removed later by return alignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from observations in any order.
    ///
    /// Observations are sorted by date; when a date repeats, the observation
    /// that came last in the input wins.
    pub fn from_observations(observations: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let (dates, prices) = order_by_date(observations);
        Self { dates, prices }
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Prices aligned with [`Self::dates`].
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterate over `(date, price)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.prices.iter().copied())
    }

    /// First observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// A price series together with how it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPrices {
    /// The cleaned, ordered series.
    pub series: PriceSeries,
    /// Which column the prices came from.
    pub column: ColumnResolution,
    /// Rows discarded because their date repeated.
    pub duplicates_dropped: usize,
}

/// Load a price series from a tabular source.
///
/// # Errors
///
/// - [`DataError::MissingData`] if the source is unreadable or empty
/// - [`DataError::MissingColumn`] if the date or price column is absent
/// - [`DataError::InvalidDate`] if a date cell cannot be parsed
pub fn load_prices(source: &dyn TabularSource, selector: &ColumnSelector) -> Result<LoadedPrices> {
    let table = source.describe();
    let frame = source.read_frame()?;

    if frame.height() == 0 {
        return Err(DataError::MissingData {
            table,
            reason: "no rows".to_string(),
        });
    }

    let column = resolve_price_column(&frame, selector, &table)?;
    if let ColumnResolution::Fallback { requested, used } = &column {
        warn!(%table, %requested, %used, "price column not found, using last column");
    }

    let dates = read_dates(frame.column(DATE_COLUMN)?, &table)?;
    let prices = read_prices(frame.column(column.column())?)?;

    let rows = dates.len();
    let series = PriceSeries::from_observations(dates.into_iter().zip(prices));
    let duplicates_dropped = rows - series.len();
    if duplicates_dropped > 0 {
        warn!(%table, duplicates_dropped, "duplicate dates collapsed, last row kept");
    }

    debug!(%table, %column, observations = series.len(), "loaded price series");

    Ok(LoadedPrices {
        series,
        column,
        duplicates_dropped,
    })
}

fn read_dates(column: &Column, table: &str) -> Result<Vec<NaiveDate>> {
    let as_text = column.cast(&DataType::String)?;
    as_text
        .str()?
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            cell.and_then(parse_date).ok_or_else(|| DataError::InvalidDate {
                table: table.to_string(),
                row: index + 1,
                value: cell.unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn read_prices(column: &Column) -> Result<Vec<f64>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|cell| cell.map_or(f64::NAN, parse_price))
            .collect());
    }

    let as_float = column.cast(&DataType::Float64)?;
    Ok(as_float
        .f64()?
        .into_iter()
        .map(|cell| cell.unwrap_or(f64::NAN))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FrameSource;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_from_observations_sorts_and_keeps_last_duplicate() {
        let series = PriceSeries::from_observations(vec![
            (date(3), 103.0),
            (date(1), 101.0),
            (date(2), 102.0),
            (date(1), 111.0),
        ]);

        assert_eq!(series.dates(), &[date(1), date(2), date(3)]);
        assert_eq!(series.prices(), &[111.0, 102.0, 103.0]);
        assert_eq!(series.first_date(), Some(date(1)));
        assert_eq!(series.last_date(), Some(date(3)));
    }

    #[test]
    fn test_order_by_date_handles_nan_duplicates() {
        let (dates, values) =
            order_by_date(vec![(date(2), f64::NAN), (date(2), 5.0), (date(1), -0.5)]);

        assert_eq!(dates, [date(1), date(2)]);
        assert_eq!(values, [-0.5, 5.0]);
        assert_eq!(order_by_date(Vec::new()), (Vec::new(), Vec::new()));
    }

    #[test]
    fn test_load_prices_from_frame() {
        let frame = df!(
            "Date" => &["2024-01-03", "2024-01-02", "2024-01-04"],
            "Close" => &[101.0, 100.0, 102.0],
        )
        .unwrap();
        let source = FrameSource::new("asset", frame);

        let loaded = load_prices(&source, &ColumnSelector::Named("Close".into())).unwrap();
        assert_eq!(loaded.column, ColumnResolution::Named("Close".into()));
        assert_eq!(loaded.series.prices(), &[100.0, 101.0, 102.0]);
        assert_eq!(loaded.duplicates_dropped, 0);
    }

    #[test]
    fn test_text_prices_become_nan_when_unparseable() {
        let frame = df!(
            "Date" => &["2024-01-02", "2024-01-03", "2024-01-04"],
            "Price" => &["1,000.5", "", "1,010"],
        )
        .unwrap();
        let source = FrameSource::new("asset", frame);

        let loaded = load_prices(&source, &ColumnSelector::First).unwrap();
        let prices = loaded.series.prices();
        assert_eq!(prices[0], 1000.5);
        assert!(prices[1].is_nan());
        assert_eq!(prices[2], 1010.0);
    }

    #[test]
    fn test_invalid_date_reports_row() {
        let frame = df!(
            "Date" => &["2024-01-02", "yesterday"],
            "Close" => &[1.0, 2.0],
        )
        .unwrap();
        let source = FrameSource::new("asset", frame);

        let err = load_prices(&source, &ColumnSelector::First).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidDate { row: 2, ref value, .. } if value == "yesterday"
        ));
    }

    #[test]
    fn test_duplicates_are_counted() {
        let frame = df!(
            "Date" => &["2024-01-02", "2024-01-02", "2024-01-03"],
            "Close" => &[1.0, 2.0, 3.0],
        )
        .unwrap();
        let source = FrameSource::new("asset", frame);

        let loaded = load_prices(&source, &ColumnSelector::First).unwrap();
        assert_eq!(loaded.duplicates_dropped, 1);
        assert_eq!(loaded.series.prices(), &[2.0, 3.0]);
    }

    #[test]
    fn test_empty_frame_is_missing_data() {
        let frame = df!(
            "Date" => Vec::<&str>::new(),
            "Close" => Vec::<f64>::new(),
        )
        .unwrap();
        let source = FrameSource::new("asset", frame);

        let err = load_prices(&source, &ColumnSelector::First).unwrap_err();
        assert!(err.is_missing_data());
    }
}
