//! Return series and alignment.
//!
//! Returns are simple period-over-period changes, `p[i] / p[i-1] - 1`, with
//! no compounding. Alignment inner-joins two return series on date and then
//! removes every pair holding a non-finite value. Both steps are recorded in
//! a [`CleaningReport`] so that dropped rows are auditable.

use chrono::NaiveDate;
use ndarray::{Array1, ArrayView1};
use riskline_data::{PriceSeries, order_by_date};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

/// Errors from return alignment
#[derive(Debug, Error)]
pub enum ReturnError {
    /// Nothing left after the join and the non-finite filter
    #[error(
        "No overlapping finite observations: asset has {asset_observations}, benchmark has {market_observations}"
    )]
    NoOverlap {
        /// Asset returns before alignment
        asset_observations: usize,
        /// Benchmark returns before alignment
        market_observations: usize,
    },
}

/// Ordered `(date, value)` observations of per-period returns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Build a series from observations in any order; a repeated date keeps
    /// the last observation.
    pub fn from_observations(observations: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let (dates, values) = order_by_date(observations);
        Self { dates, values }
    }

    /// Build from parallel vectors already in date order.
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Return values aligned with [`Self::dates`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values as an ndarray view.
    pub fn view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.values.as_slice())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Convert prices to simple returns.
///
/// The first price has no predecessor, so a series of `n` prices yields
/// `n - 1` returns (none for fewer than two prices). Non-finite results are
/// kept; alignment removes them.
pub fn to_returns(prices: &PriceSeries) -> ReturnSeries {
    let dates = prices.dates().iter().skip(1).copied().collect();
    let values = prices
        .prices()
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();
    ReturnSeries::from_parts(dates, values)
}

/// Counts of what the alignment stage kept and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Asset returns before alignment
    pub asset_observations: usize,
    /// Benchmark returns before alignment
    pub market_observations: usize,
    /// Dates present only in the asset series
    pub asset_only_dates: usize,
    /// Dates present only in the benchmark series
    pub market_only_dates: usize,
    /// Common dates dropped because the asset return was not finite
    pub non_finite_asset: usize,
    /// Common dates dropped because the benchmark return was not finite
    /// (and the asset return was)
    pub non_finite_market: usize,
    /// Pairs kept
    pub retained: usize,
}

impl CleaningReport {
    /// Common dates dropped for a non-finite value on either side.
    pub const fn non_finite_pairs(&self) -> usize {
        self.non_finite_asset + self.non_finite_market
    }

    /// Dates present in only one of the two series.
    pub const fn unmatched_dates(&self) -> usize {
        self.asset_only_dates + self.market_only_dates
    }

    /// Whether anything at all was removed.
    pub const fn dropped_any(&self) -> bool {
        self.non_finite_pairs() + self.unmatched_dates() > 0
    }
}

/// Asset and benchmark returns restricted to common, finite dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<NaiveDate>,
    asset: Array1<f64>,
    market: Array1<f64>,
    cleaning: CleaningReport,
}

impl AlignedReturns {
    /// Common dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset returns.
    pub const fn asset(&self) -> &Array1<f64> {
        &self.asset
    }

    /// Benchmark returns.
    pub const fn market(&self) -> &Array1<f64> {
        &self.market
    }

    /// What the cleaning stage removed.
    pub const fn cleaning(&self) -> &CleaningReport {
        &self.cleaning
    }

    /// Number of aligned pairs.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a value returned by [`align`].
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Asset returns as a dated series.
    pub fn asset_series(&self) -> ReturnSeries {
        ReturnSeries::from_parts(self.dates.clone(), self.asset.to_vec())
    }

    /// Benchmark returns as a dated series.
    pub fn market_series(&self) -> ReturnSeries {
        ReturnSeries::from_parts(self.dates.clone(), self.market.to_vec())
    }
}

/// Inner-join two return series on date and drop non-finite pairs.
///
/// # Errors
///
/// Returns [`ReturnError::NoOverlap`] if no pair survives.
pub fn align(asset: &ReturnSeries, market: &ReturnSeries) -> Result<AlignedReturns, ReturnError> {
    let mut cleaning = CleaningReport {
        asset_observations: asset.len(),
        market_observations: market.len(),
        ..Default::default()
    };

    let capacity = asset.len().min(market.len());
    let mut dates = Vec::with_capacity(capacity);
    let mut asset_values = Vec::with_capacity(capacity);
    let mut market_values = Vec::with_capacity(capacity);

    // Both series are sorted with unique dates, so a merge walk suffices.
    let (mut i, mut j) = (0, 0);
    while i < asset.len() && j < market.len() {
        match asset.dates[i].cmp(&market.dates[j]) {
            Ordering::Less => {
                cleaning.asset_only_dates += 1;
                i += 1;
            }
            Ordering::Greater => {
                cleaning.market_only_dates += 1;
                j += 1;
            }
            Ordering::Equal => {
                let (a, m) = (asset.values[i], market.values[j]);
                if !a.is_finite() {
                    cleaning.non_finite_asset += 1;
                } else if !m.is_finite() {
                    cleaning.non_finite_market += 1;
                } else {
                    dates.push(asset.dates[i]);
                    asset_values.push(a);
                    market_values.push(m);
                }
                i += 1;
                j += 1;
            }
        }
    }
    cleaning.asset_only_dates += asset.len() - i;
    cleaning.market_only_dates += market.len() - j;
    cleaning.retained = dates.len();

    debug!(
        retained = cleaning.retained,
        unmatched = cleaning.unmatched_dates(),
        non_finite = cleaning.non_finite_pairs(),
        "aligned return series"
    );

    if dates.is_empty() {
        return Err(ReturnError::NoOverlap {
            asset_observations: asset.len(),
            market_observations: market.len(),
        });
    }

    Ok(AlignedReturns {
        dates,
        asset: Array1::from(asset_values),
        market: Array1::from(market_values),
        cleaning,
    })
}
