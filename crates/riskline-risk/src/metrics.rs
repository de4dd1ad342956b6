//! Summary performance and risk statistics.
//!
//! All dispersion measures use the sample (n - 1) denominator. A statistic
//! that cannot be computed from the data is `None` rather than NaN.

use crate::{
    rate::RiskFreeRate,
    stats::{checked_ratio, dispersion_std, mean, sample_std},
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from summary statistics
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// No returns to summarize
    #[error("Cannot compute summary metrics of an empty return series")]
    EmptySeries,
}

/// Scalar summary of one return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// `(1 + mean)^p - 1`
    pub annual_return: Option<f64>,
    /// Sample standard deviation scaled by `sqrt(p)`
    pub annual_volatility: Option<f64>,
    /// Per-period Sharpe ratio
    pub sharpe: Option<f64>,
    /// Per-period Sortino ratio
    pub sortino: Option<f64>,
    /// Largest peak-to-trough decline of the compounded series, `<= 0`
    pub max_drawdown: f64,
}

impl SummaryMetrics {
    /// Compute every summary statistic for `returns`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::EmptySeries`] for an empty series.
    pub fn compute(
        returns: ArrayView1<'_, f64>,
        risk_free: &RiskFreeRate,
    ) -> Result<Self, MetricsError> {
        if returns.is_empty() {
            return Err(MetricsError::EmptySeries);
        }
        let rf = risk_free.per_period();

        Ok(Self {
            annual_return: annual_return(returns, risk_free.periods_per_year()),
            annual_volatility: annual_volatility(returns, risk_free.periods_per_year()),
            sharpe: sharpe_ratio(returns, rf),
            sortino: sortino_ratio(returns, rf),
            max_drawdown: max_drawdown(returns).unwrap_or(0.0),
        })
    }
}

/// Geometric annualization of the mean period return.
pub fn annual_return(returns: ArrayView1<'_, f64>, periods_per_year: u32) -> Option<f64> {
    let m = mean(returns)?;
    let annual = (1.0 + m).powf(f64::from(periods_per_year)) - 1.0;
    annual.is_finite().then_some(annual)
}

/// Sample standard deviation scaled by the square root of the period count.
pub fn annual_volatility(returns: ArrayView1<'_, f64>, periods_per_year: u32) -> Option<f64> {
    sample_std(returns).map(|std| std * f64::from(periods_per_year).sqrt())
}

/// `(mean - rf) / std`, `None` for a zero, negligible or undefined deviation.
pub fn sharpe_ratio(returns: ArrayView1<'_, f64>, rf: f64) -> Option<f64> {
    let m = mean(returns)?;
    let std = dispersion_std(returns)?;
    checked_ratio(m - rf, std)
}

/// `(mean - rf) / downside std`, where the downside set is every return
/// strictly below `rf`. Needs at least two downside observations.
pub fn sortino_ratio(returns: ArrayView1<'_, f64>, rf: f64) -> Option<f64> {
    let m = mean(returns)?;
    let downside: Array1<f64> = returns.iter().copied().filter(|r| *r < rf).collect();
    let downside_std = dispersion_std(downside.view())?;
    checked_ratio(m - rf, downside_std)
}

/// Most negative relative distance from the running peak of `cumprod(1 + r)`.
///
/// The running peak starts at the first compounded value, so a loss in the
/// first period alone does not register as a drawdown.
pub fn max_drawdown(returns: ArrayView1<'_, f64>) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let mut wealth = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if let Some(drawdown) = checked_ratio(wealth - peak, peak) {
            worst = worst.min(drawdown);
        }
    }
    Some(worst)
}
