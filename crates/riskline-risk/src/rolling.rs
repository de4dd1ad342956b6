//! Rolling Sharpe ratio and rolling beta over a trailing window.

use crate::{
    metrics::sharpe_ratio,
    rate::RiskFreeRate,
    returns::AlignedReturns,
    stats::{checked_ratio, dispersion_variance, sample_covariance},
};
use chrono::NaiveDate;
use ndarray::s;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Rolling analysis errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollingError {
    /// Window too short for a sample deviation
    #[error("Rolling window must cover at least 2 observations, got {window}")]
    InvalidWindow {
        /// Requested window length
        window: usize,
    },
}

/// Statistics of the window ending at `date`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    /// Last date of the window
    pub date: NaiveDate,
    /// Per-period Sharpe ratio of the asset over the window
    pub sharpe: f64,
    /// Asset beta to the benchmark over the window
    pub beta: f64,
}

/// Rolling statistics for every full window with finite values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingMetrics {
    /// Window length
    pub window: usize,
    /// Retained windows in date order
    pub points: Vec<RollingPoint>,
    /// Full windows dropped because a statistic was undefined
    pub degenerate_windows: usize,
}

impl RollingMetrics {
    /// Number of retained windows.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no window was retained.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trailing-window analyzer
#[derive(Debug, Clone, Copy)]
pub struct RollingAnalyzer {
    window: usize,
    risk_free: RiskFreeRate,
}

impl RollingAnalyzer {
    /// Create an analyzer for windows of `window` observations.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::InvalidWindow`] if `window < 2`.
    pub const fn new(window: usize, risk_free: RiskFreeRate) -> Result<Self, RollingError> {
        if window < 2 {
            return Err(RollingError::InvalidWindow { window });
        }
        Ok(Self { window, risk_free })
    }

    /// Window length.
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Compute statistics for each window `[t - W + 1, t]`.
    ///
    /// A series shorter than the window yields no points.
    pub fn analyze(&self, aligned: &AlignedReturns) -> RollingMetrics {
        let w = self.window;
        let n = aligned.len();
        let rf = self.risk_free.per_period();
        let mut points = Vec::with_capacity((n + 1).saturating_sub(w));
        let mut degenerate_windows = 0;

        for end in w..=n {
            let asset = aligned.asset().slice(s![end - w..end]);
            let market = aligned.market().slice(s![end - w..end]);

            let sharpe = sharpe_ratio(asset, rf);
            let beta = dispersion_variance(market)
                .and_then(|var| checked_ratio(sample_covariance(asset, market)?, var));

            match (sharpe, beta) {
                (Some(sharpe), Some(beta)) => points.push(RollingPoint {
                    date: aligned.dates()[end - 1],
                    sharpe,
                    beta,
                }),
                _ => degenerate_windows += 1,
            }
        }

        debug!(
            window = w,
            points = points.len(),
            degenerate_windows,
            "computed rolling metrics"
        );

        RollingMetrics {
            window: w,
            points,
            degenerate_windows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::{ReturnSeries, align};
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + chrono::Days::new(i as u64)
    }

    fn aligned(asset: &[f64], market: &[f64]) -> AlignedReturns {
        align(
            &ReturnSeries::from_observations(asset.iter().enumerate().map(|(i, v)| (day(i), *v))),
            &ReturnSeries::from_observations(market.iter().enumerate().map(|(i, v)| (day(i), *v))),
        )
        .unwrap()
    }

    fn zero_rate() -> RiskFreeRate {
        RiskFreeRate::from_annual(0.0, 252)
    }

    #[test]
    fn test_window_below_two_is_rejected() {
        assert_eq!(
            RollingAnalyzer::new(1, zero_rate()).unwrap_err(),
            RollingError::InvalidWindow { window: 1 }
        );
        assert!(RollingAnalyzer::new(2, zero_rate()).is_ok());
    }

    #[test]
    fn test_length_for_random_series() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 120;
        let asset: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.03..0.03)).collect();
        let market: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.02..0.02)).collect();
        let data = aligned(&asset, &market);

        for w in [2, 5, 20, 60, 120] {
            let rolling = RollingAnalyzer::new(w, zero_rate()).unwrap().analyze(&data);
            assert_eq!(rolling.len(), n - w + 1);
            assert_eq!(rolling.degenerate_windows, 0);
            assert_eq!(rolling.points.last().unwrap().date, day(n - 1));
            assert_eq!(rolling.points[0].date, day(w - 1));
        }
    }

    #[test]
    fn test_window_longer_than_series_is_empty() {
        let data = aligned(&[0.01, 0.02, -0.01], &[0.01, 0.0, 0.02]);
        let rolling = RollingAnalyzer::new(4, zero_rate()).unwrap().analyze(&data);
        assert!(rolling.is_empty());
        assert_eq!(rolling.degenerate_windows, 0);
    }

    #[test]
    fn test_window_values() {
        let asset = [0.01, 0.03, -0.02, 0.02];
        let market = [0.005, 0.02, -0.01, 0.01];
        let data = aligned(&asset, &market);
        let rolling = RollingAnalyzer::new(3, zero_rate()).unwrap().analyze(&data);
        assert_eq!(rolling.len(), 2);

        let last_asset = array![0.03, -0.02, 0.02];
        let last_market = array![0.02, -0.01, 0.01];
        let point = rolling.points[1];
        assert_relative_eq!(
            point.sharpe,
            last_asset.mean().unwrap() / last_asset.std(1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            point.beta,
            sample_covariance(last_asset.view(), last_market.view()).unwrap()
                / last_market.var(1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sharpe_subtracts_risk_free_rate() {
        let asset = [0.01, 0.03, -0.02, 0.02];
        let market = [0.005, 0.02, -0.01, 0.01];
        let rate = RiskFreeRate::from_annual(0.06, 252);
        let rolling = RollingAnalyzer::new(3, rate)
            .unwrap()
            .analyze(&aligned(&asset, &market));

        let first = array![0.01, 0.03, -0.02];
        let rf = rate.per_period();
        assert!(rf > 0.0);
        assert_relative_eq!(
            rolling.points[0].sharpe,
            (first.mean().unwrap() - rf) / first.std(1.0),
            epsilon = 1e-12
        );
        assert!(rolling.points[0].sharpe < first.mean().unwrap() / first.std(1.0));
    }

    #[test]
    fn test_constant_growth_market_windows_are_dropped() {
        let market_prices: Vec<f64> = (0..9).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let market: Vec<f64> = market_prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let asset = [0.012, -0.004, 0.021, 0.003, -0.015, 0.009, 0.017, -0.006];
        let data = aligned(&asset, &market);

        let rolling = RollingAnalyzer::new(3, zero_rate()).unwrap().analyze(&data);
        assert!(rolling.is_empty());
        assert_eq!(rolling.degenerate_windows, 6);
    }

    #[test]
    fn test_flat_market_windows_are_dropped() {
        let asset = [0.01, 0.03, -0.02, 0.02, 0.01];
        let market = [0.5, 0.5, 0.5, 0.01, 0.02];
        let data = aligned(&asset, &market);
        let rolling = RollingAnalyzer::new(3, zero_rate()).unwrap().analyze(&data);

        assert_eq!(rolling.degenerate_windows, 1);
        assert_eq!(rolling.len(), 2);
        assert_eq!(rolling.points[0].date, day(3));
    }
}
