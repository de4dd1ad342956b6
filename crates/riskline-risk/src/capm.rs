//! Single-factor (CAPM) regression
//!
//! Fits excess asset returns on excess benchmark returns by ordinary least
//! squares:
//!
//! r_a - rf = α + β * (r_m - rf) + ε
//!
//! Inference uses the classical homoskedastic standard errors with n - 2
//! residual degrees of freedom and two-sided Student t p-values.

use crate::{
    rate::RiskFreeRate,
    returns::{AlignedReturns, ReturnSeries},
    stats::{checked_ratio, is_negligible_spread},
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;
use tracing::debug;

/// Regression errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegressionError {
    /// Fewer than two aligned observations
    #[error("Insufficient observations for regression: need at least 2, have {observations}")]
    InsufficientObservations {
        /// Observations available
        observations: usize,
    },

    /// Benchmark excess returns have no variation
    #[error("Benchmark excess returns have zero variance over {observations} observations")]
    ZeroVarianceRegressor {
        /// Observations available
        observations: usize,
    },
}

/// One fitted coefficient with its inference statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientEstimate {
    /// Point estimate
    pub value: f64,
    /// Standard error, `None` without residual degrees of freedom
    pub std_error: Option<f64>,
    /// `value / std_error`
    pub t_stat: Option<f64>,
    /// Two-sided p-value of the t statistic
    pub p_value: Option<f64>,
}

impl CoefficientEstimate {
    fn new(value: f64, std_error: Option<f64>, t_dist: Option<&StudentsT>) -> Self {
        let t_stat = std_error.and_then(|se| checked_ratio(value, se));
        let p_value = match (t_stat, t_dist) {
            (Some(t), Some(dist)) => Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0)),
            _ => None,
        };
        Self {
            value,
            std_error,
            t_stat,
            p_value,
        }
    }
}

/// Fitted single-factor model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModelResult {
    /// Intercept (per-period excess return unexplained by the benchmark)
    pub alpha: CoefficientEstimate,
    /// Slope on the benchmark excess return
    pub beta: CoefficientEstimate,
    /// Coefficient of determination in `[0, 1]`; `None` when the excess asset
    /// returns are constant
    pub r_squared: Option<f64>,
    /// Residuals dated like the aligned returns
    pub residuals: ReturnSeries,
    /// Observations used in the fit
    pub observations: usize,
    /// `observations - 2`
    pub degrees_of_freedom: usize,
}

/// CAPM regression against a constant risk-free rate
#[derive(Debug, Clone, Copy)]
pub struct CapmRegression {
    risk_free: RiskFreeRate,
}

impl CapmRegression {
    /// Create a regression using `risk_free` to form excess returns.
    pub const fn new(risk_free: RiskFreeRate) -> Self {
        Self { risk_free }
    }

    /// Fit the model on aligned asset and benchmark returns.
    ///
    /// # Errors
    ///
    /// Returns [`RegressionError::InsufficientObservations`] for fewer than two
    /// observations and [`RegressionError::ZeroVarianceRegressor`] when the
    /// benchmark excess returns do not vary.
    pub fn fit(&self, aligned: &AlignedReturns) -> Result<FactorModelResult, RegressionError> {
        let rf = self.risk_free.per_period();
        let y = aligned.asset().mapv(|r| r - rf);
        let x = aligned.market().mapv(|r| r - rf);

        let (alpha, beta, residuals, r_squared, df) = ols(x.view(), y.view())?;
        debug!(
            observations = x.len(),
            alpha = alpha.value,
            beta = beta.value,
            "fitted CAPM regression"
        );

        Ok(FactorModelResult {
            alpha,
            beta,
            r_squared,
            residuals: ReturnSeries::from_parts(aligned.dates().to_vec(), residuals.to_vec()),
            observations: x.len(),
            degrees_of_freedom: df,
        })
    }
}

type OlsFit = (
    CoefficientEstimate,
    CoefficientEstimate,
    Array1<f64>,
    Option<f64>,
    usize,
);

fn ols(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Result<OlsFit, RegressionError> {
    let n = x.len();
    if n < 2 {
        return Err(RegressionError::InsufficientObservations { observations: n });
    }
    let n_f = n as f64;
    let x_mean = x.sum() / n_f;
    let y_mean = y.sum() / n_f;

    let sxx: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();
    let scale: f64 = x.iter().map(|v| v * v).sum();
    if is_negligible_spread(sxx, scale) {
        return Err(RegressionError::ZeroVarianceRegressor { observations: n });
    }

    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_mean) * (b - y_mean))
        .sum();
    let beta = sxy / sxx;
    let alpha = y_mean - beta * x_mean;

    let residuals = Array1::from_iter(
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| yi - alpha - beta * xi),
    );
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let r_squared = (sst > 0.0).then(|| (1.0 - ssr / sst).clamp(0.0, 1.0));

    let df = n - 2;
    let (alpha_se, beta_se, t_dist) = if df == 0 {
        (None, None, None)
    } else {
        let sigma2 = ssr / df as f64;
        (
            Some((sigma2 * (1.0 / n_f + x_mean * x_mean / sxx)).sqrt()),
            Some((sigma2 / sxx).sqrt()),
            StudentsT::new(0.0, 1.0, df as f64).ok(),
        )
    };

    Ok((
        CoefficientEstimate::new(alpha, alpha_se, t_dist.as_ref()),
        CoefficientEstimate::new(beta, beta_se, t_dist.as_ref()),
        residuals,
        r_squared,
        df,
    ))
}
