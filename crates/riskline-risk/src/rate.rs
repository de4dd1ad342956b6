//! Risk-free rate conversion.

use serde::{Deserialize, Serialize};

/// Risk-free rate held constant over the sample.
///
/// The per-period rate is the geometric de-annualization
/// `(1 + annual)^(1 / periods_per_year) - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeRate {
    annual: f64,
    periods_per_year: u32,
    per_period: f64,
}

impl RiskFreeRate {
    /// Derive the per-period rate from an annual rate.
    ///
    /// `periods_per_year` must be positive; configuration validation
    /// guarantees this for pipeline runs.
    pub fn from_annual(annual: f64, periods_per_year: u32) -> Self {
        let per_period = (1.0 + annual).powf(1.0 / f64::from(periods_per_year)) - 1.0;
        Self {
            annual,
            periods_per_year,
            per_period,
        }
    }

    /// Annual rate as configured.
    pub const fn annual(&self) -> f64 {
        self.annual
    }

    /// Annualization base.
    pub const fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    /// Rate per return period.
    pub const fn per_period(&self) -> f64 {
        self.per_period
    }
}
