//! Systematic / idiosyncratic variance split
//!
//! Var(r_a) ≈ β² * Var(r_m) + Var(ε)

use crate::{capm::FactorModelResult, stats::sample_variance};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Per-period variance attributed to the benchmark and to the residual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskDecomposition {
    /// `β² * Var(market)`
    pub systematic_variance: f64,
    /// `Var(residuals)`
    pub idiosyncratic_variance: f64,
    /// Systematic fraction of the total, `None` when the total is zero
    pub systematic_share: Option<f64>,
    /// Idiosyncratic fraction of the total, `None` when the total is zero
    pub idiosyncratic_share: Option<f64>,
}

impl RiskDecomposition {
    /// Split variance using a fitted regression and the benchmark returns it
    /// was fitted on.
    pub fn compute(fit: &FactorModelResult, market: ArrayView1<'_, f64>) -> Self {
        // Both series carry at least two observations after a successful fit.
        let market_variance = sample_variance(market).unwrap_or(0.0);
        let residual_variance = sample_variance(fit.residuals.view()).unwrap_or(0.0);

        Self::from_components(fit.beta.value.powi(2) * market_variance, residual_variance)
    }

    /// Build from the two variance components.
    pub fn from_components(systematic_variance: f64, idiosyncratic_variance: f64) -> Self {
        let total = systematic_variance + idiosyncratic_variance;
        let (systematic_share, idiosyncratic_share) = if total > 0.0 && total.is_finite() {
            let systematic = (systematic_variance / total).clamp(0.0, 1.0);
            (Some(systematic), Some(1.0 - systematic))
        } else {
            (None, None)
        };

        Self {
            systematic_variance,
            idiosyncratic_variance,
            systematic_share,
            idiosyncratic_share,
        }
    }

    /// Sum of both components.
    pub fn total_variance(&self) -> f64 {
        self.systematic_variance + self.idiosyncratic_variance
    }

    /// Whether the shares are defined.
    pub const fn is_defined(&self) -> bool {
        self.systematic_share.is_some()
    }
}
