//! Target-volatility allocation on the capital allocation line

use serde::{Deserialize, Serialize};

/// Split between the risky asset and the risk-free instrument.
///
/// The weights always sum to one. A risky weight above one means borrowing at
/// the risk-free rate; it is kept as computed and reported as leveraged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeights {
    /// Fraction in the risky asset
    pub risky_weight: f64,
    /// Fraction in the risk-free instrument
    pub risk_free_weight: f64,
}

impl PortfolioWeights {
    /// Scale the risky position so the portfolio hits `target_volatility`.
    ///
    /// Returns `None` when the asset volatility is missing, not finite, or not
    /// positive.
    pub fn target_volatility(
        asset_volatility: Option<f64>,
        target_volatility: f64,
    ) -> Option<Self> {
        let vol = asset_volatility.filter(|v| v.is_finite() && *v > 0.0)?;
        let risky_weight = target_volatility / vol;
        risky_weight.is_finite().then(|| Self {
            risky_weight,
            risk_free_weight: 1.0 - risky_weight,
        })
    }

    /// Whether the allocation borrows at the risk-free rate.
    pub fn is_leveraged(&self) -> bool {
        self.risky_weight > 1.0
    }

    /// Row description for the risky leg.
    pub fn risky_explanation(&self) -> &'static str {
        if self.is_leveraged() {
            "Leveraged risky asset allocation (target volatility exceeds asset volatility)"
        } else {
            "Scaled risky asset allocation"
        }
    }

    /// Row description for the risk-free leg.
    pub fn risk_free_explanation(&self) -> &'static str {
        if self.is_leveraged() {
            "Risk-free borrowing funding the leveraged position"
        } else {
            "Risk-free allocation"
        }
    }
}
