//! Run configuration.

use riskline_output::ReportSettings;
use riskline_risk::RiskFreeRate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Annual risk-free rate is not finite or not above -100%
    #[error("Invalid annual risk-free rate: {0} (must be finite and greater than -1)")]
    InvalidRiskFreeRate(f64),

    /// Zero periods per year
    #[error("Periods per year must be positive")]
    InvalidPeriodsPerYear,

    /// Target volatility is not finite or negative
    #[error("Invalid target volatility: {0} (must be finite and non-negative)")]
    InvalidTargetVolatility(f64),

    /// Rolling window shorter than two observations
    #[error("Invalid rolling window: {0} (must be at least 2)")]
    InvalidWindow(usize),

    /// A required name is empty
    #[error("Empty {0}")]
    EmptyName(&'static str),

    /// Malformed configuration document
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything a run needs besides its input tables.
///
/// There are no defaults; every field must be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    /// Asset label used in report row headers
    pub asset_name: String,
    /// Preferred asset price column
    pub price_column: String,
    /// Annual risk-free rate, e.g. `0.06` for 6%
    pub annual_risk_free_rate: f64,
    /// Return periods per year, e.g. 252 for daily data
    pub periods_per_year: u32,
    /// Target annual volatility of the allocation
    pub target_volatility: f64,
    /// Rolling window length in periods
    pub rolling_window: usize,
}

impl RiskConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.annual_risk_free_rate.is_finite() || self.annual_risk_free_rate <= -1.0 {
            return Err(ConfigError::InvalidRiskFreeRate(self.annual_risk_free_rate));
        }
        if self.periods_per_year == 0 {
            return Err(ConfigError::InvalidPeriodsPerYear);
        }
        if !self.target_volatility.is_finite() || self.target_volatility < 0.0 {
            return Err(ConfigError::InvalidTargetVolatility(self.target_volatility));
        }
        if self.rolling_window < 2 {
            return Err(ConfigError::InvalidWindow(self.rolling_window));
        }
        if self.price_column.trim().is_empty() {
            return Err(ConfigError::EmptyName("price column"));
        }
        if self.asset_name.trim().is_empty() {
            return Err(ConfigError::EmptyName("asset name"));
        }
        Ok(())
    }

    /// Risk-free rate in per-period terms.
    pub fn risk_free_rate(&self) -> RiskFreeRate {
        RiskFreeRate::from_annual(self.annual_risk_free_rate, self.periods_per_year)
    }

    /// Configuration echo for the report.
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            annual_risk_free_rate: self.annual_risk_free_rate,
            per_period_risk_free_rate: self.risk_free_rate().per_period(),
            periods_per_year: self.periods_per_year,
            target_volatility: self.target_volatility,
            rolling_window: self.rolling_window,
            price_column: self.price_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> RiskConfig {
        RiskConfig {
            asset_name: "SBI".into(),
            price_column: "Adj Close".into(),
            annual_risk_free_rate: 0.06,
            periods_per_year: 252,
            target_volatility: 0.12,
            rolling_window: 60,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
        assert_eq!(config().report_settings().rolling_window, 60);
    }

    #[rstest]
    #[case(RiskConfig { annual_risk_free_rate: -1.0, ..config() })]
    #[case(RiskConfig { annual_risk_free_rate: f64::NAN, ..config() })]
    #[case(RiskConfig { periods_per_year: 0, ..config() })]
    #[case(RiskConfig { target_volatility: -0.1, ..config() })]
    #[case(RiskConfig { target_volatility: f64::INFINITY, ..config() })]
    #[case(RiskConfig { rolling_window: 1, ..config() })]
    #[case(RiskConfig { price_column: " ".into(), ..config() })]
    #[case(RiskConfig { asset_name: String::new(), ..config() })]
    fn test_invalid_config(#[case] config: RiskConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "asset_name": "SBI",
            "price_column": "Adj Close",
            "annual_risk_free_rate": 0.06,
            "periods_per_year": 252,
            "target_volatility": 0.12,
            "rolling_window": 60
        }"#;
        assert_eq!(RiskConfig::from_json_str(json).unwrap(), config());
    }

    #[test]
    fn test_json_requires_every_field() {
        let json = r#"{"asset_name": "SBI", "price_column": "Close"}"#;
        assert!(matches!(
            RiskConfig::from_json_str(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_is_validated() {
        let json = r#"{
            "asset_name": "SBI",
            "price_column": "Adj Close",
            "annual_risk_free_rate": 0.06,
            "periods_per_year": 252,
            "target_volatility": 0.12,
            "rolling_window": 1
        }"#;
        assert!(matches!(
            RiskConfig::from_json_str(json),
            Err(ConfigError::InvalidWindow(1))
        ));
    }
}
