//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use bracket_engine::prize::{
    BPS_DENOMINATOR, BasisPoints, Cents, PrizeCurve, format_amount, format_bps, parse_percent_bps,
};

/// Default house commission, percent
const DEFAULT_COMMISSION_RATE: &str = "10";

/// Default prize curve name
const DEFAULT_PRIZE_CURVE: &str = "standard";

/// Default currency symbol
const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Preview defaults loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// House commission in basis points
    pub commission_bps: BasisPoints,
    /// Prize curve
    pub prize_curve: PrizeCurve,
    /// Prefix for formatted amounts
    pub currency_symbol: String,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `commission_override` - Commission percent from `--commission`
    /// * `curve_override` - Curve from `--curve`
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn from_env(
        commission_override: Option<String>,
        curve_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let commission_rate = commission_override
            .or_else(|| std::env::var("BRACKET_COMMISSION_RATE").ok())
            .unwrap_or_else(|| DEFAULT_COMMISSION_RATE.to_string());
        let commission_bps =
            parse_percent_bps(&commission_rate).map_err(|e| ConfigError::Invalid {
                var: "BRACKET_COMMISSION_RATE".to_string(),
                reason: e.to_string(),
            })?;

        let curve = curve_override
            .or_else(|| std::env::var("BRACKET_PRIZE_CURVE").ok())
            .unwrap_or_else(|| DEFAULT_PRIZE_CURVE.to_string());
        let prize_curve = parse_curve(&curve)?;

        let currency_symbol = std::env::var("BRACKET_CURRENCY_SYMBOL")
            .unwrap_or_else(|_| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(CliConfig {
            commission_bps,
            prize_curve,
            currency_symbol,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commission_bps > BPS_DENOMINATOR {
            return Err(ConfigError::Invalid {
                var: "BRACKET_COMMISSION_RATE".to_string(),
                reason: format!(
                    "Must be at most 100, got {}",
                    format_bps(self.commission_bps)
                ),
            });
        }

        if let Err(e) = self.prize_curve.validate() {
            return Err(ConfigError::Invalid {
                var: "BRACKET_PRIZE_CURVE".to_string(),
                reason: e.to_string(),
            });
        }

        if self.currency_symbol.chars().count() > 4 {
            return Err(ConfigError::Invalid {
                var: "BRACKET_CURRENCY_SYMBOL".to_string(),
                reason: "Must be at most 4 characters".to_string(),
            });
        }

        Ok(())
    }

    /// Format minor units with the configured currency symbol
    pub fn money(&self, amount: Cents) -> String {
        format!("{}{}", self.currency_symbol, format_amount(amount))
    }
}

/// A curve name, or comma-separated percentages for a custom curve
fn parse_curve(input: &str) -> Result<PrizeCurve, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "BRACKET_PRIZE_CURVE".to_string(),
        reason,
    };

    if !input.contains(',') {
        return input.parse().map_err(|e| invalid(format!("{e}")));
    }

    let percentages = input
        .split(',')
        .map(parse_percent_bps)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(e.to_string()))?;
    Ok(PrizeCurve::custom("custom", &percentages))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: tests touching the environment run serially
        unsafe {
            std::env::remove_var("BRACKET_COMMISSION_RATE");
            std::env::remove_var("BRACKET_PRIZE_CURVE");
            std::env::remove_var("BRACKET_CURRENCY_SYMBOL");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = CliConfig::from_env(None, None).unwrap();
        assert_eq!(config.commission_bps, 1000);
        assert_eq!(config.prize_curve, PrizeCurve::Standard);
        assert_eq!(config.currency_symbol, "$");
        assert!(config.validate().is_ok());
        assert_eq!(config.money(4320), "$43.20");
    }

    #[test]
    #[serial]
    fn test_env_values() {
        clear_env();
        // SAFETY: serialized by #[serial]
        unsafe {
            std::env::set_var("BRACKET_COMMISSION_RATE", "7.5");
            std::env::set_var("BRACKET_PRIZE_CURVE", "top-heavy");
            std::env::set_var("BRACKET_CURRENCY_SYMBOL", "€");
        }

        let config = CliConfig::from_env(None, None).unwrap();
        assert_eq!(config.commission_bps, 750);
        assert_eq!(config.prize_curve, PrizeCurve::TopHeavy);
        assert_eq!(config.money(5), "€0.05");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_beat_env() {
        clear_env();
        // SAFETY: serialized by #[serial]
        unsafe {
            std::env::set_var("BRACKET_COMMISSION_RATE", "20");
        }

        let config =
            CliConfig::from_env(Some("5".to_string()), Some("60,40".to_string())).unwrap();
        assert_eq!(config.commission_bps, 500);
        assert_eq!(config.prize_curve, PrizeCurve::custom("custom", &[6000, 4000]));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparsable_values() {
        clear_env();
        let err = CliConfig::from_env(Some("ten".to_string()), None).unwrap_err();
        assert!(err.to_string().contains("BRACKET_COMMISSION_RATE"));

        let err = CliConfig::from_env(None, Some("jackpot".to_string())).unwrap_err();
        assert!(err.to_string().contains("BRACKET_PRIZE_CURVE"));
    }

    #[test]
    fn test_validation() {
        let mut config = CliConfig {
            commission_bps: 12_000,
            prize_curve: PrizeCurve::Standard,
            currency_symbol: "$".to_string(),
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        config.commission_bps = 1000;
        config.prize_curve = PrizeCurve::custom("custom", &[6000, 3000]);
        assert!(config.validate().is_err());

        config.prize_curve = PrizeCurve::Balanced;
        config.currency_symbol = "USDT$".to_string();
        assert!(config.validate().is_err());
    }
}
