//! Organizer input as entered, converted once into a [`TournamentConfig`].

use super::{
    errors::TournamentError,
    models::{FieldError, TournamentConfig},
};
use crate::prize::{BasisPoints, PrizeCurve, parse_amount, parse_percent_bps};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Curve name that selects `custom_percentages`
pub const CUSTOM_CURVE: &str = "custom";

/// Tournament creation form.
///
/// Amounts are decimal currency strings (`"5.00"`), rates are percentages
/// (`"10"`, `"7.5"`). Empty `commission_rate` and `prize_curve` fall back to
/// the 10% default and the standard curve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentForm {
    pub name: String,
    pub player_count: String,
    pub entry_fee: String,
    pub commission_rate: String,
    pub prize_curve: String,
    /// Comma-separated percentages, position 1 first
    pub custom_percentages: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub tournament_start: Option<DateTime<Utc>>,
    pub start_when_full: bool,
}

impl TournamentForm {
    /// Convert to a validated configuration, or every problem by field
    pub fn to_config(&self) -> Result<TournamentConfig, Vec<FieldError>> {
        let mut errors = Vec::new();

        let player_count = match self.player_count.trim().parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                errors.push(FieldError::new(
                    "player_count",
                    format!("'{}' is not a whole number", self.player_count.trim()),
                ));
                0
            }
        };

        let entry_fee = parse_amount(&self.entry_fee).unwrap_or_else(|e| {
            errors.push(FieldError::new("entry_fee", e));
            0
        });

        let commission_bps = if self.commission_rate.trim().is_empty() {
            TournamentConfig::DEFAULT_COMMISSION_BPS
        } else {
            parse_percent_bps(&self.commission_rate).unwrap_or_else(|e| {
                errors.push(FieldError::new("commission_rate", e));
                0
            })
        };

        let prize_curve = self.parse_curve().unwrap_or_else(|e| {
            errors.push(e);
            PrizeCurve::Standard
        });

        let config = TournamentConfig {
            name: self.name.trim().to_string(),
            player_count,
            entry_fee,
            commission_bps,
            prize_curve,
            registration_start: self.registration_start,
            registration_end: self.registration_end,
            tournament_start: self.tournament_start,
            start_when_full: self.start_when_full,
        };

        // Placeholders for unparsable fields must not add a second error
        let unparsed: Vec<String> = errors.iter().map(|e| e.field.clone()).collect();
        errors.extend(
            config
                .field_errors()
                .into_iter()
                .filter(|e| !unparsed.contains(&e.field)),
        );

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }

    fn parse_curve(&self) -> Result<PrizeCurve, FieldError> {
        let name = self.prize_curve.trim();
        if name.is_empty() {
            return Ok(PrizeCurve::Standard);
        }
        if !name.eq_ignore_ascii_case(CUSTOM_CURVE) {
            return name
                .parse()
                .map_err(|e| FieldError::new("prize_curve", e));
        }

        let percentages = self
            .custom_percentages
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(parse_percent_bps)
            .collect::<Result<Vec<BasisPoints>, _>>()
            .map_err(|e| FieldError::new("custom_percentages", e))?;

        Ok(PrizeCurve::custom(CUSTOM_CURVE, &percentages))
    }
}

impl TryFrom<TournamentForm> for TournamentConfig {
    type Error = TournamentError;

    fn try_from(form: TournamentForm) -> Result<Self, Self::Error> {
        form.to_config().map_err(TournamentError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn form() -> TournamentForm {
        TournamentForm {
            name: "Friday Night".to_string(),
            player_count: "16".to_string(),
            entry_fee: "5.00".to_string(),
            commission_rate: "10".to_string(),
            prize_curve: "standard".to_string(),
            registration_start: at(8),
            registration_end: at(10),
            tournament_start: Some(at(12)),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form() {
        let config = form().to_config().unwrap();
        assert_eq!(config.player_count, 16);
        assert_eq!(config.entry_fee, 500);
        assert_eq!(config.commission_bps, 1000);
        assert_eq!(config.prize_curve, PrizeCurve::Standard);
        assert_eq!(config.derive_terms().unwrap().pool.net_pool, 7200);
    }

    #[test]
    fn test_defaults_for_blank_rate_and_curve() {
        let mut form = form();
        form.commission_rate = " ".to_string();
        form.prize_curve.clear();
        let config = form.to_config().unwrap();
        assert_eq!(config.commission_bps, TournamentConfig::DEFAULT_COMMISSION_BPS);
        assert_eq!(config.prize_curve, PrizeCurve::Standard);
    }

    #[test]
    fn test_custom_percentages() {
        let mut form = form();
        form.prize_curve = "Custom".to_string();
        form.custom_percentages = "50, 30, 12.5, 7.5".to_string();
        let config = form.to_config().unwrap();
        assert_eq!(
            config.prize_curve,
            PrizeCurve::custom("custom", &[5000, 3000, 1250, 750])
        );
    }

    #[test]
    fn test_custom_percentages_must_sum() {
        let mut form = form();
        form.prize_curve = "custom".to_string();
        form.custom_percentages = "50,30".to_string();
        let errors = form.to_config().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "prize_curve");
    }

    #[test]
    fn test_reports_every_field() {
        let mut form = form();
        form.player_count = "sixteen".to_string();
        form.entry_fee = "5.001".to_string();
        form.prize_curve = "jackpot".to_string();
        form.registration_end = at(7);

        let fields: Vec<String> = form
            .to_config()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec!["player_count", "entry_fee", "prize_curve", "registration_end"]
        );
    }

    #[test]
    fn test_try_from_wraps_errors() {
        let mut form = form();
        form.player_count = "10".to_string();
        assert!(matches!(
            TournamentConfig::try_from(form),
            Err(TournamentError::InvalidConfig(errors)) if errors[0].field == "player_count"
        ));
    }
}
