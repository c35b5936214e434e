//! Prize curves: finishing position to share of the net pool.

use super::{
    errors::{CurveViolation, PrizeError, PrizeResult},
    money::{BPS_DENOMINATOR, BasisPoints, format_bps},
};
use crate::bracket::BracketShape;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Share of the net pool paid to one finishing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutShare {
    /// Finishing position (1-indexed)
    pub position: usize,
    /// Share in basis points
    pub bps: BasisPoints,
}

const fn share(position: usize, bps: BasisPoints) -> PayoutShare {
    PayoutShare { position, bps }
}

const STANDARD: [PayoutShare; 4] = [share(1, 6000), share(2, 2500), share(3, 750), share(4, 750)];
const WINNER_TAKES_ALL: [PayoutShare; 1] = [share(1, 10_000)];
const TOP_HEAVY: [PayoutShare; 3] = [share(1, 7000), share(2, 2000), share(3, 1000)];
const BALANCED: [PayoutShare; 4] = [share(1, 5000), share(2, 3000), share(3, 1200), share(4, 800)];

/// Prize curve template, independent of any bracket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrizeCurve {
    /// 60 / 25 / 7.5 / 7.5
    #[default]
    Standard,
    /// 100
    WinnerTakesAll,
    /// 70 / 20 / 10
    TopHeavy,
    /// 50 / 30 / 12 / 8
    Balanced,
    /// Organizer-defined shares
    Custom {
        name: String,
        shares: Vec<PayoutShare>,
    },
}

impl PrizeCurve {
    /// Built-in curves
    pub const BUILT_IN: [PrizeCurve; 4] = [
        PrizeCurve::Standard,
        PrizeCurve::WinnerTakesAll,
        PrizeCurve::TopHeavy,
        PrizeCurve::Balanced,
    ];

    /// Custom curve paying `percentages` (in bps) to positions 1, 2, ...
    pub fn custom(name: impl Into<String>, percentages: &[BasisPoints]) -> Self {
        Self::Custom {
            name: name.into(),
            shares: percentages
                .iter()
                .enumerate()
                .map(|(index, bps)| share(index + 1, *bps))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Standard => "standard",
            Self::WinnerTakesAll => "winner-takes-all",
            Self::TopHeavy => "top-heavy",
            Self::Balanced => "balanced",
            Self::Custom { name, .. } => name,
        }
    }

    pub fn shares(&self) -> &[PayoutShare] {
        match self {
            Self::Standard => &STANDARD,
            Self::WinnerTakesAll => &WINNER_TAKES_ALL,
            Self::TopHeavy => &TOP_HEAVY,
            Self::Balanced => &BALANCED,
            Self::Custom { shares, .. } => shares,
        }
    }

    /// Number of paid positions
    pub fn paid_positions(&self) -> usize {
        self.shares().len()
    }

    /// Shares ordered by position
    pub(crate) fn sorted_shares(&self) -> Vec<PayoutShare> {
        let mut shares = self.shares().to_vec();
        shares.sort_by_key(|s| s.position);
        shares
    }

    /// Check the curve on its own: contiguous positions and an exact 100%
    pub fn validate(&self) -> PrizeResult<()> {
        validate_curve(self)
    }

    /// Check the curve against the bracket it will pay out for
    pub fn bind_to(&self, shape: &BracketShape) -> PrizeResult<()> {
        self.validate()?;

        let max = shape.max_paid_positions();
        if self.paid_positions() > max {
            return Err(CurveViolation::TooManyPositions {
                positions: self.paid_positions(),
                max,
            }
            .into());
        }

        Ok(())
    }
}

/// Validate a curve template.
///
/// Positions must be exactly `1..=k` and the shares must sum to 10000 bps.
pub fn validate_curve(curve: &PrizeCurve) -> PrizeResult<()> {
    let shares = curve.sorted_shares();
    if shares.is_empty() {
        return Err(CurveViolation::Empty.into());
    }

    if let Some(pair) = shares.windows(2).find(|pair| pair[0].position == pair[1].position) {
        return Err(CurveViolation::DuplicatePosition(pair[0].position).into());
    }

    for (index, share) in shares.iter().enumerate() {
        if share.position != index + 1 {
            return Err(CurveViolation::PositionGap {
                expected: index + 1,
                found: share.position,
            }
            .into());
        }
    }

    let total_bps: u64 = shares.iter().map(|s| u64::from(s.bps)).sum();
    if total_bps != u64::from(BPS_DENOMINATOR) {
        return Err(CurveViolation::SumMismatch { total_bps }.into());
    }

    Ok(())
}

impl FromStr for PrizeCurve {
    type Err = PrizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "winner-takes-all" | "winner_takes_all" => Ok(Self::WinnerTakesAll),
            "top-heavy" | "top_heavy" => Ok(Self::TopHeavy),
            "balanced" => Ok(Self::Balanced),
            _ => Err(PrizeError::UnknownCurve(s.to_string())),
        }
    }
}

impl fmt::Display for PrizeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shares: Vec<String> = self
            .sorted_shares()
            .iter()
            .map(|s| format_bps(s.bps))
            .collect();
        write!(f, "{} ({})", self.name(), shares.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::derive_shape;

    #[test]
    fn test_built_in_curves_are_valid() {
        for curve in PrizeCurve::BUILT_IN {
            assert_eq!(curve.validate(), Ok(()), "{curve} should be valid");
        }
    }

    #[test]
    fn test_rejects_sum_mismatch() {
        let curve = PrizeCurve::custom("short", &[6000, 3000]);
        assert_eq!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::SumMismatch {
                total_bps: 9000
            }))
        );

        let curve = PrizeCurve::custom("long", &[6000, 3000, 1001]);
        assert!(matches!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::SumMismatch { .. }))
        ));
    }

    #[test]
    fn test_rejects_empty_curve() {
        let curve = PrizeCurve::custom("empty", &[]);
        assert_eq!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::Empty))
        );
    }

    #[test]
    fn test_rejects_duplicate_positions() {
        let curve = PrizeCurve::Custom {
            name: "dup".to_string(),
            shares: vec![share(1, 5000), share(2, 2500), share(2, 2500)],
        };
        assert_eq!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::DuplicatePosition(2)))
        );
    }

    #[test]
    fn test_rejects_position_gaps() {
        let curve = PrizeCurve::Custom {
            name: "gap".to_string(),
            shares: vec![share(1, 5000), share(3, 5000)],
        };
        assert_eq!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::PositionGap {
                expected: 2,
                found: 3
            }))
        );

        let curve = PrizeCurve::Custom {
            name: "no-winner".to_string(),
            shares: vec![share(2, 10_000)],
        };
        assert!(matches!(
            curve.validate(),
            Err(PrizeError::InvalidCurve(CurveViolation::PositionGap { .. }))
        ));
    }

    #[test]
    fn test_accepts_unordered_positions() {
        let curve = PrizeCurve::Custom {
            name: "shuffled".to_string(),
            shares: vec![share(2, 4000), share(1, 6000)],
        };
        assert_eq!(curve.validate(), Ok(()));
    }

    #[test]
    fn test_bind_rejects_more_positions_than_bracket_distinguishes() {
        let shape = derive_shape(4).unwrap();
        assert_eq!(PrizeCurve::Standard.bind_to(&shape), Ok(()));

        let curve = PrizeCurve::custom("five", &[6000, 1000, 1000, 1000, 1000]);
        assert_eq!(
            curve.bind_to(&shape),
            Err(PrizeError::InvalidCurve(CurveViolation::TooManyPositions {
                positions: 5,
                max: 4
            }))
        );

        // 16 players: champion plus the three Final losers
        let sixteen = derive_shape(16).unwrap();
        assert_eq!(PrizeCurve::Balanced.bind_to(&sixteen), Ok(()));
        assert_eq!(
            curve.bind_to(&sixteen),
            Err(PrizeError::InvalidCurve(CurveViolation::TooManyPositions {
                positions: 5,
                max: 4
            }))
        );
        assert_eq!(
            PrizeCurve::custom("sixteen", &[625; 16]).bind_to(&sixteen),
            Err(PrizeError::InvalidCurve(CurveViolation::TooManyPositions {
                positions: 16,
                max: 4
            }))
        );

        // 64 players also pays the Semifinal losers
        let sixty_four = derive_shape(64).unwrap();
        assert_eq!(
            PrizeCurve::custom("sixteen", &[625; 16]).bind_to(&sixty_four),
            Ok(())
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("standard".parse(), Ok(PrizeCurve::Standard));
        assert_eq!("Winner-Takes-All".parse(), Ok(PrizeCurve::WinnerTakesAll));
        assert_eq!("top_heavy".parse(), Ok(PrizeCurve::TopHeavy));
        assert_eq!(
            "flat".parse::<PrizeCurve>(),
            Err(PrizeError::UnknownCurve("flat".to_string()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PrizeCurve::Standard.to_string(), "standard (60/25/7.5/7.5)");
        assert_eq!(PrizeCurve::WinnerTakesAll.to_string(), "winner-takes-all (100)");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&PrizeCurve::WinnerTakesAll).unwrap(),
            "\"winner-takes-all\""
        );
        let custom: PrizeCurve = serde_json::from_str(
            r#"{"custom":{"name":"duo","shares":[{"position":1,"bps":7500},{"position":2,"bps":2500}]}}"#,
        )
        .unwrap();
        assert_eq!(custom, PrizeCurve::custom("duo", &[7500, 2500]));
    }
}
