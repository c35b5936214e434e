//! Closed-form derivation of single-elimination bracket shapes.
//!
//! Every match seats [`MATCH_ARITY`] participants and only the winner moves on,
//! so a bracket exists exactly for player counts that are powers of four.

use super::errors::{BracketError, BracketResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Participants per match
pub const MATCH_ARITY: usize = 4;

/// Smallest bracket: a single final
pub const MIN_PLAYER_COUNT: usize = MATCH_ARITY;

/// Derived topology of a bracket.
///
/// Serialized as its player count and re-derived on deserialization, so a
/// stored shape can never disagree with the closed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub struct BracketShape {
    player_count: usize,
    rounds: u32,
    matches_per_round: Vec<usize>,
    total_matches: usize,
}

/// Participants that finish at the same, indistinguishable place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    /// Round the cohort was knocked out in; `None` for the champion
    pub eliminated_in: Option<u32>,
    /// Number of participants in the cohort
    pub size: usize,
    /// Best finishing position the cohort occupies (1-indexed)
    pub first_position: usize,
    /// Worst finishing position the cohort occupies
    pub last_position: usize,
}

impl Cohort {
    /// Finishing positions shared by the cohort
    pub fn positions(&self) -> RangeInclusive<usize> {
        self.first_position..=self.last_position
    }

    pub fn is_champion(&self) -> bool {
        self.eliminated_in.is_none()
    }
}

/// Derive the bracket shape for `player_count` participants.
///
/// Fails with [`BracketError::InvalidBracketSize`] unless the count is
/// `4^r` for some `r >= 1`.
pub fn derive_shape(player_count: usize) -> BracketResult<BracketShape> {
    let rounds = rounds_for(player_count).ok_or(BracketError::InvalidBracketSize(player_count))?;

    let mut matches_per_round = Vec::with_capacity(rounds as usize);
    let mut matches = player_count / MATCH_ARITY;
    for _ in 0..rounds {
        matches_per_round.push(matches);
        matches /= MATCH_ARITY;
    }
    let total_matches = matches_per_round.iter().sum();

    Ok(BracketShape {
        player_count,
        rounds,
        matches_per_round,
        total_matches,
    })
}

/// `log4(player_count)`, or `None` if the count is not a power of four >= 4
fn rounds_for(player_count: usize) -> Option<u32> {
    if player_count < MIN_PLAYER_COUNT {
        return None;
    }

    // Divide down to 1; any remainder on the way means not a power of four
    let mut remaining = player_count;
    let mut rounds = 0;
    while remaining > 1 {
        if remaining % MATCH_ARITY != 0 {
            return None;
        }
        remaining /= MATCH_ARITY;
        rounds += 1;
    }

    Some(rounds)
}

/// Label for `round` (1-indexed) in a bracket of `rounds` rounds.
///
/// Counted from the end: Final, Semifinals, Quarterfinals, then "Round N"
/// counted from the start.
pub fn round_label(round: u32, rounds: u32) -> String {
    match rounds.checked_sub(round) {
        Some(0) => "Final".to_string(),
        Some(1) => "Semifinals".to_string(),
        Some(2) => "Quarterfinals".to_string(),
        _ => format!("Round {round}"),
    }
}

impl BracketShape {
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn match_arity(&self) -> usize {
        MATCH_ARITY
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn matches_per_round(&self) -> &[usize] {
        &self.matches_per_round
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    /// Number of matches in `round` (1-indexed)
    pub fn matches_in_round(&self, round: u32) -> Option<usize> {
        let index = usize::try_from(round).ok()?.checked_sub(1)?;
        self.matches_per_round.get(index).copied()
    }

    /// Label for `round` (1-indexed)
    pub fn round_label(&self, round: u32) -> String {
        round_label(round, self.rounds)
    }

    /// Labels for every round, first round first
    pub fn round_labels(&self) -> Vec<String> {
        (1..=self.rounds).map(|round| self.round_label(round)).collect()
    }

    /// Finishing cohorts, best first.
    ///
    /// The champion occupies position 1, the three losers of the Final share
    /// positions 2..=4, the losers of the round before share 5..=16, and so on
    /// until the first round's losers close out at `player_count`.
    pub fn cohorts(&self) -> Vec<Cohort> {
        let mut cohorts = Vec::with_capacity(self.rounds as usize + 1);
        cohorts.push(Cohort {
            eliminated_in: None,
            size: 1,
            first_position: 1,
            last_position: 1,
        });

        // Later eliminations finish higher
        let mut next_position = 2;
        for round in (1..=self.rounds).rev() {
            let size = self.matches_in_round(round).unwrap_or(0) * (MATCH_ARITY - 1);
            cohorts.push(Cohort {
                eliminated_in: Some(round),
                size,
                first_position: next_position,
                last_position: next_position + size - 1,
            });
            next_position += size;
        }

        cohorts
    }

    /// Cohort occupying finishing `position` (1-indexed)
    pub fn cohort_for_position(&self, position: usize) -> Option<Cohort> {
        self.cohorts()
            .into_iter()
            .find(|cohort| cohort.positions().contains(&position))
    }

    /// Number of finishing positions a prize curve may pay.
    ///
    /// Positions are paid through the cohort eliminated in round 2, so the
    /// round 1 losers are never paid: `player_count / 4` positions. A single
    /// match bracket pays through its Final losers, positions `1..=4`.
    pub fn max_paid_positions(&self) -> usize {
        (self.player_count / MATCH_ARITY).max(MATCH_ARITY)
    }
}

impl From<BracketShape> for usize {
    fn from(shape: BracketShape) -> Self {
        shape.player_count
    }
}

impl TryFrom<usize> for BracketShape {
    type Error = BracketError;

    fn try_from(player_count: usize) -> BracketResult<Self> {
        derive_shape(player_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_final_bracket() {
        let shape = derive_shape(4).unwrap();
        assert_eq!(shape.rounds(), 1);
        assert_eq!(shape.matches_per_round(), &[1]);
        assert_eq!(shape.total_matches(), 1);
        assert_eq!(shape.round_labels(), vec!["Final"]);
    }

    #[test]
    fn test_sixteen_player_bracket() {
        let shape = derive_shape(16).unwrap();
        assert_eq!(shape.rounds(), 2);
        assert_eq!(shape.matches_per_round(), &[4, 1]);
        assert_eq!(shape.total_matches(), 5);
        assert_eq!(shape.round_labels(), vec!["Semifinals", "Final"]);
    }

    #[test]
    fn test_rejects_non_powers_of_four() {
        for count in [0, 1, 2, 3, 8, 10, 12, 15, 32, 100, 128] {
            assert_eq!(
                derive_shape(count),
                Err(BracketError::InvalidBracketSize(count)),
                "{count} should be rejected"
            );
        }
    }

    #[test]
    fn test_labels_for_deep_bracket() {
        let shape = derive_shape(4096).unwrap();
        assert_eq!(
            shape.round_labels(),
            vec![
                "Round 1",
                "Round 2",
                "Round 3",
                "Quarterfinals",
                "Semifinals",
                "Final"
            ]
        );
    }

    #[test]
    fn test_matches_in_round_bounds() {
        let shape = derive_shape(64).unwrap();
        assert_eq!(shape.matches_in_round(0), None);
        assert_eq!(shape.matches_in_round(1), Some(16));
        assert_eq!(shape.matches_in_round(3), Some(1));
        assert_eq!(shape.matches_in_round(4), None);
    }

    #[test]
    fn test_cohorts_cover_every_position() {
        let shape = derive_shape(64).unwrap();
        let cohorts = shape.cohorts();

        assert_eq!(cohorts.len(), 4);
        assert_eq!(cohorts[0].positions(), 1..=1);
        assert_eq!(cohorts[1].positions(), 2..=4);
        assert_eq!(cohorts[1].eliminated_in, Some(3));
        assert_eq!(cohorts[2].positions(), 5..=16);
        assert_eq!(cohorts[3].positions(), 17..=64);

        let covered: usize = cohorts.iter().map(|c| c.size).sum();
        assert_eq!(covered, shape.player_count());
    }

    #[test]
    fn test_cohort_for_position() {
        let shape = derive_shape(16).unwrap();
        assert!(shape.cohort_for_position(1).unwrap().is_champion());
        assert_eq!(shape.cohort_for_position(3).unwrap().eliminated_in, Some(2));
        assert_eq!(shape.cohort_for_position(16).unwrap().eliminated_in, Some(1));
        assert_eq!(shape.cohort_for_position(17), None);
    }

    #[test]
    fn test_serde_rederives_shape() {
        let shape = derive_shape(256).unwrap();
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(json, "256");

        let back: BracketShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);

        assert!(serde_json::from_str::<BracketShape>("100").is_err());
    }
}
