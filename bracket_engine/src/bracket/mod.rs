//! Bracket topology and winner progression.
//!
//! This module provides:
//! - Shape derivation for four-player, winner-advances brackets
//! - Round labels and finishing cohorts
//! - Match seating and winner advancement
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::{Bracket, MatchRef, derive_shape};
//!
//! let shape = derive_shape(16).unwrap();
//! assert_eq!(shape.matches_per_round(), &[4, 1]);
//!
//! let participants: Vec<i64> = (1..=16).collect();
//! let mut bracket = Bracket::seeded(shape, &participants).unwrap();
//! bracket.record_winner(MatchRef::new(1, 1), 4).unwrap();
//! ```

pub mod errors;
pub mod progression;
pub mod shape;

pub use errors::{BracketError, BracketResult, MatchStateViolation};
pub use progression::{
    Advancement, Bracket, Match, MatchRef, ParticipantId, Round, Standing, Standings,
};
pub use shape::{BracketShape, Cohort, MATCH_ARITY, MIN_PLAYER_COUNT, derive_shape, round_label};
