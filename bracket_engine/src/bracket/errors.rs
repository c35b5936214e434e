//! Bracket error types.

use super::progression::{MatchRef, ParticipantId};
use thiserror::Error;

/// Why a match result was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchStateViolation {
    #[error("match does not exist in this bracket")]
    UnknownMatch,

    #[error("winner already recorded")]
    AlreadyDecided,

    #[error("match is still waiting for occupants")]
    NotReady,

    #[error("round {active} is the active round")]
    RoundNotActive { active: u32 },

    #[error("participant {0} does not occupy this match")]
    NotAnOccupant(ParticipantId),
}

/// Bracket errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Player count is not a power of the match arity
    #[error("Invalid bracket size {0}: player count must be a power of 4, at least 4")]
    InvalidBracketSize(usize),

    /// Winner report that cannot be applied to the current bracket
    #[error("Invalid match state for {match_ref}: {reason}")]
    InvalidMatchState {
        match_ref: MatchRef,
        reason: MatchStateViolation,
    },

    /// Round-1 seeding that is not one distinct participant per slot
    #[error("Invalid seeding: {0}")]
    InvalidSeeding(String),
}

impl BracketError {
    pub(crate) fn match_state(match_ref: MatchRef, reason: MatchStateViolation) -> Self {
        Self::InvalidMatchState { match_ref, reason }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
