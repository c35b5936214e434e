//! Tournament error types.

use super::{
    models::{FieldError, LifecycleEvent, TournamentId, TournamentState},
    repository::RepositoryError,
};
use crate::{
    bracket::{BracketError, ParticipantId},
    prize::PrizeError,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error(transparent)]
    Prize(#[from] PrizeError),

    #[error("Illegal transition: cannot {event} while {from}")]
    IllegalTransition {
        from: TournamentState,
        event: LifecycleEvent,
    },

    #[error("Cannot {event} before {due_at}")]
    TransitionNotDue {
        event: LifecycleEvent,
        due_at: DateTime<Utc>,
    },

    #[error("Tournament not in correct state: expected {expected}, got {actual}")]
    InvalidState {
        expected: TournamentState,
        actual: TournamentState,
    },

    #[error("Registration closed at {0}")]
    RegistrationWindowClosed(DateTime<Utc>),

    #[error("Insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Participant already registered: {0}")]
    AlreadyRegistered(ParticipantId),

    #[error("Participant not registered: {0}")]
    NotRegistered(ParticipantId),

    #[error("Invalid schedule for {field}: {reason}")]
    InvalidSchedule { field: &'static str, reason: String },

    #[error("Invalid configuration: {}", format_field_errors(.0))]
    InvalidConfig(Vec<FieldError>),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TournamentError {
    /// Get a message that is safe to show to the reporting collaborator
    ///
    /// Storage errors are replaced with a generic message and tournament IDs
    /// are not echoed back.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Repository(_) => "Internal server error".to_string(),
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
