//! Tournament data models.

use super::errors::{TournamentError, TournamentResult};
use crate::{
    bracket::{BracketShape, MatchRef, ParticipantId, Standings, derive_shape},
    prize::{
        BasisPoints, Cents, PayoutSchedule, PrizeAward, PrizeCurve, PrizeError, PrizePool,
        compute_payouts, compute_pool,
    },
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Being configured by the organizer
    Draft,
    /// Accepting registrations
    RegistrationOpen,
    /// Registration over, waiting to start
    RegistrationClosed,
    /// Matches being played
    InProgress,
    /// Final decided
    Completed,
    /// Cancelled before completion
    Cancelled,
}

impl TournamentState {
    pub const ALL: [TournamentState; 6] = [
        TournamentState::Draft,
        TournamentState::RegistrationOpen,
        TournamentState::RegistrationClosed,
        TournamentState::InProgress,
        TournamentState::Completed,
        TournamentState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentState::Draft => "draft",
            TournamentState::RegistrationOpen => "registration_open",
            TournamentState::RegistrationClosed => "registration_closed",
            TournamentState::InProgress => "in_progress",
            TournamentState::Completed => "completed",
            TournamentState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TournamentState::Completed | TournamentState::Cancelled)
    }

    /// State reached by applying `event`, or `IllegalTransition`
    pub fn transition(self, event: LifecycleEvent) -> TournamentResult<TournamentState> {
        use LifecycleEvent as E;
        use TournamentState as S;

        match (self, event) {
            (S::Draft, E::OpenRegistration) => Ok(S::RegistrationOpen),
            (S::RegistrationOpen, E::CloseRegistration) => Ok(S::RegistrationClosed),
            (S::RegistrationClosed, E::ReopenRegistration) => Ok(S::RegistrationOpen),
            (S::RegistrationClosed, E::Start) => Ok(S::InProgress),
            (S::InProgress, E::Complete) => Ok(S::Completed),
            (S::Draft | S::RegistrationOpen | S::RegistrationClosed | S::InProgress, E::Cancel) => {
                Ok(S::Cancelled)
            }
            (from, event) => Err(TournamentError::IllegalTransition { from, event }),
        }
    }
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event driving a lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    OpenRegistration,
    CloseRegistration,
    ReopenRegistration,
    Start,
    Complete,
    Cancel,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::OpenRegistration,
        LifecycleEvent::CloseRegistration,
        LifecycleEvent::ReopenRegistration,
        LifecycleEvent::Start,
        LifecycleEvent::Complete,
        LifecycleEvent::Cancel,
    ];
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            LifecycleEvent::OpenRegistration => "open registration",
            LifecycleEvent::CloseRegistration => "close registration",
            LifecycleEvent::ReopenRegistration => "reopen registration",
            LifecycleEvent::Start => "start",
            LifecycleEvent::Complete => "complete",
            LifecycleEvent::Cancel => "cancel",
        };
        write!(f, "{repr}")
    }
}

/// What closed registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseTrigger {
    /// `registration_end` passed
    RegistrationEnded,
    /// Last seat filled with `start_when_full` set
    Full,
}

/// Field-level configuration problem for the organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Tournament configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Bracket capacity, a power of 4
    pub player_count: usize,
    /// Entry fee in minor units
    pub entry_fee: Cents,
    /// House commission in basis points
    pub commission_bps: BasisPoints,
    /// Payout curve
    pub prize_curve: PrizeCurve,
    /// Registration opens
    pub registration_start: DateTime<Utc>,
    /// Registration closes
    pub registration_end: DateTime<Utc>,
    /// Scheduled start; optional when `start_when_full`
    pub tournament_start: Option<DateTime<Utc>>,
    /// Close registration and start as soon as every seat is taken
    pub start_when_full: bool,
}

/// Everything derived from a valid configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTerms {
    pub shape: BracketShape,
    pub pool: PrizePool,
    pub schedule: PayoutSchedule,
}

impl TournamentConfig {
    /// House commission used by the presets (10%)
    pub const DEFAULT_COMMISSION_BPS: BasisPoints = 1000;

    /// Create a configuration that starts as soon as the bracket is full
    pub fn sit_and_go(
        name: String,
        player_count: usize,
        entry_fee: Cents,
        registration_start: DateTime<Utc>,
        registration_window: Duration,
    ) -> Self {
        Self {
            name,
            player_count,
            entry_fee,
            commission_bps: Self::DEFAULT_COMMISSION_BPS,
            prize_curve: PrizeCurve::Standard,
            registration_start,
            registration_end: registration_start + registration_window,
            tournament_start: None,
            start_when_full: true,
        }
    }

    /// Create a configuration that starts at a fixed time
    pub fn scheduled(
        name: String,
        player_count: usize,
        entry_fee: Cents,
        registration_start: DateTime<Utc>,
        registration_end: DateTime<Utc>,
        tournament_start: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            player_count,
            entry_fee,
            commission_bps: Self::DEFAULT_COMMISSION_BPS,
            prize_curve: PrizeCurve::Standard,
            registration_start,
            registration_end,
            tournament_start: Some(tournament_start),
            start_when_full: false,
        }
    }

    pub fn with_commission_bps(mut self, commission_bps: BasisPoints) -> Self {
        self.commission_bps = commission_bps;
        self
    }

    pub fn with_prize_curve(mut self, prize_curve: PrizeCurve) -> Self {
        self.prize_curve = prize_curve;
        self
    }

    /// Validate and derive bracket shape, pool and payout schedule.
    ///
    /// Returns the first problem found; see [`Self::field_errors`] for all.
    pub fn derive_terms(&self) -> TournamentResult<DerivedTerms> {
        let shape = derive_shape(self.player_count)?;
        let pool = compute_pool(self.entry_fee, self.player_count, self.commission_bps)?;
        self.prize_curve.bind_to(&shape)?;
        let schedule = compute_payouts(pool.net_pool, &self.prize_curve)?;
        self.check_schedule()?;

        Ok(DerivedTerms {
            shape,
            pool,
            schedule,
        })
    }

    fn check_schedule(&self) -> TournamentResult<()> {
        match self.schedule_errors().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Every problem with the name and the time windows
    fn schedule_errors(&self) -> Vec<TournamentError> {
        let invalid = |field: &'static str, reason: &str| TournamentError::InvalidSchedule {
            field,
            reason: reason.to_string(),
        };
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(invalid("name", "must not be empty"));
        }

        if self.registration_start >= self.registration_end {
            errors.push(invalid(
                "registration_end",
                "must be after registration start",
            ));
        }

        match self.tournament_start {
            Some(start) if start < self.registration_end => errors.push(invalid(
                "tournament_start",
                "must not be before registration end",
            )),
            None if !self.start_when_full => errors.push(invalid(
                "tournament_start",
                "required unless the tournament starts when full",
            )),
            _ => {}
        }

        errors
    }

    /// Every configuration problem, keyed by field
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let shape = match derive_shape(self.player_count) {
            Ok(shape) => Some(shape),
            Err(e) => {
                errors.push(FieldError::new("player_count", e));
                None
            }
        };

        match compute_pool(self.entry_fee, self.player_count, self.commission_bps) {
            Ok(_) => {}
            Err(e @ PrizeError::InvalidCommissionRate(_)) => {
                errors.push(FieldError::new("commission_rate", e))
            }
            Err(e) => errors.push(FieldError::new("entry_fee", e)),
        }

        let curve_check = match &shape {
            Some(shape) => self.prize_curve.bind_to(shape),
            None => self.prize_curve.validate(),
        };
        if let Err(e) = curve_check {
            errors.push(FieldError::new("prize_curve", e));
        }

        for error in self.schedule_errors() {
            if let TournamentError::InvalidSchedule { field, reason } = error {
                errors.push(FieldError::new(field, reason));
            }
        }

        errors
    }
}

/// Domain event published after a successful change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentEvent {
    StateChanged {
        tournament_id: TournamentId,
        from: TournamentState,
        to: TournamentState,
    },
    ParticipantRegistered {
        tournament_id: TournamentId,
        participant: ParticipantId,
        registered: usize,
    },
    ParticipantUnregistered {
        tournament_id: TournamentId,
        participant: ParticipantId,
        registered: usize,
    },
    MatchDecided {
        tournament_id: TournamentId,
        match_ref: MatchRef,
        winner: ParticipantId,
    },
    Completed(TournamentCompleted),
    Cancelled(CancellationNotice),
}

/// Final results handed to the payment collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentCompleted {
    pub tournament_id: TournamentId,
    pub champion: ParticipantId,
    pub standings: Standings,
    pub schedule: PayoutSchedule,
    /// Per-participant prizes; sums to `net_pool`
    pub awards: Vec<PrizeAward>,
    pub commission: Cents,
    pub net_pool: Cents,
    pub completed_at: DateTime<Utc>,
}

/// Amounts the payment collaborator needs to reverse a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationNotice {
    pub tournament_id: TournamentId,
    pub cancelled_from: TournamentState,
    /// Pool terms of the configured bracket
    pub total_pool: Cents,
    pub commission: Cents,
    pub net_pool: Cents,
    /// Entry fees actually collected (`entry_fee * refunds.len()`)
    pub collected: Cents,
    /// Participants whose entry fee must be returned
    pub refunds: Vec<ParticipantId>,
    pub cancelled_at: DateTime<Utc>,
}

/// Result of a scheduler poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// States entered, in order
    pub entered: Vec<TournamentState>,
    /// Due transition that could not be applied
    pub blocked: Option<TournamentError>,
}
