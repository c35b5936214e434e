//! Tournament aggregate and its lifecycle.
//!
//! `Tournament` owns the configuration, derived bracket and prize terms,
//! registrations and, once started, the bracket itself. Every mutating method
//! validates before it writes, so an `Err` leaves the aggregate unchanged.
//! Time-triggered transitions take `now` from the caller; the aggregate never
//! reads the clock.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{
        CancellationNotice, CloseTrigger, LifecycleEvent, PollOutcome, TournamentCompleted,
        TournamentConfig, TournamentEvent, TournamentId, TournamentState,
    },
};
use crate::{
    bracket::{Advancement, Bracket, BracketError, BracketShape, MatchRef, ParticipantId},
    prize::{PayoutSchedule, PrizePool, award_prizes},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament aggregate root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    id: TournamentId,
    config: TournamentConfig,
    shape: BracketShape,
    pool: PrizePool,
    schedule: PayoutSchedule,
    state: TournamentState,
    registrations: Vec<ParticipantId>,
    seeding: Option<Vec<ParticipantId>>,
    close_trigger: Option<CloseTrigger>,
    bracket: Option<Bracket>,
    completion: Option<TournamentCompleted>,
    version: u64,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pending_events: Vec<TournamentEvent>,
}

impl Tournament {
    /// Create a draft tournament from a validated configuration
    pub fn create(
        id: TournamentId,
        config: TournamentConfig,
        now: DateTime<Utc>,
    ) -> TournamentResult<Self> {
        let terms = config.derive_terms()?;

        log::info!(
            "Tournament {} '{}' created: {} players, net pool {}",
            id,
            config.name,
            config.player_count,
            terms.pool.net_pool
        );

        Ok(Self {
            id,
            config,
            shape: terms.shape,
            pool: terms.pool,
            schedule: terms.schedule,
            state: TournamentState::Draft,
            registrations: Vec::new(),
            seeding: None,
            close_trigger: None,
            bracket: None,
            completion: None,
            version: 0,
            created_at: now,
            started_at: None,
            finished_at: None,
            pending_events: Vec::new(),
        })
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn shape(&self) -> &BracketShape {
        &self.shape
    }

    pub fn pool(&self) -> &PrizePool {
        &self.pool
    }

    pub fn schedule(&self) -> &PayoutSchedule {
        &self.schedule
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn registrations(&self) -> &[ParticipantId] {
        &self.registrations
    }

    pub fn registered_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_full(&self) -> bool {
        self.registrations.len() >= self.config.player_count
    }

    pub fn close_trigger(&self) -> Option<CloseTrigger> {
        self.close_trigger
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn completion(&self) -> Option<&TournamentCompleted> {
        self.completion.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<TournamentEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn expect_state(&self, expected: TournamentState) -> TournamentResult<()> {
        if self.state != expected {
            return Err(TournamentError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn ensure_due(
        event: LifecycleEvent,
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> TournamentResult<()> {
        if now < due_at {
            return Err(TournamentError::TransitionNotDue { event, due_at });
        }
        Ok(())
    }

    fn apply(&mut self, event: LifecycleEvent) -> TournamentResult<()> {
        let from = self.state;
        let to = from.transition(event)?;
        self.state = to;

        log::info!("Tournament {} moved from {} to {}", self.id, from, to);
        self.pending_events.push(TournamentEvent::StateChanged {
            tournament_id: self.id,
            from,
            to,
        });
        Ok(())
    }

    /// Replace the configuration; only while in `Draft`
    pub fn reconfigure(&mut self, config: TournamentConfig) -> TournamentResult<()> {
        self.expect_state(TournamentState::Draft)?;
        let terms = config.derive_terms()?;

        self.config = config;
        self.shape = terms.shape;
        self.pool = terms.pool;
        self.schedule = terms.schedule;
        Ok(())
    }

    /// `Draft -> RegistrationOpen`, once `registration_start` has passed
    pub fn open_registration(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        self.state.transition(LifecycleEvent::OpenRegistration)?;
        Self::ensure_due(
            LifecycleEvent::OpenRegistration,
            self.config.registration_start,
            now,
        )?;
        // Terms are re-derived so a stale stored config cannot open
        self.config.derive_terms()?;

        self.apply(LifecycleEvent::OpenRegistration)
    }

    /// Register a participant.
    ///
    /// With `start_when_full`, taking the last seat closes registration and
    /// starts the tournament in the same step. Returns the registered count.
    pub fn register(
        &mut self,
        participant: ParticipantId,
        now: DateTime<Utc>,
    ) -> TournamentResult<usize> {
        self.expect_state(TournamentState::RegistrationOpen)?;
        if now >= self.config.registration_end {
            return Err(TournamentError::RegistrationWindowClosed(
                self.config.registration_end,
            ));
        }
        if self.registrations.contains(&participant) {
            return Err(TournamentError::AlreadyRegistered(participant));
        }
        if self.is_full() {
            return Err(TournamentError::TournamentFull);
        }

        self.registrations.push(participant);
        self.pending_events.push(TournamentEvent::ParticipantRegistered {
            tournament_id: self.id,
            participant,
            registered: self.registrations.len(),
        });

        // Filling up races registration_end; whichever comes first closes
        if self.config.start_when_full && self.is_full() {
            log::info!("Tournament {} is full, starting", self.id);
            self.close(CloseTrigger::Full)?;
            self.begin(now)?;
        }

        Ok(self.registrations.len())
    }

    /// Withdraw a registration while registration is open
    pub fn unregister(&mut self, participant: ParticipantId) -> TournamentResult<usize> {
        self.expect_state(TournamentState::RegistrationOpen)?;
        let index = self
            .registrations
            .iter()
            .position(|p| *p == participant)
            .ok_or(TournamentError::NotRegistered(participant))?;

        self.registrations.remove(index);
        self.pending_events.push(TournamentEvent::ParticipantUnregistered {
            tournament_id: self.id,
            participant,
            registered: self.registrations.len(),
        });
        Ok(self.registrations.len())
    }

    /// `RegistrationOpen -> RegistrationClosed`, once `registration_end` has passed.
    ///
    /// An underfilled bracket still closes; it cannot start until re-opened
    /// and filled.
    pub fn close_registration(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        self.state.transition(LifecycleEvent::CloseRegistration)?;
        Self::ensure_due(
            LifecycleEvent::CloseRegistration,
            self.config.registration_end,
            now,
        )?;

        self.close(CloseTrigger::RegistrationEnded)
    }

    fn close(&mut self, trigger: CloseTrigger) -> TournamentResult<()> {
        self.apply(LifecycleEvent::CloseRegistration)?;
        self.close_trigger = Some(trigger);
        Ok(())
    }

    /// `RegistrationClosed -> RegistrationOpen` with a new registration end
    pub fn reopen_registration(
        &mut self,
        now: DateTime<Utc>,
        registration_end: DateTime<Utc>,
    ) -> TournamentResult<()> {
        self.state.transition(LifecycleEvent::ReopenRegistration)?;
        if registration_end <= now {
            return Err(TournamentError::InvalidSchedule {
                field: "registration_end",
                reason: "must be in the future".to_string(),
            });
        }
        if let Some(start) = self.config.tournament_start
            && start < registration_end
        {
            return Err(TournamentError::InvalidSchedule {
                field: "registration_end",
                reason: format!("must not be after tournament start {start}"),
            });
        }

        self.config.registration_end = registration_end;
        self.close_trigger = None;
        // Seeding covered the old registrant list
        self.seeding = None;
        self.apply(LifecycleEvent::ReopenRegistration)
    }

    /// Supply the round-1 order; must be a permutation of the registrants
    pub fn set_seeding(&mut self, order: Vec<ParticipantId>) -> TournamentResult<()> {
        self.expect_state(TournamentState::RegistrationClosed)?;

        let mut proposed = order.clone();
        proposed.sort_unstable();
        let mut registered = self.registrations.clone();
        registered.sort_unstable();
        if proposed != registered {
            return Err(BracketError::InvalidSeeding(
                "seeding must list every registered participant exactly once".to_string(),
            )
            .into());
        }

        self.seeding = Some(order);
        Ok(())
    }

    /// `RegistrationClosed -> InProgress`.
    ///
    /// Due at `tournament_start` when one is set; a bracket closed by filling
    /// up starts immediately. Requires every seat to be taken.
    pub fn start(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        self.state.transition(LifecycleEvent::Start)?;
        if self.close_trigger != Some(CloseTrigger::Full)
            && let Some(start) = self.config.tournament_start
        {
            Self::ensure_due(LifecycleEvent::Start, start, now)?;
        }

        self.begin(now)
    }

    fn begin(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        let needed = self.config.player_count;
        let current = self.registrations.len();
        if current != needed {
            log::warn!(
                "Tournament {} cannot start: {} of {} seats filled",
                self.id,
                current,
                needed
            );
            return Err(TournamentError::InsufficientParticipants { needed, current });
        }

        // Registration order unless the collaborator supplied a seeding
        let order = self.seeding.as_deref().unwrap_or(&self.registrations);
        let bracket = Bracket::seeded(self.shape.clone(), order)?;

        self.apply(LifecycleEvent::Start)?;
        self.bracket = Some(bracket);
        self.started_at = Some(now);
        Ok(())
    }

    /// Record a match result reported by the match-execution collaborator.
    ///
    /// Deciding the Final completes the tournament and computes awards.
    pub fn record_winner(
        &mut self,
        match_ref: MatchRef,
        winner: ParticipantId,
        now: DateTime<Utc>,
    ) -> TournamentResult<Advancement> {
        self.expect_state(TournamentState::InProgress)?;
        // Work on a copy; nothing is committed until the completion is built
        let mut bracket = self
            .bracket
            .clone()
            .ok_or(TournamentError::InvalidState {
                expected: TournamentState::InProgress,
                actual: self.state,
            })?;

        let advancement = bracket.record_winner(match_ref, winner).inspect_err(|e| {
            log::warn!("Tournament {}: rejected result for {}: {}", self.id, match_ref, e);
        })?;

        let completion = match advancement {
            Advancement::Champion(champion) => {
                Some(self.build_completion(&bracket, champion, now)?)
            }
            Advancement::Advanced { .. } => None,
        };

        self.bracket = Some(bracket);
        self.pending_events.push(TournamentEvent::MatchDecided {
            tournament_id: self.id,
            match_ref,
            winner,
        });

        if let Some(completion) = completion {
            self.apply(LifecycleEvent::Complete)?;
            self.finished_at = Some(now);
            self.pending_events.push(TournamentEvent::Completed(completion.clone()));
            self.completion = Some(completion);
        }

        Ok(advancement)
    }

    fn build_completion(
        &self,
        bracket: &Bracket,
        champion: ParticipantId,
        now: DateTime<Utc>,
    ) -> TournamentResult<TournamentCompleted> {
        let standings = bracket.standings().ok_or(TournamentError::InvalidState {
            expected: TournamentState::Completed,
            actual: self.state,
        })?;
        let awards = award_prizes(&self.schedule, &standings)?;

        Ok(TournamentCompleted {
            tournament_id: self.id,
            champion,
            standings,
            schedule: self.schedule.clone(),
            awards,
            commission: self.pool.commission,
            net_pool: self.pool.net_pool,
            completed_at: now,
        })
    }

    /// Cancel from any state but `Completed`.
    ///
    /// The notice carries the pool terms and the participants to refund.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> TournamentResult<CancellationNotice> {
        let cancelled_from = self.state;
        self.apply(LifecycleEvent::Cancel)?;
        self.finished_at = Some(now);

        let refunds = self.registrations.clone();
        let notice = CancellationNotice {
            tournament_id: self.id,
            cancelled_from,
            total_pool: self.pool.total_pool,
            commission: self.pool.commission,
            net_pool: self.pool.net_pool,
            // Fees actually taken, which differs from total_pool when underfilled
            collected: self.config.entry_fee * refunds.len() as i64,
            refunds,
            cancelled_at: now,
        };

        log::info!(
            "Tournament {} cancelled from {}: net pool {}, {} refunds",
            self.id,
            cancelled_from,
            notice.net_pool,
            notice.refunds.len()
        );
        self.pending_events.push(TournamentEvent::Cancelled(notice.clone()));
        Ok(notice)
    }

    /// Apply every transition that is due at `now`.
    ///
    /// Stops at the first due transition that fails and reports it in
    /// `blocked`; transitions applied before it stand.
    pub fn poll(&mut self, now: DateTime<Utc>) -> PollOutcome {
        let mut entered = Vec::new();

        loop {
            let result = match self.state {
                TournamentState::Draft if now >= self.config.registration_start => {
                    self.open_registration(now)
                }
                TournamentState::RegistrationOpen if now >= self.config.registration_end => {
                    self.close_registration(now)
                }
                TournamentState::RegistrationClosed => match self.config.tournament_start {
                    Some(start) if now >= start => self.start(now),
                    _ => break,
                },
                _ => break,
            };

            match result {
                Ok(()) => entered.push(self.state),
                Err(e) => {
                    log::warn!("Tournament {}: due transition blocked: {}", self.id, e);
                    return PollOutcome {
                        entered,
                        blocked: Some(e),
                    };
                }
            }
        }

        PollOutcome {
            entered,
            blocked: None,
        }
    }
}
