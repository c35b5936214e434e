//! Tournament manager: serialized writes per tournament and event fan-out.

use super::{
    errors::{TournamentError, TournamentResult},
    form::TournamentForm,
    lifecycle::Tournament,
    models::{
        CancellationNotice, PollOutcome, TournamentConfig, TournamentEvent, TournamentId,
        TournamentState,
    },
    repository::{InMemoryTournamentRepository, TournamentRepository},
};
use crate::bracket::{Advancement, MatchRef, ParticipantId};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tokio::sync::{Mutex, RwLock, mpsc};

/// Tournament manager
///
/// Every mutation runs load, apply, save under a lock held for that
/// tournament only, so reports for one tournament are applied one at a time
/// while different tournaments proceed in parallel. Saves are
/// compare-and-swap on the stored version, which also catches writers that
/// share the repository but not this manager.
#[derive(Clone)]
pub struct TournamentManager {
    /// Persistence collaborator
    repository: Arc<dyn TournamentRepository>,

    /// Per-tournament write locks
    locks: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<()>>>>>,

    /// Next tournament ID
    next_id: Arc<AtomicI64>,

    /// Event subscribers
    subscribers: Arc<Mutex<Vec<mpsc::Sender<TournamentEvent>>>>,
}

impl TournamentManager {
    /// Create a manager over a repository; IDs are allocated from 1
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        Self {
            repository,
            locks: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a manager backed by an in-memory repository
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTournamentRepository::new()))
    }

    /// Receive every event published after this call
    ///
    /// Events are dropped for a subscriber whose buffer is full; a dropped
    /// receiver is removed on the next publish.
    pub async fn subscribe(&self, buffer: usize) -> mpsc::Receiver<TournamentEvent> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.subscribers.lock().await.push(sender);
        receiver
    }

    /// Create a draft tournament
    pub async fn create_tournament(
        &self,
        config: TournamentConfig,
        now: DateTime<Utc>,
    ) -> TournamentResult<TournamentId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tournament = Tournament::create(id, config, now)?;
        self.repository.insert(&tournament).await?;
        Ok(id)
    }

    /// Create a draft tournament from organizer input
    pub async fn create_from_form(
        &self,
        form: TournamentForm,
        now: DateTime<Utc>,
    ) -> TournamentResult<TournamentId> {
        let config = TournamentConfig::try_from(form)?;
        self.create_tournament(config, now).await
    }

    /// Get the current state of a tournament
    pub async fn get(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.repository
            .load(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    /// List tournaments, optionally filtered by state
    pub async fn list(
        &self,
        state_filter: Option<TournamentState>,
    ) -> TournamentResult<Vec<Tournament>> {
        Ok(self.repository.list(state_filter).await?)
    }

    pub async fn reconfigure(
        &self,
        id: TournamentId,
        config: TournamentConfig,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.reconfigure(config)).await
    }

    pub async fn open_registration(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.open_registration(now)).await
    }

    /// Register a participant; returns the registered count
    pub async fn register_participant(
        &self,
        id: TournamentId,
        participant: ParticipantId,
        now: DateTime<Utc>,
    ) -> TournamentResult<usize> {
        self.mutate(id, |t| t.register(participant, now)).await
    }

    /// Withdraw a participant; returns the registered count
    pub async fn unregister_participant(
        &self,
        id: TournamentId,
        participant: ParticipantId,
    ) -> TournamentResult<usize> {
        self.mutate(id, |t| t.unregister(participant)).await
    }

    pub async fn close_registration(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.close_registration(now)).await
    }

    pub async fn reopen_registration(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
        registration_end: DateTime<Utc>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.reopen_registration(now, registration_end))
            .await
    }

    pub async fn set_seeding(
        &self,
        id: TournamentId,
        order: Vec<ParticipantId>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.set_seeding(order)).await
    }

    pub async fn start_tournament(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
    ) -> TournamentResult<()> {
        self.mutate(id, |t| t.start(now)).await
    }

    /// Apply a match result
    pub async fn record_winner(
        &self,
        id: TournamentId,
        match_ref: MatchRef,
        winner: ParticipantId,
        now: DateTime<Utc>,
    ) -> TournamentResult<Advancement> {
        self.mutate(id, |t| t.record_winner(match_ref, winner, now))
            .await
    }

    pub async fn cancel_tournament(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
    ) -> TournamentResult<CancellationNotice> {
        self.mutate(id, |t| t.cancel(now)).await
    }

    /// Apply the transitions due at `now` to one tournament.
    ///
    /// A poll that enters no state is not saved, so idle polls never bump the
    /// version under other writers.
    pub async fn poll(
        &self,
        id: TournamentId,
        now: DateTime<Utc>,
    ) -> TournamentResult<PollOutcome> {
        self.mutate_if(
            id,
            |t| Ok(t.poll(now)),
            |outcome| !outcome.entered.is_empty(),
        )
        .await
    }

    /// Poll every non-terminal tournament.
    ///
    /// Returns the tournaments that entered a state, were blocked, or failed
    /// to poll. A failure is reported for its tournament and the remaining
    /// tournaments are still polled.
    pub async fn poll_all(
        &self,
        now: DateTime<Utc>,
    ) -> TournamentResult<Vec<(TournamentId, TournamentResult<PollOutcome>)>> {
        let mut outcomes = Vec::new();
        for tournament in self.repository.list(None).await? {
            if tournament.state().is_terminal() {
                continue;
            }

            let id = tournament.id();
            match self.poll(id, now).await {
                Ok(outcome) if outcome.entered.is_empty() && outcome.blocked.is_none() => {}
                Ok(outcome) => outcomes.push((id, Ok(outcome))),
                Err(e) => {
                    log::warn!("Tournament {}: poll failed: {}", id, e);
                    outcomes.push((id, Err(e)));
                }
            }
        }
        Ok(outcomes)
    }

    async fn lock_for(&self, id: TournamentId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&id) {
            return Arc::clone(lock);
        }
        Arc::clone(self.locks.write().await.entry(id).or_default())
    }

    /// Load, apply `op`, save; the stored state is untouched when `op` fails
    async fn mutate<T, F>(&self, id: TournamentId, op: F) -> TournamentResult<T>
    where
        F: FnOnce(&mut Tournament) -> TournamentResult<T>,
    {
        self.mutate_if(id, op, |_| true).await
    }

    /// Like `mutate`, but only saves when `changed` holds for the result
    async fn mutate_if<T, F, C>(
        &self,
        id: TournamentId,
        op: F,
        changed: C,
    ) -> TournamentResult<T>
    where
        F: FnOnce(&mut Tournament) -> TournamentResult<T>,
        C: FnOnce(&T) -> bool,
    {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let (result, retire) = match self.repository.load(id).await {
            Ok(Some(mut tournament)) => {
                let result = self.apply(&mut tournament, op, changed).await;
                (result, tournament.state().is_terminal())
            }
            Ok(None) => (Err(TournamentError::NotFound(id)), true),
            Err(e) => (Err(e.into()), false),
        };

        // Terminal and unknown tournaments accept no further writes
        if retire {
            self.locks.write().await.remove(&id);
            log::debug!("Released write lock for tournament {}", id);
        }

        result
    }

    async fn apply<T, F, C>(
        &self,
        tournament: &mut Tournament,
        op: F,
        changed: C,
    ) -> TournamentResult<T>
    where
        F: FnOnce(&mut Tournament) -> TournamentResult<T>,
        C: FnOnce(&T) -> bool,
    {
        let expected_version = tournament.version();
        let value = op(tournament)?;
        let events = tournament.take_events();
        if !changed(&value) {
            return Ok(value);
        }

        let version = self.repository.save(tournament, expected_version).await?;
        log::debug!("Tournament {} saved at version {}", tournament.id(), version);

        self.publish(events).await;
        Ok(value)
    }

    /// Send events to all subscribers, dropping closed ones
    async fn publish(&self, events: Vec<TournamentEvent>) {
        if events.is_empty() {
            return;
        }

        let mut subscribers = self.subscribers.lock().await;
        for event in events {
            subscribers.retain(|sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Event subscriber is full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Removing closed event subscriber");
                    false
                }
            });
        }
    }
}
