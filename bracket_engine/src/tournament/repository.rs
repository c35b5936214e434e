//! Persistence abstraction for tournament aggregates.
//!
//! The engine only needs load-current-state and save-new-state. Saves are
//! compare-and-swap on the aggregate version, so two writers that loaded the
//! same version cannot both succeed.

use super::{
    lifecycle::Tournament,
    models::{TournamentId, TournamentState},
};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Version conflict on tournament {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: TournamentId,
        expected: u64,
        actual: u64,
    },

    #[error("Tournament {0} already exists")]
    Duplicate(TournamentId),

    #[error("Tournament {0} does not exist")]
    Missing(TournamentId),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Trait for tournament persistence
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Store a new tournament at version 0
    async fn insert(&self, tournament: &Tournament) -> RepositoryResult<()>;

    /// Load the current state of a tournament
    async fn load(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>>;

    /// Replace a tournament if its stored version is still `expected_version`.
    ///
    /// Returns the new version.
    async fn save(&self, tournament: &Tournament, expected_version: u64) -> RepositoryResult<u64>;

    /// List tournaments, optionally filtered by state
    async fn list(&self, state: Option<TournamentState>) -> RepositoryResult<Vec<Tournament>>;
}

/// In-memory repository
#[derive(Default)]
pub struct InMemoryTournamentRepository {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn insert(&self, tournament: &Tournament) -> RepositoryResult<()> {
        let mut tournaments = self.tournaments.write().await;
        if tournaments.contains_key(&tournament.id()) {
            return Err(RepositoryError::Duplicate(tournament.id()));
        }

        let mut stored = tournament.clone();
        stored.set_version(0);
        tournaments.insert(tournament.id(), stored);
        Ok(())
    }

    async fn load(&self, id: TournamentId) -> RepositoryResult<Option<Tournament>> {
        Ok(self.tournaments.read().await.get(&id).cloned())
    }

    async fn save(&self, tournament: &Tournament, expected_version: u64) -> RepositoryResult<u64> {
        let mut tournaments = self.tournaments.write().await;
        let current = tournaments
            .get(&tournament.id())
            .ok_or(RepositoryError::Missing(tournament.id()))?;

        if current.version() != expected_version {
            return Err(RepositoryError::VersionConflict {
                id: tournament.id(),
                expected: expected_version,
                actual: current.version(),
            });
        }

        // The caller's copy keeps its old version; only the stored one moves
        let version = expected_version + 1;
        let mut stored = tournament.clone();
        stored.set_version(version);
        tournaments.insert(tournament.id(), stored);
        Ok(version)
    }

    async fn list(&self, state: Option<TournamentState>) -> RepositoryResult<Vec<Tournament>> {
        let tournaments = self.tournaments.read().await;
        let mut listed: Vec<Tournament> = tournaments
            .values()
            .filter(|t| state.is_none_or(|s| t.state() == s))
            .cloned()
            .collect();
        listed.sort_by_key(|t| t.id());
        Ok(listed)
    }
}
