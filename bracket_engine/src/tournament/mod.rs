//! Tournament lifecycle on top of the bracket and prize modules.
//!
//! This module provides:
//! - Configuration with presets and field-level validation
//! - Organizer forms in decimal currency
//! - The `Tournament` aggregate and its transition table
//! - A versioned repository abstraction
//! - `TournamentManager` for serialized writes and event fan-out
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::MatchRef;
//! use bracket_engine::tournament::{TournamentConfig, TournamentManager, TournamentState};
//! use chrono::{Duration, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::in_memory();
//!     let now = Utc::now();
//!
//!     // Four-seat sit-and-go, $1.00 entry, starts as soon as it fills
//!     let config =
//!         TournamentConfig::sit_and_go("Quick".to_string(), 4, 100, now, Duration::hours(1));
//!     let id = manager.create_tournament(config, now).await?;
//!
//!     manager.open_registration(id, now).await?;
//!     for participant in 1..=4 {
//!         manager.register_participant(id, participant, now).await?;
//!     }
//!
//!     manager.record_winner(id, MatchRef::new(1, 1), 2, now).await?;
//!     let tournament = manager.get(id).await?;
//!     assert_eq!(tournament.state(), TournamentState::Completed);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod form;
pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod repository;

pub use errors::{TournamentError, TournamentResult};
pub use form::TournamentForm;
pub use lifecycle::Tournament;
pub use manager::TournamentManager;
pub use models::{
    CancellationNotice, CloseTrigger, DerivedTerms, FieldError, LifecycleEvent, PollOutcome,
    TournamentCompleted, TournamentConfig, TournamentEvent, TournamentId, TournamentState,
};
pub use repository::{
    InMemoryTournamentRepository, RepositoryError, RepositoryResult, TournamentRepository,
};
