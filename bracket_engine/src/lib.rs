//! # Bracket Engine
//!
//! Single-elimination tournament engine for four-player matches, where one
//! winner per match advances to the next round.
//!
//! The engine turns an organizer's configuration into a bracket shape and an
//! exact prize schedule, runs the tournament through its lifecycle and, once
//! the Final is decided, hands per-participant awards to the payment side.
//! All money is integer minor units and all rates are basis points, so every
//! payout schedule sums to the net pool exactly.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Shape derivation, round labels, seating and advancement
//! - [`prize`]: Commission, net pool, prize curves and payout reconciliation
//! - [`tournament`]: Configuration, lifecycle, persistence and the manager
//!
//! ## Example
//!
//! ```
//! use bracket_engine::{PrizeCurve, compute_payouts, compute_pool, derive_shape};
//!
//! let shape = derive_shape(64).unwrap();
//! assert_eq!(shape.round_labels(), vec!["Quarterfinals", "Semifinals", "Final"]);
//!
//! let pool = compute_pool(500, 64, 1000).unwrap();
//! let schedule = compute_payouts(pool.net_pool, &PrizeCurve::TopHeavy).unwrap();
//! assert_eq!(schedule.total(), pool.net_pool);
//! ```

/// Bracket topology and winner progression.
pub mod bracket;
pub use bracket::{
    Advancement, Bracket, BracketError, BracketShape, Cohort, MatchRef, ParticipantId, Standings,
    derive_shape,
};

/// Prize pool economics.
pub mod prize;
pub use prize::{
    BasisPoints, Cents, PayoutSchedule, PrizeAward, PrizeCurve, PrizeError, PrizePool,
    compute_payouts, compute_pool,
};

/// Tournament lifecycle and management.
pub mod tournament;
pub use tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentEvent, TournamentManager,
    TournamentState,
};
