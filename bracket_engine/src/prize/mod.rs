//! Prize economics: commission, net pool and exact payouts.
//!
//! This module provides:
//! - Fixed-point money and basis-point parsing
//! - Named and custom prize curves with validation
//! - Pool computation with round-down commission
//! - Largest-remainder payout schedules that always sum to the net pool
//! - Per-participant awards for tied finishing cohorts
//!
//! ## Example
//!
//! ```
//! use bracket_engine::prize::{PrizeCurve, compute_payouts, compute_pool, parse_amount};
//!
//! let entry_fee = parse_amount("5.00").unwrap();
//! let pool = compute_pool(entry_fee, 16, 1000).unwrap();
//! assert_eq!(pool.net_pool, 7200);
//!
//! let schedule = compute_payouts(pool.net_pool, &PrizeCurve::Standard).unwrap();
//! assert_eq!(schedule.total(), pool.net_pool);
//! ```

pub mod awards;
pub mod curve;
pub mod errors;
pub mod money;
pub mod pool;

pub use awards::{PrizeAward, award_prizes};
pub use curve::{PayoutShare, PrizeCurve, validate_curve};
pub use errors::{CurveViolation, PrizeError, PrizeResult};
pub use money::{
    BPS_DENOMINATOR, BasisPoints, Cents, MINOR_UNITS_PER_MAJOR, format_amount, format_bps,
    parse_amount, parse_percent_bps,
};
pub use pool::{Payout, PayoutSchedule, PrizePool, compute_payouts, compute_pool};
