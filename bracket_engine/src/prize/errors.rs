//! Prize error types.

use super::money::{BasisPoints, Cents};
use thiserror::Error;

/// Why a prize curve was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveViolation {
    #[error("curve pays no positions")]
    Empty,

    #[error("shares sum to {total_bps} bps, expected exactly 10000")]
    SumMismatch { total_bps: u64 },

    #[error("position {0} listed more than once")]
    DuplicatePosition(usize),

    #[error("positions must run 1..k without gaps, expected {expected}, found {found}")]
    PositionGap { expected: usize, found: usize },

    #[error("curve pays {positions} positions but the bracket distinguishes only {max}")]
    TooManyPositions { positions: usize, max: usize },
}

/// Prize errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrizeError {
    /// Curve failed validation
    #[error("Invalid prize curve: {0}")]
    InvalidCurve(CurveViolation),

    /// Negative entry fee
    #[error("Invalid entry fee: {0} (must not be negative)")]
    InvalidEntryFee(Cents),

    /// Commission outside 0..=10000 bps
    #[error("Invalid commission rate: {0} bps (must be between 0 and 10000)")]
    InvalidCommissionRate(BasisPoints),

    /// Negative amount to distribute
    #[error("Invalid amount: {0}")]
    InvalidAmount(Cents),

    /// Decimal input that is not a plain amount with at most two decimals
    #[error("Malformed decimal: {0:?}")]
    MalformedDecimal(String),

    /// Curve name that is not built in
    #[error("Unknown prize curve: {0}")]
    UnknownCurve(String),

    /// Pool does not fit in minor units
    #[error("Prize pool overflow")]
    Overflow,

    /// Allocated amounts do not add up; a calculator bug, never caller misuse
    #[error("Payout reconciliation failed: expected {expected}, allocated {allocated}")]
    ReconciliationFailed { expected: Cents, allocated: Cents },
}

impl From<CurveViolation> for PrizeError {
    fn from(violation: CurveViolation) -> Self {
        Self::InvalidCurve(violation)
    }
}

/// Result type for prize operations
pub type PrizeResult<T> = Result<T, PrizeError>;
