//! Prize pool and payout schedule computation.
//!
//! All arithmetic is in integer minor units. Commission rounds down, and
//! per-position payouts are reconciled with the largest-remainder method so
//! the schedule always sums to the net pool.

use super::{
    curve::PrizeCurve,
    errors::{PrizeError, PrizeResult},
    money::{BPS_DENOMINATOR, BasisPoints, Cents},
};
use serde::{Deserialize, Serialize};

/// Pool collected from entry fees, split into commission and net pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizePool {
    pub entry_fee: Cents,
    pub player_count: usize,
    pub commission_bps: BasisPoints,
    /// `entry_fee * player_count`
    pub total_pool: Cents,
    /// `floor(total_pool * commission_bps / 10000)`
    pub commission: Cents,
    /// `total_pool - commission`, the amount paid to finishers
    pub net_pool: Cents,
}

/// Amount paid to one finishing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub position: usize,
    pub amount: Cents,
}

/// Per-position payouts, best position first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    pub net_pool: Cents,
    pub payouts: Vec<Payout>,
}

impl PayoutSchedule {
    /// Sum of all payouts
    pub fn total(&self) -> Cents {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    /// Payout for a position (1-indexed); `None` if the position is unpaid
    pub fn amount_for_position(&self, position: usize) -> Option<Cents> {
        self.payouts
            .iter()
            .find(|p| p.position == position)
            .map(|p| p.amount)
    }
}

/// Compute the pool for `player_count` entries of `entry_fee` minor units.
///
/// Commission is rounded down: the house never takes a fractional unit.
pub fn compute_pool(
    entry_fee: Cents,
    player_count: usize,
    commission_bps: BasisPoints,
) -> PrizeResult<PrizePool> {
    if entry_fee < 0 {
        return Err(PrizeError::InvalidEntryFee(entry_fee));
    }
    if commission_bps > BPS_DENOMINATOR {
        return Err(PrizeError::InvalidCommissionRate(commission_bps));
    }

    let players = i64::try_from(player_count).map_err(|_| PrizeError::Overflow)?;
    let total_pool = entry_fee
        .checked_mul(players)
        .ok_or(PrizeError::Overflow)?;
    let commission = (i128::from(total_pool) * i128::from(commission_bps)
        / i128::from(BPS_DENOMINATOR)) as Cents;
    let net_pool = total_pool - commission;

    Ok(PrizePool {
        entry_fee,
        player_count,
        commission_bps,
        total_pool,
        commission,
        net_pool,
    })
}

/// Split `net_pool` across the positions of `curve`.
///
/// Each position first gets `floor(net_pool * bps / 10000)`. The shortfall,
/// fewer units than there are positions, goes one unit at a time to the
/// positions with the largest remainders; equal remainders favor the better
/// position.
pub fn compute_payouts(net_pool: Cents, curve: &PrizeCurve) -> PrizeResult<PayoutSchedule> {
    if net_pool < 0 {
        return Err(PrizeError::InvalidAmount(net_pool));
    }
    curve.validate()?;

    let shares = curve.sorted_shares();
    let weights: Vec<u64> = shares.iter().map(|s| u64::from(s.bps)).collect();
    let amounts = apportion(net_pool, &weights, u64::from(BPS_DENOMINATOR));

    let payouts: Vec<Payout> = shares
        .iter()
        .zip(amounts)
        .map(|(share, amount)| Payout {
            position: share.position,
            amount,
        })
        .collect();

    let schedule = PayoutSchedule { net_pool, payouts };
    ensure_reconciled(net_pool, schedule.total())?;
    Ok(schedule)
}

/// Largest-remainder apportionment of `total` by `weights / denominator`.
///
/// Weights must sum to `denominator`. Ties on remainder go to the lower index.
pub(crate) fn apportion(total: Cents, weights: &[u64], denominator: u64) -> Vec<Cents> {
    let total = i128::from(total);
    let denominator = i128::from(denominator);

    let mut amounts = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (index, weight) in weights.iter().enumerate() {
        let raw = total * i128::from(*weight);
        amounts.push((raw / denominator) as Cents);
        remainders.push((raw % denominator, index));
    }

    let allocated: i128 = amounts.iter().map(|a| i128::from(*a)).sum();
    let shortfall = usize::try_from(total - allocated).unwrap_or(0);

    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, index) in remainders.into_iter().take(shortfall) {
        amounts[index] += 1;
    }

    amounts
}

/// Fail loudly if allocated amounts do not add up to what was distributed
pub(crate) fn ensure_reconciled(expected: Cents, allocated: Cents) -> PrizeResult<()> {
    debug_assert_eq!(
        expected, allocated,
        "payout reconciliation broken: allocated {allocated} of {expected}"
    );

    if expected != allocated {
        log::error!(
            "CRITICAL: payout reconciliation failed, allocated {} of {}",
            allocated,
            expected
        );
        return Err(PrizeError::ReconciliationFailed {
            expected,
            allocated,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_pool_scenario() {
        let pool = compute_pool(500, 16, 1000).unwrap();
        assert_eq!(pool.total_pool, 8000);
        assert_eq!(pool.commission, 800);
        assert_eq!(pool.net_pool, 7200);
    }

    #[test]
    fn test_commission_rounds_down() {
        // 3 * 333 = 999; 12.5% of 999 = 124.875
        let pool = compute_pool(333, 3, 1250).unwrap();
        assert_eq!(pool.total_pool, 999);
        assert_eq!(pool.commission, 124);
        assert_eq!(pool.net_pool, 875);
    }

    #[test]
    fn test_commission_bounds() {
        assert_eq!(compute_pool(100, 4, 0).unwrap().net_pool, 400);
        assert_eq!(compute_pool(100, 4, 10_000).unwrap().net_pool, 0);
        assert_eq!(
            compute_pool(100, 4, 10_001),
            Err(PrizeError::InvalidCommissionRate(10_001))
        );
    }

    #[test]
    fn test_negative_entry_fee() {
        assert_eq!(
            compute_pool(-1, 4, 1000),
            Err(PrizeError::InvalidEntryFee(-1))
        );
    }

    #[test]
    fn test_free_tournament() {
        let pool = compute_pool(0, 64, 1000).unwrap();
        assert_eq!(pool.net_pool, 0);
        let schedule = compute_payouts(pool.net_pool, &PrizeCurve::Standard).unwrap();
        assert!(schedule.payouts.iter().all(|p| p.amount == 0));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(compute_pool(i64::MAX, 4, 0), Err(PrizeError::Overflow));
    }

    #[test]
    fn test_standard_payouts_scenario() {
        let schedule = compute_payouts(7200, &PrizeCurve::Standard).unwrap();
        let amounts: Vec<Cents> = schedule.payouts.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![4320, 1800, 540, 540]);
        assert_eq!(schedule.total(), 7200);
    }

    #[test]
    fn test_shortfall_goes_to_largest_remainder() {
        // balanced on 99: 49.5, 29.7, 11.88, 7.92 -> floors 49+29+11+7 = 96
        // remainders .5, .7, .88, .92 -> the three largest get a unit
        let schedule = compute_payouts(99, &PrizeCurve::Balanced).unwrap();
        let amounts: Vec<Cents> = schedule.payouts.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![49, 30, 12, 8]);
    }

    #[test]
    fn test_equal_remainders_favor_better_position() {
        let curve = PrizeCurve::custom("halves", &[5000, 5000]);
        let schedule = compute_payouts(1, &curve).unwrap();
        assert_eq!(schedule.amount_for_position(1), Some(1));
        assert_eq!(schedule.amount_for_position(2), Some(0));

        let schedule = compute_payouts(7, &PrizeCurve::Standard).unwrap();
        // 4.2, 1.75, 0.525, 0.525 -> 4 + 1 + 0 + 0 = 5, two units short
        let amounts: Vec<Cents> = schedule.payouts.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![4, 2, 1, 0]);
    }

    #[test]
    fn test_negative_net_pool() {
        assert_eq!(
            compute_payouts(-5, &PrizeCurve::Standard),
            Err(PrizeError::InvalidAmount(-5))
        );
    }

    #[test]
    fn test_invalid_curve_is_rejected() {
        let curve = PrizeCurve::custom("broken", &[5000, 4000]);
        assert!(matches!(
            compute_payouts(1000, &curve),
            Err(PrizeError::InvalidCurve(_))
        ));
    }

    #[test]
    fn test_amount_for_unpaid_position() {
        let schedule = compute_payouts(1000, &PrizeCurve::TopHeavy).unwrap();
        assert_eq!(schedule.amount_for_position(3), Some(100));
        assert_eq!(schedule.amount_for_position(4), None);
        assert_eq!(schedule.amount_for_position(0), None);
    }
}
