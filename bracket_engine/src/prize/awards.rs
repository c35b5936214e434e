//! Payouts per participant once the bracket has ranked them.
//!
//! A cohort that occupies several positions (the three losers of the Final
//! share positions 2..=4) cannot be told apart, so its members split the
//! summed payouts of those positions equally. Indivisible units go to members
//! in bracket order.

use super::{
    errors::PrizeResult,
    money::Cents,
    pool::{PayoutSchedule, apportion, ensure_reconciled},
};
use crate::bracket::{ParticipantId, Standings};
use serde::{Deserialize, Serialize};

/// Prize paid to one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeAward {
    pub participant: ParticipantId,
    /// Positions shared by the participant's cohort
    pub first_position: usize,
    pub last_position: usize,
    pub amount: Cents,
}

/// Turn a payout schedule into per-participant awards.
///
/// Participants in cohorts the schedule does not reach receive no award.
pub fn award_prizes(
    schedule: &PayoutSchedule,
    standings: &Standings,
) -> PrizeResult<Vec<PrizeAward>> {
    let mut awards = Vec::new();

    for standing in &standings.cohorts {
        let cohort_total: Cents = standing
            .cohort
            .positions()
            .filter_map(|position| schedule.amount_for_position(position))
            .sum();
        if cohort_total == 0 || standing.participants.is_empty() {
            continue;
        }

        let members = standing.participants.len();
        let amounts = apportion(cohort_total, &vec![1; members], members as u64);
        awards.extend(
            standing
                .participants
                .iter()
                .zip(amounts)
                .map(|(participant, amount)| PrizeAward {
                    participant: *participant,
                    first_position: standing.cohort.first_position,
                    last_position: standing.cohort.last_position,
                    amount,
                }),
        );
    }

    let paid_out: Cents = awards.iter().map(|a| a.amount).sum();
    let reachable: Cents = schedule
        .payouts
        .iter()
        .filter(|p| {
            standings
                .cohorts
                .iter()
                .any(|s| !s.participants.is_empty() && s.cohort.positions().contains(&p.position))
        })
        .map(|p| p.amount)
        .sum();
    ensure_reconciled(reachable, paid_out)?;

    Ok(awards)
}
