//! Payout Preview Example
//!
//! Shows how entry fee, commission and prize curve turn into exact payouts,
//! and how tied finishing cohorts split them.

use bracket_engine::bracket::{Bracket, derive_shape};
use bracket_engine::prize::{
    PrizeCurve, award_prizes, compute_payouts, compute_pool, format_amount, parse_amount,
};

fn main() {
    println!("=== Payout Preview Example ===\n");

    // Example 1: Bracket shape
    println!("Example 1: Shape of a 64-player bracket");
    let shape = derive_shape(64).unwrap();
    for (round, label) in shape.round_labels().iter().enumerate() {
        let matches = shape.matches_per_round()[round];
        println!("  {label}: {matches} matches");
    }
    println!("  Total: {} matches\n", shape.total_matches());

    // Example 2: Pool and payouts for every built-in curve
    println!("Example 2: $5.00 entry, 16 players, 10% commission");
    let pool = compute_pool(parse_amount("5.00").unwrap(), 16, 1000).unwrap();
    println!(
        "  Pool {} - commission {} = net {}",
        format_amount(pool.total_pool),
        format_amount(pool.commission),
        format_amount(pool.net_pool)
    );

    for curve in PrizeCurve::BUILT_IN {
        let schedule = compute_payouts(pool.net_pool, &curve).unwrap();
        let amounts: Vec<String> = schedule
            .payouts
            .iter()
            .map(|p| format!("#{} {}", p.position, format_amount(p.amount)))
            .collect();
        println!("  {curve}: {}", amounts.join(", "));
    }

    // Example 3: Awards once the Final is decided
    println!("\nExample 3: Awards after a 16-player bracket");
    let participants: Vec<i64> = (1..=16).collect();
    let mut bracket = Bracket::seeded(derive_shape(16).unwrap(), &participants).unwrap();
    while !bracket.is_complete() {
        for match_ref in bracket.ready_matches() {
            // Lowest seat wins
            let winner = bracket.get(match_ref).and_then(|m| m.slots[0]).unwrap();
            bracket.record_winner(match_ref, winner).unwrap();
        }
    }

    let schedule = compute_payouts(pool.net_pool, &PrizeCurve::Standard).unwrap();
    let standings = bracket.standings().unwrap();
    for award in award_prizes(&schedule, &standings).unwrap() {
        println!(
            "  Participant {} (positions {}-{}): {}",
            award.participant,
            award.first_position,
            award.last_position,
            format_amount(award.amount)
        );
    }

    println!("\n=== End of Payout Preview Example ===");
}
