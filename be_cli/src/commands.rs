//! Preview and simulation commands.

use crate::config::CliConfig;
use anyhow::{Context, Error, anyhow};
use bracket_engine::{
    bracket::{Cohort, derive_shape},
    prize::{Cents, Payout, PrizePool, compute_payouts, compute_pool, format_bps},
    tournament::{TournamentCompleted, TournamentConfig, TournamentEvent, TournamentManager},
};
use chrono::{Duration, Utc};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

/// Largest bracket `simulate` will run in memory
const MAX_SIMULATED_PLAYERS: usize = 65_536;

/// One round of a bracket
#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub label: String,
    pub matches: usize,
}

/// Bracket shape summary
#[derive(Debug, Serialize)]
pub struct ShapeReport {
    pub player_count: usize,
    pub rounds: Vec<RoundReport>,
    pub total_matches: usize,
    pub cohorts: Vec<Cohort>,
}

/// Pool and payout schedule
#[derive(Debug, Serialize)]
pub struct PayoutReport {
    pub curve: String,
    pub pool: PrizePool,
    pub payouts: Vec<Payout>,
}

/// Result of a simulated tournament
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub matches_played: usize,
    pub events_published: usize,
    pub completion: TournamentCompleted,
}

pub fn shape(player_count: usize) -> Result<ShapeReport, Error> {
    let shape = derive_shape(player_count)?;
    let rounds = (1..=shape.rounds())
        .map(|round| RoundReport {
            round,
            label: shape.round_label(round),
            matches: shape.matches_in_round(round).unwrap_or(0),
        })
        .collect();

    Ok(ShapeReport {
        player_count,
        rounds,
        total_matches: shape.total_matches(),
        cohorts: shape.cohorts(),
    })
}

pub fn payouts(
    config: &CliConfig,
    player_count: usize,
    entry_fee: Cents,
) -> Result<PayoutReport, Error> {
    let shape = derive_shape(player_count)?;
    config.prize_curve.bind_to(&shape)?;
    let pool = compute_pool(entry_fee, player_count, config.commission_bps)?;
    let schedule = compute_payouts(pool.net_pool, &config.prize_curve)?;

    Ok(PayoutReport {
        curve: config.prize_curve.to_string(),
        pool,
        payouts: schedule.payouts,
    })
}

/// Run a full tournament in memory with random winners
pub async fn simulate(
    config: &CliConfig,
    player_count: usize,
    entry_fee: Cents,
    seed: u64,
) -> Result<SimulationReport, Error> {
    let shape = derive_shape(player_count)?;
    if player_count > MAX_SIMULATED_PLAYERS {
        return Err(anyhow!(
            "simulation is limited to {MAX_SIMULATED_PLAYERS} players, got {player_count}"
        ));
    }
    // Registrations, results and a handful of state changes
    let buffer = player_count
        .checked_add(shape.total_matches())
        .and_then(|n| n.checked_add(16))
        .context("bracket too large to simulate")?;

    let mut rng = StdRng::seed_from_u64(seed);
    let manager = TournamentManager::in_memory();
    let mut events = manager.subscribe(buffer).await;

    let now = Utc::now();
    let tournament_config = TournamentConfig::sit_and_go(
        format!("Simulation {seed}"),
        player_count,
        entry_fee,
        now,
        Duration::hours(1),
    )
    .with_commission_bps(config.commission_bps)
    .with_prize_curve(config.prize_curve.clone());

    let id = manager.create_tournament(tournament_config, now).await?;
    manager.open_registration(id, now).await?;
    for participant in 1..=player_count as i64 {
        manager.register_participant(id, participant, now).await?;
    }
    info!("Simulating tournament {} with {} players", id, player_count);

    let mut matches_played = 0;
    loop {
        let tournament = manager.get(id).await?;
        if let Some(completion) = tournament.completion() {
            let completion = completion.clone();
            let mut events_published = 0;
            while let Ok(event) = events.try_recv() {
                debug!("Event: {}", describe(&event));
                events_published += 1;
            }

            return Ok(SimulationReport {
                seed,
                matches_played,
                events_published,
                completion,
            });
        }

        let bracket = tournament
            .bracket()
            .ok_or_else(|| anyhow!("tournament {id} did not start"))?;
        for match_ref in bracket.ready_matches() {
            let occupants: Vec<i64> = bracket
                .get(match_ref)
                .map(|game| game.occupants().collect())
                .unwrap_or_default();
            let winner = *occupants
                .get(rng.random_range(0..occupants.len().max(1)))
                .context("ready match has no occupants")?;

            debug!("{match_ref}: {winner} wins");
            manager.record_winner(id, match_ref, winner, Utc::now()).await?;
            matches_played += 1;
        }
    }
}

pub fn print_shape(report: &ShapeReport) {
    println!("{} players", report.player_count);
    for round in &report.rounds {
        println!("  Round {}: {} ({} matches)", round.round, round.label, round.matches);
    }
    println!("  Total matches: {}", report.total_matches);
    println!("Finishing cohorts:");
    for cohort in &report.cohorts {
        let place = if cohort.first_position == cohort.last_position {
            format!("{}", cohort.first_position)
        } else {
            format!("{}-{}", cohort.first_position, cohort.last_position)
        };
        let source = match cohort.eliminated_in {
            None => "champion".to_string(),
            Some(round) => format!("lost in round {round}"),
        };
        println!("  {place:>9}  {} ({source})", cohort.size);
    }
}

pub fn print_payouts(config: &CliConfig, report: &PayoutReport) {
    let pool = &report.pool;
    println!(
        "{} x {} = {}",
        pool.player_count,
        config.money(pool.entry_fee),
        config.money(pool.total_pool)
    );
    println!(
        "Commission {}%: {}",
        format_bps(pool.commission_bps),
        config.money(pool.commission)
    );
    println!("Net pool: {}", config.money(pool.net_pool));
    println!("Curve: {}", report.curve);
    for payout in &report.payouts {
        println!("  #{:<3} {}", payout.position, config.money(payout.amount));
    }
}

pub fn print_simulation(config: &CliConfig, report: &SimulationReport) {
    let completion = &report.completion;
    println!(
        "Seed {}: {} matches, {} events",
        report.seed, report.matches_played, report.events_published
    );
    println!("Champion: {}", completion.champion);
    println!(
        "Commission {}, net pool {}",
        config.money(completion.commission),
        config.money(completion.net_pool)
    );
    for award in &completion.awards {
        println!(
            "  {:>6}  positions {}-{}  {}",
            award.participant,
            award.first_position,
            award.last_position,
            config.money(award.amount)
        );
    }
}

fn describe(event: &TournamentEvent) -> &'static str {
    match event {
        TournamentEvent::StateChanged { .. } => "state_changed",
        TournamentEvent::ParticipantRegistered { .. } => "participant_registered",
        TournamentEvent::ParticipantUnregistered { .. } => "participant_unregistered",
        TournamentEvent::MatchDecided { .. } => "match_decided",
        TournamentEvent::Completed(_) => "completed",
        TournamentEvent::Cancelled(_) => "cancelled",
    }
}
