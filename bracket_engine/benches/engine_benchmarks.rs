use bracket_engine::{
    bracket::{Bracket, derive_shape},
    prize::{PrizeCurve, award_prizes, compute_payouts, compute_pool},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;

/// Play every match with a random winner until the Final is decided
fn play_out(bracket: &mut Bracket, rng: &mut StdRng) {
    while !bracket.is_complete() {
        for match_ref in bracket.ready_matches() {
            let seat = rng.random_range(0..4);
            let winner = bracket
                .get(match_ref)
                .and_then(|game| game.slots[seat])
                .unwrap();
            bracket.record_winner(match_ref, winner).unwrap();
        }
    }
}

fn seeded_bracket(player_count: usize) -> Bracket {
    let participants: Vec<i64> = (1..=player_count as i64).collect();
    Bracket::seeded(derive_shape(player_count).unwrap(), &participants).unwrap()
}

/// Benchmark closed-form shape derivation
fn bench_derive_shape(c: &mut Criterion) {
    c.bench_function("derive_shape_4096", |b| {
        b.iter(|| derive_shape(black_box(4096)));
    });
}

/// Benchmark payout reconciliation for each built-in curve
fn bench_compute_payouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_payouts");
    let pool = compute_pool(999, 1024, 1250).unwrap();

    for curve in PrizeCurve::BUILT_IN {
        group.bench_with_input(
            BenchmarkId::from_parameter(curve.name()),
            &curve,
            |b, curve| {
                b.iter(|| compute_payouts(black_box(pool.net_pool), curve));
            },
        );
    }

    group.finish();
}

/// Benchmark a full bracket run at different sizes
fn bench_play_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("play_out");

    for player_count in [16, 256, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", player_count)),
            &player_count,
            |b, &n| {
                let mut rng = StdRng::seed_from_u64(7);
                b.iter_batched(
                    || seeded_bracket(n),
                    |mut bracket| {
                        play_out(&mut bracket, &mut rng);
                        bracket
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark standings and awards once a 1024-player bracket is decided
fn bench_award_prizes(c: &mut Criterion) {
    let mut bracket = seeded_bracket(1024);
    play_out(&mut bracket, &mut StdRng::seed_from_u64(11));
    let standings = bracket.standings().unwrap();
    let pool = compute_pool(500, 1024, 1000).unwrap();
    let schedule = compute_payouts(pool.net_pool, &PrizeCurve::Balanced).unwrap();

    c.bench_function("award_prizes_1024", |b| {
        b.iter(|| award_prizes(&schedule, black_box(&standings)));
    });
}

criterion_group!(shape, bench_derive_shape);

criterion_group!(
    prizes,
    bench_compute_payouts,
    bench_play_out,
    bench_award_prizes
);

criterion_main!(shape, prizes);
