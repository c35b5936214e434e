//! Bracket shape derivation tests.
//!
//! Shapes are derived in closed form; the 16- and 64-player brackets are kept
//! as fixed regression fixtures.

use bracket_engine::bracket::{BracketError, BracketShape, MATCH_ARITY, derive_shape, round_label};
use proptest::prelude::*;

#[test]
fn test_sixteen_player_fixture() {
    let shape = derive_shape(16).unwrap();
    assert_eq!(shape.rounds(), 2);
    assert_eq!(shape.matches_per_round(), &[4, 1]);
    assert_eq!(shape.total_matches(), 5);
    assert_eq!(shape.round_labels(), vec!["Semifinals", "Final"]);
}

#[test]
fn test_sixty_four_player_fixture() {
    let shape = derive_shape(64).unwrap();
    assert_eq!(shape.rounds(), 3);
    assert_eq!(shape.matches_per_round(), &[16, 4, 1]);
    assert_eq!(shape.total_matches(), 21);
    assert_eq!(
        shape.round_labels(),
        vec!["Quarterfinals", "Semifinals", "Final"]
    );
}

#[test]
fn test_single_final() {
    let shape = derive_shape(4).unwrap();
    assert_eq!(shape.rounds(), 1);
    assert_eq!(shape.matches_per_round(), &[1]);
    assert_eq!(shape.round_label(1), "Final");
}

#[test]
fn test_large_bracket_labels_count_from_start() {
    let shape = derive_shape(4usize.pow(5)).unwrap();
    assert_eq!(
        shape.round_labels(),
        vec!["Round 1", "Round 2", "Quarterfinals", "Semifinals", "Final"]
    );
    assert_eq!(round_label(6, 5), "Round 6");
}

#[test]
fn test_rejects_non_powers_of_four() {
    for player_count in [0, 1, 2, 3, 8, 10, 12, 15, 32, 48, 100, 128, 255] {
        assert_eq!(
            derive_shape(player_count),
            Err(BracketError::InvalidBracketSize(player_count)),
            "{player_count} should not form a bracket"
        );
    }
}

#[test]
fn test_cohorts_cover_every_position() {
    let shape = derive_shape(64).unwrap();
    let cohorts = shape.cohorts();

    let ranges: Vec<(usize, usize)> = cohorts
        .iter()
        .map(|c| (c.first_position, c.last_position))
        .collect();
    assert_eq!(ranges, vec![(1, 1), (2, 4), (5, 16), (17, 64)]);
    assert_eq!(
        cohorts.iter().map(|c| c.eliminated_in).collect::<Vec<_>>(),
        vec![None, Some(3), Some(2), Some(1)]
    );
    assert_eq!(shape.max_paid_positions(), 16);
    assert_eq!(shape.cohort_for_position(65), None);
    assert_eq!(shape.cohort_for_position(9).unwrap().eliminated_in, Some(2));
}

#[test]
fn test_paid_positions_end_on_a_cohort_boundary() {
    let caps: Vec<usize> = [4, 16, 64, 256]
        .into_iter()
        .map(|n| derive_shape(n).unwrap().max_paid_positions())
        .collect();
    assert_eq!(caps, vec![4, 4, 16, 64]);

    for player_count in [4, 16, 64, 256, 1024] {
        let shape = derive_shape(player_count).unwrap();
        let cap = shape.max_paid_positions();
        // The last paid position closes a cohort, never splits one
        assert!(shape.cohorts().iter().any(|c| c.last_position == cap));
    }
}

#[test]
fn test_shape_serializes_as_player_count() {
    let shape = derive_shape(16).unwrap();
    assert_eq!(serde_json::to_string(&shape).unwrap(), "16");

    let back: BracketShape = serde_json::from_str("16").unwrap();
    assert_eq!(back, shape);
    assert!(serde_json::from_str::<BracketShape>("10").is_err());
}

proptest! {
    #[test]
    fn prop_power_of_four_shapes(rounds in 1u32..=6) {
        let player_count = 4usize.pow(rounds);
        let shape = derive_shape(player_count).unwrap();

        prop_assert_eq!(shape.rounds(), rounds);
        prop_assert_eq!(shape.matches_per_round().len(), rounds as usize);
        prop_assert_eq!(shape.matches_per_round()[0], player_count / MATCH_ARITY);
        prop_assert_eq!(*shape.matches_per_round().last().unwrap(), 1);
        prop_assert_eq!(shape.total_matches(), (player_count - 1) / (MATCH_ARITY - 1));

        for pair in shape.matches_per_round().windows(2) {
            prop_assert_eq!(pair[0], pair[1] * MATCH_ARITY);
        }

        let cohort_total: usize = shape.cohorts().iter().map(|c| c.size).sum();
        prop_assert_eq!(cohort_total, player_count);
    }

    #[test]
    fn prop_non_powers_rejected(player_count in 0usize..5000) {
        let is_power = (1..=6).any(|r| 4usize.pow(r) == player_count);
        prop_assert_eq!(derive_shape(player_count).is_ok(), is_power);
    }
}
