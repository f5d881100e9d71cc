//! Integration tests for the sorting algorithms
//!
//! Runs every algorithm through the public `run_sort` entry point with no
//! step delay and checks the resulting bars and run reports.

use proptest::prelude::*;
use sortviz::services::{RandomSource, ValueSource, run_sort};
use sortviz::{Algorithm, RunOutcome, StateManager};
use std::time::Duration;
use tokio::sync::watch;

fn sort_values(algorithm: Algorithm, values: Vec<u32>) -> (Vec<u32>, RunOutcome) {
    let state = StateManager::new();
    state.load_values(values);
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let report = tokio_test::block_on(run_sort(&state, algorithm, cancel_rx, Duration::ZERO));
    (state.snapshot().values, report.outcome)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_every_algorithm_sorts_a_permutation(
        values in prop::collection::vec(0u32..500, 0..40),
    ) {
        let mut expected = values.clone();
        expected.sort_unstable();

        for algorithm in Algorithm::ALL {
            let (sorted, outcome) = sort_values(algorithm, values.clone());
            prop_assert_eq!(outcome, RunOutcome::Completed);
            prop_assert_eq!(&sorted, &expected, "{} produced a wrong order", algorithm);
        }
    }

    #[test]
    fn prop_sorted_input_needs_no_writes(
        mut values in prop::collection::vec(0u32..100, 0..30),
    ) {
        values.sort_unstable();

        for algorithm in Algorithm::ALL {
            let state = StateManager::new();
            state.load_values(values.clone());
            let (_cancel_tx, cancel_rx) = watch::channel(false);

            let report = tokio_test::block_on(run_sort(&state, algorithm, cancel_rx, Duration::ZERO));
            prop_assert_eq!(report.stats.writes, 0, "{} wrote to sorted input", algorithm);
        }
    }
}

#[test]
fn test_generated_array_has_configured_shape() {
    let values = RandomSource.fill(80, 20..420);

    assert_eq!(values.len(), 80);
    assert!(values.iter().all(|v| (20..420).contains(v)));
}

#[test]
fn test_generated_array_sorts_with_every_algorithm() {
    let values = RandomSource.fill(80, 20..420);
    let mut expected = values.clone();
    expected.sort_unstable();

    for algorithm in Algorithm::ALL {
        let (sorted, outcome) = sort_values(algorithm, values.clone());
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(sorted, expected, "{} produced a wrong order", algorithm);
    }
}

#[test]
fn test_reverse_sorted_worst_case() {
    let values: Vec<u32> = (1..=25).rev().collect();

    for algorithm in Algorithm::ALL {
        let (sorted, _) = sort_values(algorithm, values.clone());
        assert_eq!(sorted, (1..=25).collect::<Vec<u32>>());
    }
}

#[test]
fn test_all_equal_values() {
    for algorithm in Algorithm::ALL {
        let (sorted, outcome) = sort_values(algorithm, vec![7; 12]);
        assert_eq!(sorted, vec![7; 12]);
        assert_eq!(outcome, RunOutcome::Completed);
    }
}

#[test]
fn test_bubble_scenario_steps() {
    let state = StateManager::new();
    state.load_values(vec![5, 3, 8, 1]);
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let report = tokio_test::block_on(run_sort(
        &state,
        Algorithm::Bubble,
        cancel_rx,
        Duration::ZERO,
    ));

    // n(n-1)/2 comparisons, each followed by one pause
    assert_eq!(report.stats.comparisons, 6);
    assert_eq!(report.stats.steps, 6);
    assert_eq!(state.snapshot().values, vec![1, 3, 5, 8]);
    assert!(state.snapshot().highlight.is_none());
}
