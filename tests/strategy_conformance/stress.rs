//! Full-size scenario runs and contention stress. All #[ignore] for
//! opt-in execution:
//! cargo test --test strategy_conformance stress -- --ignored

use crate::common;
use groupby_bench::{run_algorithm, Algorithm, ExecOptions, RowTable, StrategyKind};
use groupby_bench::LocalAggMap;
use groupby_exec::adaptive::{cost, estimate};

/// Scenario E at full size: 1e6 skewed rows, p = 16. The selector must
/// keep an unpartitioned plan and match the baseline.
#[test]
#[ignore]
fn stress_scenario_e_full_size() {
    let table = RowTable::from_rows(&common::skewed_rows(1_000_000, 101));

    let mut sample = LocalAggMap::new();
    for r in 0..10_000 {
        sample.absorb_row(&table, r);
    }
    let g_hat = estimate::estimate_g(10_000, sample.len());
    let (kind, _) = cost::choose(g_hat, 16, 64, table.n_rows() - 10_000, table.n_rows());
    assert!(matches!(kind, StrategyKind::Central | StrategyKind::Tree));

    let expected = common::reference_rows(&table);
    let got = common::run_sorted(Algorithm::AdaptiveAlg2, &table, 16, 10_000);
    assert_eq!(got, expected);
}

/// Scenario F at full size: 1e7 uniform rows over 1e6 keys, p = 32.
#[test]
#[ignore]
fn stress_scenario_f_full_size() {
    let table = RowTable::from_rows(&common::uniform_rows(10_000_000, 1_000_001, 102));

    let mut sample = LocalAggMap::new();
    for r in 0..10_000 {
        sample.absorb_row(&table, r);
    }
    let g_hat = estimate::estimate_g(10_000, sample.len());
    let (kind, _) = cost::choose(g_hat, 32, 128, table.n_rows() - 10_000, table.n_rows());
    assert!(matches!(kind, StrategyKind::Radix | StrategyKind::LockFree));

    let expected = common::reference_rows(&table);
    let got = common::run_sorted(Algorithm::AdaptiveAlg2, &table, 32, 10_000);
    assert_eq!(got, expected);
}

/// Hammer the lock-free table with maximum claim contention: every thread
/// fighting over a small hot key set.
#[test]
#[ignore]
fn stress_lockfree_hot_keys() {
    let rows: Vec<(i64, i64)> = (0..2_000_000).map(|i| (i % 16, i)).collect();
    let table = RowTable::from_rows(&rows);
    let expected = common::reference_rows(&table);
    for _ in 0..5 {
        let got = common::run_sorted(Algorithm::LockFreeHashTable, &table, 16, 1000);
        assert_eq!(got, expected);
    }
}

/// Every strategy at every power-of-two thread count on a mid-size table.
#[test]
#[ignore]
fn stress_thread_count_sweep() {
    let table = RowTable::from_rows(&common::uniform_rows(1_000_000, 100_000, 103));
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        for p in [1, 2, 4, 8, 16, 32] {
            let (mut got, _) = run_algorithm(alg, &table, &ExecOptions::new(p)).unwrap();
            got.sort();
            assert_eq!(got, expected, "{alg} diverged at p = {p}");
        }
    }
}
