//! Selector decisions on the scenario workload shapes.
//!
//! The decision layer is exercised directly through the cost model with
//! sample statistics taken from real tables, so these stay fast; the
//! full-size scenario runs live in the stress suite.

use crate::common;
use groupby_bench::{Algorithm, RowTable, StrategyKind};
use groupby_bench::LocalAggMap;
use groupby_exec::adaptive::{cost, estimate};

/// Distinct keys in the first `k` rows, the way the selector samples.
fn sampled_distinct(table: &RowTable, k: usize) -> (usize, usize) {
    let k = k.min(table.n_rows());
    let mut map = LocalAggMap::new();
    for r in 0..k {
        map.absorb_row(table, r);
    }
    (k, map.len())
}

#[test]
fn skewed_low_cardinality_selects_central_or_tree() {
    // Scenario E shape at reduced scale: the selector must keep an
    // unpartitioned plan at p = 16.
    let table = RowTable::from_rows(&common::skewed_rows(200_000, 31));
    let (k, g_tilde) = sampled_distinct(&table, 10_000);
    let g_hat = estimate::estimate_g(k, g_tilde);
    let (kind, costs) = cost::choose(g_hat, 16, 64, table.n_rows() - k, table.n_rows());
    assert!(
        matches!(kind, StrategyKind::Central | StrategyKind::Tree),
        "selector picked {kind:?} for skewed input (g_hat = {g_hat}, costs = {costs:?})"
    );
}

#[test]
fn uniform_high_cardinality_selects_radix_or_lockfree() {
    // Scenario F shape at reduced scale. The sample saturates, the
    // estimate explodes, and an unpartitioned merge becomes untenable.
    let table = RowTable::from_rows(&common::uniform_rows(500_000, 1_000_000, 32));
    let (k, g_tilde) = sampled_distinct(&table, 10_000);
    let g_hat = estimate::estimate_g(k, g_tilde);
    let (kind, costs) = cost::choose(g_hat, 32, 128, table.n_rows() - k, table.n_rows());
    assert!(
        matches!(kind, StrategyKind::Radix | StrategyKind::LockFree),
        "selector picked {kind:?} for uniform input (g_hat = {g_hat}, costs = {costs:?})"
    );
}

#[test]
fn alg2_result_matches_sequential_on_scenario_shapes() {
    for rows in [
        common::skewed_rows(120_000, 33),
        common::uniform_rows(120_000, 60_000, 34),
    ] {
        let table = RowTable::from_rows(&rows);
        let expected = common::reference_rows(&table);
        let got = common::run_sorted(Algorithm::AdaptiveAlg2, &table, 8, 2000);
        assert_eq!(got, expected);
    }
}

#[test]
fn alg1_and_alg3_results_match_sequential_on_scenario_shapes() {
    for rows in [
        common::skewed_rows(100_000, 35),
        common::uniform_rows(100_000, 40_000, 36),
    ] {
        let table = RowTable::from_rows(&rows);
        let expected = common::reference_rows(&table);
        for alg in [Algorithm::AdaptiveAlg1, Algorithm::AdaptiveAlg3] {
            let got = common::run_sorted(alg, &table, 8, 2000);
            assert_eq!(got, expected, "{alg} diverged");
        }
    }
}

#[test]
fn estimator_tracks_true_cardinality_on_generated_tables() {
    for groups in [100i64, 5_000] {
        let table = RowTable::from_rows(&common::uniform_rows(100_000, groups, 37));
        let (k, g_tilde) = sampled_distinct(&table, 10_000);
        let g_hat = estimate::estimate_g(k, g_tilde);
        let rel = (g_hat - groups as f64).abs() / groups as f64;
        assert!(
            rel < 0.25,
            "estimate {g_hat} too far from true {groups} (sampled {g_tilde}/{k})"
        );
    }
}
