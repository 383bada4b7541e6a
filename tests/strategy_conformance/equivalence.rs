//! Cross-strategy agreement and determinism.

use crate::common;
use groupby_bench::RowTable;

#[test]
fn all_strategies_agree_on_skewed_input() {
    let table = RowTable::from_rows(&common::skewed_rows(50_000, 21));
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        for p in [2, 4, 7] {
            let rows = common::run_sorted(alg, &table, p, 750);
            assert_eq!(rows, expected, "{alg} diverged at p = {p}");
        }
    }
}

#[test]
fn all_strategies_agree_on_uniform_input() {
    let table = RowTable::from_rows(&common::uniform_rows(50_000, 20_000, 22));
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        for p in [2, 4, 8] {
            let rows = common::run_sorted(alg, &table, p, 500);
            assert_eq!(rows, expected, "{alg} diverged at p = {p}");
        }
    }
}

#[test]
fn all_strategies_agree_on_negative_keys_and_values() {
    let rows: Vec<(i64, i64)> = (0..10_000)
        .map(|i| ((i % 100) - 50, (i % 701) - 350))
        .collect();
    let table = RowTable::from_rows(&rows);
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        let rows = common::run_sorted(alg, &table, 3, 123);
        assert_eq!(rows, expected, "{alg} diverged on negative domain");
    }
}

#[test]
fn repeated_runs_are_deterministic() {
    // The reduction is associative and commutative, so the output multiset
    // must be identical across repeat runs regardless of interleaving.
    let table = RowTable::from_rows(&common::uniform_rows(40_000, 3_000, 23));
    for alg in common::parallel_algorithms() {
        let first = common::run_sorted(alg, &table, 8, 256);
        for _ in 0..3 {
            let again = common::run_sorted(alg, &table, 8, 256);
            assert_eq!(again, first, "{alg} was not deterministic");
        }
    }
}

#[test]
fn batch_size_does_not_change_output() {
    let table = RowTable::from_rows(&common::skewed_rows(20_000, 24));
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        for batch in [1, 17, 1000, 100_000] {
            let rows = common::run_sorted(alg, &table, 4, batch);
            assert_eq!(rows, expected, "{alg} diverged at batch = {batch}");
        }
    }
}
