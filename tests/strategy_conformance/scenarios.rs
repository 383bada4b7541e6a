//! Concrete end-to-end scenarios and boundary behaviours.

use crate::common;
use groupby_bench::{run_algorithm, Algorithm, ExecOptions, ResultRow, RowTable};

fn scenario_a_table() -> RowTable {
    RowTable::from_rows(&[(1, 10), (2, 5), (1, 7), (2, 3), (1, 20)])
}

#[test]
fn scenario_a_sequential() {
    let rows = common::run_sorted(Algorithm::Sequential, &scenario_a_table(), 1, 10_000);
    assert_eq!(
        rows,
        vec![ResultRow::new(1, 3, 37, 7, 20), ResultRow::new(2, 2, 8, 3, 5)]
    );
}

#[test]
fn scenario_b_radix_four_threads() {
    let rows = common::run_sorted(Algorithm::TwoPhaseRadix, &scenario_a_table(), 4, 10_000);
    assert_eq!(
        rows,
        vec![ResultRow::new(1, 3, 37, 7, 20), ResultRow::new(2, 2, 8, 3, 5)]
    );
}

#[test]
fn scenario_c_tree_merge_hot_key() {
    let table = RowTable::from_rows(&vec![(5, 100); 1000]);
    let rows = common::run_sorted(Algorithm::TwoPhaseTreeMerge, &table, 8, 50);
    assert_eq!(rows, vec![ResultRow::new(5, 1000, 100_000, 100, 100)]);
}

#[test]
fn scenario_d_lockfree_distinct_keys() {
    let table = RowTable::from_rows(&(0..10).map(|i| (i, i)).collect::<Vec<_>>());
    let rows = common::run_sorted(Algorithm::LockFreeHashTable, &table, 4, 2);
    assert_eq!(rows.len(), 10);
    for (i, row) in rows.iter().enumerate() {
        let i = i as i64;
        assert_eq!(*row, ResultRow::new(i, 1, i, i, i));
    }
}

#[test]
fn boundary_empty_table_every_algorithm() {
    let table = RowTable::from_rows(&[]);
    for alg in Algorithm::NAMES {
        let alg: Algorithm = alg.parse().unwrap();
        let (rows, _) = run_algorithm(alg, &table, &ExecOptions::new(4)).unwrap();
        assert!(rows.is_empty(), "{alg} produced rows from an empty table");
    }
}

#[test]
fn boundary_single_thread_matches_sequential() {
    let table = RowTable::from_rows(&common::uniform_rows(20_000, 500, 9));
    let expected = common::reference_rows(&table);
    for alg in common::parallel_algorithms() {
        let rows = common::run_sorted(alg, &table, 1, 1000);
        assert_eq!(rows, expected, "{alg} diverged at p = 1");
    }
}

#[test]
fn boundary_all_rows_one_key() {
    let table = RowTable::from_rows(&(0..5000).map(|i| (7, i)).collect::<Vec<_>>());
    for alg in common::parallel_algorithms() {
        let rows = common::run_sorted(alg, &table, 4, 250);
        assert_eq!(
            rows,
            vec![ResultRow::new(7, 5000, (0..5000).sum(), 0, 4999)],
            "{alg} mishandled the single-key table"
        );
    }
}

#[test]
fn boundary_all_keys_distinct() {
    let table = RowTable::from_rows(&(0..4000).map(|i| (i, i * 2)).collect::<Vec<_>>());
    for alg in common::parallel_algorithms() {
        let rows = common::run_sorted(alg, &table, 4, 200);
        assert_eq!(rows.len(), 4000, "{alg} lost or invented keys");
        for (i, row) in rows.iter().enumerate() {
            let i = i as i64;
            assert_eq!(*row, ResultRow::new(i, 1, i * 2, i * 2, i * 2));
        }
    }
}

#[test]
fn partition_coverage_counts_sum_to_row_count() {
    let table = RowTable::from_rows(&common::skewed_rows(30_000, 4));
    for alg in common::parallel_algorithms() {
        let rows = common::run_sorted(alg, &table, 4, 500);
        let total: i64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 30_000, "{alg} dropped or duplicated rows");
    }
}
