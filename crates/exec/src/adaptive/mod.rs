//! Adaptive strategy selection
//!
//! All three selectors share the same bones: sample a prefix of the table
//! single-threaded, estimate the distinct-key count from what the sample
//! saw, pick an engine, and run it over the remaining rows, folding the
//! sampling map into the final result so no row is counted twice.
//!
//! - [`AdaptiveAlg1`]: fixed heuristic decision tree over (Ĝ, p)
//! - [`AdaptiveAlg2`]: cost-model driven, one decision up front
//! - [`AdaptiveAlg3`]: windowed; re-decides as the scan progresses and
//!   migrates in-flight state (in `windowed.rs`)

pub mod cost;
pub mod estimate;
mod windowed;

pub use windowed::AdaptiveAlg3;

use groupby_agg::{LocalAggMap, LockFreeAggMap};
use groupby_core::table::RowTable;
use groupby_core::{partition_index, Result, ResultRow, StrategyKind};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::phases;
use crate::radix::RadixMerge;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Rows scanned single-threaded before the strategy decision.
pub const SAMPLE_PREFIX_LEN: usize = 10_000;

/// Scan the sampling prefix into a plain local map.
///
/// Returns the map and the prefix length actually used (the whole table
/// when it is shorter than the prefix).
fn sample_prefix(table: &RowTable) -> (LocalAggMap, usize) {
    let k = SAMPLE_PREFIX_LEN.min(table.n_rows());
    let mut map = LocalAggMap::new();
    for r in 0..k {
        map.absorb_row(table, r);
    }
    (map, k)
}

/// Slot count for an adaptively sized lock-free table: 4x the estimate,
/// never more than one slot per row (which is always sufficient).
fn lockfree_capacity(g_hat: f64, n_rows: usize) -> usize {
    let want = (4.0 * g_hat).ceil() as usize;
    want.max(64).min(n_rows.max(64))
}

/// Run the decided engine over rows `[sample_len, n_rows)` and fold the
/// sampling map into the result.
#[allow(clippy::too_many_arguments)]
fn run_decided(
    kind: StrategyKind,
    table: &RowTable,
    opts: &ExecOptions,
    timings: &mut PhaseTimings,
    sample: LocalAggMap,
    sample_len: usize,
    g_hat: f64,
    t_overall: Instant,
    t_agg: Instant,
) -> Result<Vec<ResultRow>> {
    let rest = sample_len..table.n_rows();
    match kind {
        StrategyKind::Central | StrategyKind::Tree => {
            let t_phase1 = Instant::now();
            let maps = phases::scan_local(table, rest, opts.num_threads, opts.batch_size);
            timings.record("phase_1", t_phase1.elapsed());

            let t_phase2 = Instant::now();
            let mut merged = if kind == StrategyKind::Central {
                phases::merge_central(maps)
            } else {
                phases::merge_tree(maps)
            };
            merged.merge_from(&sample);
            timings.record("phase_2", t_phase2.elapsed());
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let mut rows = Vec::new();
            merged.drain_into(&mut rows);
            timings.record("write_output", t_output.elapsed());
            timings.record("elapsed_time", t_overall.elapsed());
            Ok(rows)
        }
        StrategyKind::Radix => {
            let t_phase1 = Instant::now();
            let per_thread = phases::scan_radix(
                table,
                rest,
                opts.num_threads,
                opts.batch_size,
                opts.num_partitions,
            );
            timings.record("phase_1", t_phase1.elapsed());

            let t_phase2 = Instant::now();
            let mut partitions =
                phases::merge_radix(per_thread, opts.num_threads, opts.num_partitions);
            // Sampled rows route by the same hash as scanned rows.
            for (&k, acc) in sample.iter() {
                partitions[partition_index(k, opts.num_partitions)].absorb_accumulator(k, acc);
            }
            timings.record("phase_2", t_phase2.elapsed());
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let rows = phases::rows_from_partitions(partitions);
            timings.record("write_output", t_output.elapsed());
            timings.record("elapsed_time", t_overall.elapsed());
            Ok(rows)
        }
        StrategyKind::LockFree => {
            let capacity = lockfree_capacity(g_hat, table.n_rows());
            let map = LockFreeAggMap::with_capacity(capacity);
            let scan =
                phases::scan_lockfree(table, rest, opts.num_threads, opts.batch_size, &map);
            let merged_sample = scan.is_ok()
                && sample.iter().all(|(&k, acc)| map.accumulate(k, acc));
            if !merged_sample {
                // Partial lock-free state is unusable; rerun everything
                // through the radix engine.
                warn!(
                    capacity,
                    "adaptive lock-free attempt overflowed, rerunning as two-phase-radix"
                );
                drop(map);
                return RadixMerge.run(table, opts, timings);
            }
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let rows = map.snapshot();
            timings.record("write_output", t_output.elapsed());
            timings.record("elapsed_time", t_overall.elapsed());
            Ok(rows)
        }
    }
}

/// Heuristic-tree selector: a fixed decision tree over the estimate and
/// the thread count. Kept as the degraded fallback variant.
pub struct AdaptiveAlg1;

impl Strategy for AdaptiveAlg1 {
    fn name(&self) -> &'static str {
        "adaptive-alg1"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();
        let t_agg = Instant::now();

        let t_phase0 = Instant::now();
        let (sample, k) = sample_prefix(table);
        let g_tilde = sample.len();
        let g_hat = estimate::estimate_g(k, g_tilde);
        let p = opts.num_threads;

        let kind = if g_hat < cost::LOCKFREE_MIN_GROUPS && p < 32 {
            if p <= 4 {
                StrategyKind::Central
            } else {
                StrategyKind::Tree
            }
        } else if p < 16 && 100 * g_tilde < 95 * k {
            // The sample was not saturated with fresh keys, so the estimate
            // is trustworthy enough to size a table from.
            StrategyKind::LockFree
        } else {
            StrategyKind::Radix
        };
        info!(g_tilde, g_hat, p, strategy = %kind, "heuristic selector decision");
        timings.record("phase_0", t_phase0.elapsed());

        run_decided(
            kind, table, opts, timings, sample, k, g_hat, t_overall, t_agg,
        )
    }
}

/// Cost-model selector: estimates Ĝ once, prices every engine, and runs
/// the cheapest over the remainder of the table.
pub struct AdaptiveAlg2;

impl Strategy for AdaptiveAlg2 {
    fn name(&self) -> &'static str {
        "adaptive-alg2"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();
        let t_agg = Instant::now();

        let t_phase0 = Instant::now();
        let (sample, k) = sample_prefix(table);
        let g_tilde = sample.len();
        let g_hat = estimate::estimate_g(k, g_tilde);

        let rows_remaining = table.n_rows() - k;
        let (kind, costs) = cost::choose(
            g_hat,
            opts.num_threads,
            opts.num_partitions,
            rows_remaining,
            table.n_rows(),
        );
        debug!(
            g_tilde,
            g_hat,
            central = costs.central,
            tree = costs.tree,
            radix = costs.radix,
            lockfree_eligible = costs.lockfree_eligible,
            "cost model breakdown"
        );
        info!(strategy = %kind, "cost-model selector decision");
        timings.record("phase_0", t_phase0.elapsed());

        run_decided(
            kind, table, opts, timings, sample, k, g_hat, t_overall, t_agg,
        )
    }
}
