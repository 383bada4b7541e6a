//! Windowed adaptive selector
//!
//! Instead of one decision after a fixed prefix, consume the table in
//! geometrically growing windows (S, 2S, 4S, ...) and re-run the cost
//! model after each one. The first window runs on a few threads with a
//! centralised plan; as evidence accumulates the plan can switch to the
//! radix layout or to a lock-free table grown to fit the estimate. Nothing
//! scanned is ever discarded: every structure that was touched is folded
//! into the final result.
//!
//! Cardinality evidence comes from worker 0, which records every 32nd row
//! key it scans into a sample set. The estimate is kept monotone across
//! windows (refined upward, never shrunk), so the plan cannot oscillate
//! back to a structure it already abandoned.

use groupby_agg::{LocalAggMap, LockFreeAggMap};
use groupby_core::table::RowTable;
use groupby_core::{partition_index, Error, Result, ResultRow, StrategyKind};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};
use xxhash_rust::xxh3::Xxh3Builder;

use crate::adaptive::{cost, estimate};
use crate::phases;
use crate::radix::RadixMerge;
use crate::scheduler::ChunkCursor;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Worker 0 samples one row in this many.
const SAMPLE_STRIDE: usize = 32;

/// Grow the lock-free table to this multiple of Ĝ...
const LOCKFREE_WANT_FACTOR: f64 = 12.0;

/// ...but tolerate an existing table down to this multiple.
const LOCKFREE_ACCEPT_FACTOR: f64 = 4.0;

/// Occasional key sample accumulated across windows.
#[derive(Default)]
struct KeySampler {
    keys: HashSet<i64, Xxh3Builder>,
    rows_sampled: usize,
}

impl KeySampler {
    fn extend(&mut self, sampled: Vec<i64>) {
        self.rows_sampled += sampled.len();
        self.keys.extend(sampled);
    }

    fn estimate(&self) -> f64 {
        estimate::estimate_g(self.rows_sampled, self.keys.len())
    }
}

/// Windowed cost-model selector with in-flight state migration.
pub struct AdaptiveAlg3;

impl Strategy for AdaptiveAlg3 {
    fn name(&self) -> &'static str {
        "adaptive-alg3"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();
        let t_agg = Instant::now();

        let n = table.n_rows();
        let p = opts.num_threads;
        let num_partitions = opts.num_partitions;

        let mut maps: Vec<LocalAggMap> = (0..p).map(|_| LocalAggMap::new()).collect();
        let mut radix: Vec<Vec<LocalAggMap>> = (0..p)
            .map(|_| (0..num_partitions).map(|_| LocalAggMap::new()).collect())
            .collect();
        let mut lock_free: Option<LockFreeAggMap> = None;
        let mut touched_radix = false;
        let mut touched_lockfree = false;

        let mut decision = StrategyKind::Central;
        // Warm-up window runs narrow; later windows use the full width.
        let mut threads = p.min(4);
        let mut sampler = KeySampler::default();
        let mut window = opts.batch_size.max(1);
        let mut lo = 0usize;
        let mut g_hat_floor = 1.0f64;

        while lo < n {
            let hi = (lo + window).min(n);
            let scanned = scan_window(
                table,
                lo..hi,
                threads,
                opts.batch_size,
                decision,
                &mut maps,
                &mut radix,
                lock_free.as_ref(),
                num_partitions,
                &mut sampler,
            );
            match scanned {
                Ok(()) => {}
                Err(Error::TableFull { capacity }) => {
                    warn!(
                        capacity,
                        "windowed lock-free state overflowed, rerunning as two-phase-radix"
                    );
                    return RadixMerge.run(table, opts, timings);
                }
                Err(e) => return Err(e),
            }

            if hi >= n {
                break;
            }

            // Re-decide for the next window. The estimate never shrinks.
            let g_hat = sampler.estimate().max(g_hat_floor);
            g_hat_floor = g_hat;

            if decision == StrategyKind::LockFree || cost::lockfree_eligible(g_hat, p, hi) {
                decision = StrategyKind::LockFree;
                lock_free = Some(grown_lockfree(
                    lock_free.take(),
                    g_hat,
                    touched_lockfree,
                    n,
                ));
                touched_lockfree = true;
                debug!(rows_seen = hi, g_hat, "window decision: lock-free");
            } else {
                let (kind, _) =
                    cost::cheapest_two_phase(g_hat, p, num_partitions, window * 2);
                decision = kind;
                if decision == StrategyKind::Radix {
                    touched_radix = true;
                }
                debug!(rows_seen = hi, g_hat, strategy = %decision, "window decision");
            }

            lo = hi;
            window *= 2;
            threads = p;
        }

        // Consolidate every structure that was touched.
        let merged_partitions = if touched_radix {
            Some(phases::merge_radix(radix, p, num_partitions))
        } else {
            None
        };
        let mut merged_map = phases::merge_tree(maps);

        let rows = if touched_lockfree {
            // lock_free is always Some once touched.
            let lf = lock_free.take().unwrap_or_else(|| LockFreeAggMap::with_capacity(0));
            let mut ok = true;
            if let Some(partitions) = merged_partitions {
                for map in &partitions {
                    for (&k, acc) in map.iter() {
                        ok &= lf.accumulate(k, acc);
                    }
                }
            }
            for (&k, acc) in merged_map.iter() {
                ok &= lf.accumulate(k, acc);
            }
            if !ok {
                warn!("lock-free consolidation overflowed, rerunning as two-phase-radix");
                return RadixMerge.run(table, opts, timings);
            }
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let rows = lf.snapshot();
            timings.record("write_output", t_output.elapsed());
            rows
        } else if let Some(mut partitions) = merged_partitions {
            for (&k, acc) in merged_map.iter() {
                partitions[partition_index(k, num_partitions)].absorb_accumulator(k, acc);
            }
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let rows = phases::rows_from_partitions(partitions);
            timings.record("write_output", t_output.elapsed());
            rows
        } else {
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let mut rows = Vec::new();
            merged_map.drain_into(&mut rows);
            timings.record("write_output", t_output.elapsed());
            rows
        };

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}

/// Allocate or grow the lock-free table for the current estimate. An
/// already-written table is only replaced before its first lock-free
/// window; after that its capacity is committed.
fn grown_lockfree(
    existing: Option<LockFreeAggMap>,
    g_hat: f64,
    touched: bool,
    n_rows: usize,
) -> LockFreeAggMap {
    let want = ((LOCKFREE_WANT_FACTOR * g_hat).ceil() as usize)
        .max(1024)
        .min(n_rows.max(1024));
    let accept = (LOCKFREE_ACCEPT_FACTOR * g_hat).ceil() as usize;

    match existing {
        None => LockFreeAggMap::with_capacity(want),
        Some(map) if map.capacity() < accept && !touched => {
            debug!(
                from = map.capacity(),
                to = want,
                "growing lock-free table before first use"
            );
            let bigger = LockFreeAggMap::with_capacity(want);
            map.for_each_entry(|row| {
                // The fresh table is strictly larger; migration cannot fail.
                bigger.accumulate_fields(row.key, row.count, row.sum, row.min, row.max);
            });
            bigger
        }
        Some(map) => map,
    }
}

/// Scan one window under the current plan.
#[allow(clippy::too_many_arguments)]
fn scan_window(
    table: &RowTable,
    range: Range<usize>,
    threads: usize,
    batch: usize,
    decision: StrategyKind,
    maps: &mut [LocalAggMap],
    radix: &mut [Vec<LocalAggMap>],
    lock_free: Option<&LockFreeAggMap>,
    num_partitions: usize,
    sampler: &mut KeySampler,
) -> Result<()> {
    let cursor = ChunkCursor::new(range, batch);
    let full = AtomicBool::new(false);

    let sampled: Vec<i64> = thread::scope(|s| {
        let handles: Vec<_> = maps
            .iter_mut()
            .zip(radix.iter_mut())
            .take(threads.max(1))
            .enumerate()
            .map(|(worker, (map, parts))| {
                let cursor = &cursor;
                let full = &full;
                s.spawn(move || {
                    let mut samples = Vec::new();
                    while let Some(chunk) = cursor.next_chunk() {
                        for r in chunk {
                            if worker == 0 && r % SAMPLE_STRIDE == 0 {
                                samples.push(table.key(r));
                            }
                            match decision {
                                StrategyKind::Central | StrategyKind::Tree => {
                                    map.absorb_row(table, r);
                                }
                                StrategyKind::Radix => {
                                    let part = partition_index(table.key(r), num_partitions);
                                    parts[part].absorb_row(table, r);
                                }
                                StrategyKind::LockFree => {
                                    let lf =
                                        lock_free.expect("lock-free plan without a table");
                                    if !lf.upsert(table.key(r), table.value(r)) {
                                        full.store(true, Ordering::Release);
                                        return samples;
                                    }
                                }
                            }
                        }
                    }
                    samples
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().expect("window worker panicked"))
            .collect()
    });
    sampler.extend(sampled);

    if full.load(Ordering::Acquire) {
        Err(Error::TableFull {
            capacity: lock_free.map(|m| m.capacity()).unwrap_or(0),
        })
    } else {
        Ok(())
    }
}
