//! Two-phase with late partitioning
//!
//! Starts exactly like the centralised engine. Any worker whose local map
//! grows past the adaptation threshold raises a shared flag and
//! redistributes its own map into the radix partition layout before it
//! reports in. After the scan barrier the stragglers (workers that
//! finished under the threshold but saw the flag) redistribute too, and
//! phase 2 proceeds as a radix merge. If nobody raised the flag the merge
//! stays centralised. Work already scanned is never thrown away.

use groupby_agg::LocalAggMap;
use groupby_core::table::RowTable;
use groupby_core::{partition_index, Result, ResultRow};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::debug;

use crate::phases;
use crate::scheduler::ChunkCursor;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// One worker's phase-1 product.
enum LocalState {
    /// Still a single map; cardinality stayed under the threshold
    Flat(LocalAggMap),
    /// Already redistributed into the N-partition layout
    Parted(Vec<LocalAggMap>),
}

/// Redistribute a flat map into `num_partitions` sub-maps by key hash.
fn partition_map(map: LocalAggMap, num_partitions: usize) -> Vec<LocalAggMap> {
    let mut parts: Vec<LocalAggMap> = (0..num_partitions).map(|_| LocalAggMap::new()).collect();
    for (&k, acc) in map.iter() {
        parts[partition_index(k, num_partitions)].absorb_accumulator(k, acc);
    }
    parts
}

/// Two-phase engine that converts itself into radix when cardinality turns
/// out high.
pub struct DuckdbishTwoPhase;

impl Strategy for DuckdbishTwoPhase {
    fn name(&self) -> &'static str {
        "duckdbish-two-phase"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();
        let t_agg = Instant::now();
        let num_partitions = opts.num_partitions;

        // PHASE 1: centralised scan, with opportunistic early repartition.
        let t_phase1 = Instant::now();
        let repartition = AtomicBool::new(false);
        let cursor = ChunkCursor::new(0..table.n_rows(), opts.batch_size);

        let mut states: Vec<LocalState> = thread::scope(|s| {
            let handles: Vec<_> = (0..opts.num_threads)
                .map(|_| {
                    s.spawn(|| {
                        let mut map = LocalAggMap::new();
                        while let Some(chunk) = cursor.next_chunk() {
                            for r in chunk {
                                map.absorb_row(table, r);
                            }
                        }
                        if map.len() > opts.adaptation_threshold {
                            repartition.store(true, Ordering::Release);
                            LocalState::Parted(partition_map(map, num_partitions))
                        } else {
                            LocalState::Flat(map)
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("scan worker panicked"))
                .collect()
        });

        let do_partition = repartition.load(Ordering::Acquire);
        if do_partition {
            debug!("local map exceeded adaptation threshold, repartitioning stragglers");
            // Stragglers redistribute in parallel; already-parted maps pass
            // through untouched.
            states = thread::scope(|s| {
                let handles: Vec<_> = states
                    .into_iter()
                    .map(|state| {
                        s.spawn(move || match state {
                            LocalState::Flat(map) => {
                                LocalState::Parted(partition_map(map, num_partitions))
                            }
                            parted => parted,
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().expect("repartition worker panicked"))
                    .collect()
            });
        }
        timings.record("phase_1", t_phase1.elapsed());

        // PHASE 2: radix merge if partitioned, centralised merge otherwise.
        let t_phase2 = Instant::now();
        let rows = if do_partition {
            let per_thread: Vec<Vec<LocalAggMap>> = states
                .into_iter()
                .map(|state| match state {
                    LocalState::Parted(parts) => parts,
                    // Unreachable once the flag is up, but harmless.
                    LocalState::Flat(map) => partition_map(map, num_partitions),
                })
                .collect();
            let partitions = phases::merge_radix(per_thread, opts.num_threads, num_partitions);
            timings.record("phase_2", t_phase2.elapsed());
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let rows = phases::rows_from_partitions(partitions);
            timings.record("write_output", t_output.elapsed());
            rows
        } else {
            let maps: Vec<LocalAggMap> = states
                .into_iter()
                .map(|state| match state {
                    LocalState::Flat(map) => map,
                    LocalState::Parted(parts) => {
                        // Can only happen if the threshold is 0; fold back.
                        let mut merged = LocalAggMap::new();
                        for part in &parts {
                            merged.merge_from(part);
                        }
                        merged
                    }
                })
                .collect();
            let mut merged = phases::merge_central(maps);
            timings.record("phase_2", t_phase2.elapsed());
            timings.record("aggregation_time", t_agg.elapsed());

            let t_output = Instant::now();
            let mut rows = Vec::new();
            merged.drain_into(&mut rows);
            timings.record("write_output", t_output.elapsed());
            rows
        };

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}
