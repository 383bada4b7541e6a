//! Two-phase tree merge
//!
//! Phase 1 is identical to the centralised engine. Phase 2 halves the live
//! map count every round: round r has every map at an index divisible by
//! 2^r absorb the map 2^(r-1) above it, with a barrier between rounds. The
//! merge work drops from O((p-1)·G) to O(G·log p), at the price of moving
//! G-sized maps across cores each round.

use groupby_core::table::RowTable;
use groupby_core::{Result, ResultRow};
use std::time::Instant;

use crate::phases;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Two-phase engine with a log2(p)-round parallel tree merge.
pub struct TreeMerge;

impl Strategy for TreeMerge {
    fn name(&self) -> &'static str {
        "two-phase-tree-merge"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();
        let t_agg = Instant::now();

        let t_phase1 = Instant::now();
        let maps = phases::scan_local(table, 0..table.n_rows(), opts.num_threads, opts.batch_size);
        timings.record("phase_1", t_phase1.elapsed());

        let t_phase2 = Instant::now();
        let mut merged = phases::merge_tree(maps);
        timings.record("phase_2", t_phase2.elapsed());
        timings.record("aggregation_time", t_agg.elapsed());

        let t_output = Instant::now();
        let mut rows = Vec::new();
        merged.drain_into(&mut rows);
        timings.record("write_output", t_output.elapsed());

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}
