//! Two-phase radix merge
//!
//! Phase 1 routes every row into one of N = p · ratio partitions by key
//! hash, so each worker maintains N small maps instead of one big one.
//! Phase 2 merges each partition's stack of per-thread maps; partitions are
//! independent, so workers just pull partition indices from a shared cursor
//! and never contend. This engine also serves as the safety net when the
//! lock-free table overflows.

use groupby_core::table::RowTable;
use groupby_core::{Result, ResultRow};
use std::time::Instant;

use crate::phases;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Two-phase engine with hash-partitioned parallel merge.
pub struct RadixMerge;

impl Strategy for RadixMerge {
    fn name(&self) -> &'static str {
        "two-phase-radix"
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
        let per_thread = phases::scan_radix(
            table,
            0..table.n_rows(),
            opts.num_threads,
            opts.batch_size,
            opts.num_partitions,
        );
        timings.record("phase_1", t_phase1.elapsed());

        let t_phase2 = Instant::now();
        let partitions = phases::merge_radix(per_thread, opts.num_threads, opts.num_partitions);
        timings.record("phase_2", t_phase2.elapsed());
        timings.record("aggregation_time", t_agg.elapsed());

        let t_output = Instant::now();
        let rows = phases::rows_from_partitions(partitions);
        timings.record("write_output", t_output.elapsed());

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}
