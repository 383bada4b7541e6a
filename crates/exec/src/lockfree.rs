//! Lock-free table engine
//!
//! No per-thread structure at all: every worker upserts straight into one
//! shared atomic table, and the "merge phase" is a single iteration over
//! the slots. Peak memory is O(G) instead of O(p·G).
//!
//! Standing alone there is no cardinality estimate, so the table gets one
//! slot per row, always enough for every distinct key. If an upsert still
//! reports a full table, the attempt is discarded and the radix engine
//! reruns the full input.

use groupby_agg::LockFreeAggMap;
use groupby_core::table::RowTable;
use groupby_core::{Error, Result, ResultRow};
use std::time::Instant;
use tracing::warn;

use crate::phases;
use crate::radix::RadixMerge;
use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Shared linear-probing atomic table engine.
pub struct LockFreeTable;

impl LockFreeTable {
    /// Run with an explicit slot count. The public entry sizes the table
    /// from the row count; the adaptive selector sizes it from Ĝ.
    pub(crate) fn run_with_capacity(
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
        capacity: usize,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();

        let t_agg = Instant::now();
        let map = LockFreeAggMap::with_capacity(capacity);
        match phases::scan_lockfree(table, 0..table.n_rows(), opts.num_threads, opts.batch_size, &map)
        {
            Ok(()) => {}
            Err(Error::TableFull { capacity }) => {
                warn!(capacity, "lock-free table full, falling back to two-phase-radix");
                drop(map);
                return RadixMerge.run(table, opts, timings);
            }
            Err(e) => return Err(e),
        }
        timings.record("aggregation_time", t_agg.elapsed());

        let t_output = Instant::now();
        let rows = map.snapshot();
        timings.record("write_output", t_output.elapsed());

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}

impl Strategy for LockFreeTable {
    fn name(&self) -> &'static str {
        "lock-free-hash-table"
    }

    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        Self::run_with_capacity(table, opts, timings, table.n_rows().max(1))
    }
}
