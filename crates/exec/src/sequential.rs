//! Sequential baseline
//!
//! One thread, one map, no phases. Every other engine is checked against
//! this one's output.

use groupby_agg::LocalAggMap;
use groupby_core::table::RowTable;
use groupby_core::{Result, ResultRow};
use std::time::Instant;

use crate::strategy::{ExecOptions, Strategy};
use crate::timing::PhaseTimings;

/// Single-thread reference engine.
pub struct Sequential;

impl Strategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn run(
        &self,
        table: &RowTable,
        _opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>> {
        let t_overall = Instant::now();

        let t_agg = Instant::now();
        let mut map = LocalAggMap::new();
        for r in 0..table.n_rows() {
            map.absorb_row(table, r);
        }
        timings.record("aggregation_time", t_agg.elapsed());

        let t_output = Instant::now();
        let mut rows = Vec::new();
        map.drain_into(&mut rows);
        timings.record("write_output", t_output.elapsed());

        timings.record("elapsed_time", t_overall.elapsed());
        Ok(rows)
    }
}
