//! # groupby-bench
//!
//! A research testbed for parallel group-by aggregation on large
//! in-memory integer tables: given (key, value) i64 rows and a worker
//! count, compute {COUNT, SUM, MIN, MAX} per distinct key.
//!
//! The interesting parts live in the member crates:
//!
//! - [`groupby_core`]: the frozen row table, configuration, and shared types
//! - [`groupby_agg`]: the accumulator algebra, single-writer maps, and the
//!   lock-free atomic table
//! - [`groupby_exec`]: the strategy engines (central, tree, radix,
//!   lock-free, duckdbish) and the adaptive selectors
//! - [`groupby_dataset`]: gzipped-CSV loading, validation, and generation
//!
//! This facade re-exports the surface needed to drive a benchmark
//! programmatically:
//!
//! ```ignore
//! use groupby_bench::{run_algorithm, Algorithm, ExecOptions, RowTable};
//!
//! let table = RowTable::from_rows(&[(1, 10), (2, 5), (1, 7)]);
//! let (rows, timings) =
//!     run_algorithm(Algorithm::TwoPhaseRadix, &table, &ExecOptions::new(4))?;
//! # Ok::<(), groupby_bench::Error>(())
//! ```

pub use groupby_agg::{Accumulator, LocalAggMap, LockFreeAggMap};
pub use groupby_core::{
    hash64, partition_index, Algorithm, BenchConfig, Error, Result, ResultRow, RowTable,
    RowTableBuilder, StrategyKind, KEY_EMPTY,
};
pub use groupby_dataset::{generate, load_dataset, load_validation, validate};
pub use groupby_exec::{run_algorithm, strategy_for, ExecOptions, PhaseTimings, Strategy};
