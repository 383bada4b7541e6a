//! Strategy engines and the adaptive selector
//!
//! Every engine consumes a frozen [`groupby_core::RowTable`] and a thread
//! count, and produces one result row per distinct key. The engines differ
//! only in concurrency discipline:
//!
//! - `sequential`: single-thread baseline, defines reference output
//! - `central`: parallel scan into per-thread maps, serial merge
//! - `tree`: parallel scan, log2(p)-round parallel tree merge
//! - `radix`: hash-partitioned scan, embarrassingly parallel merge
//! - `lockfree`: one shared atomic table, no merge phase at all
//! - `duckdbish`: starts central, repartitions late if cardinality is high
//! - `adaptive`: samples a prefix, estimates cardinality, picks one of the
//!   above (heuristic, cost-model, or windowed re-decision)
//!
//! Execution is bulk-synchronous: scoped worker threads, dynamic chunk
//! scheduling within a phase, and a happens-before edge at every phase
//! boundary.

pub mod adaptive;
pub mod central;
pub mod duckdbish;
pub mod lockfree;
pub mod phases;
pub mod radix;
pub mod scheduler;
pub mod sequential;
pub mod strategy;
pub mod timing;
pub mod tree;

pub use adaptive::{AdaptiveAlg1, AdaptiveAlg2, AdaptiveAlg3};
pub use central::CentralMerge;
pub use duckdbish::DuckdbishTwoPhase;
pub use lockfree::LockFreeTable;
pub use radix::RadixMerge;
pub use scheduler::ChunkCursor;
pub use sequential::Sequential;
pub use strategy::{run_algorithm, strategy_for, ExecOptions, Strategy};
pub use timing::PhaseTimings;
pub use tree::TreeMerge;
