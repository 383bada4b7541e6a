//! Aggregation state for the group-by testbed
//!
//! Three layers, strictly ordered by concurrency discipline:
//! - [`Accumulator`]: the (count, sum, min, max) reduction algebra, a plain
//!   value type with no synchronisation
//! - [`LocalAggMap`]: single-writer hash map from key to accumulator, the
//!   workhorse of every two-phase strategy
//! - [`LockFreeAggMap`]: fixed-capacity linear-probing table with per-slot
//!   atomics, concurrently upserted by every worker

pub mod accumulator;
pub mod local_map;
pub mod lock_free;

pub use accumulator::Accumulator;
pub use local_map::LocalAggMap;
pub use lock_free::LockFreeAggMap;
