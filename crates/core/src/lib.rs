//! Core types for the group-by aggregation testbed
//!
//! This crate defines the foundational pieces shared by every strategy:
//! - RowTable: dense, frozen (key, value) row store with O(1) indexed access
//! - BenchConfig: experiment configuration (threads, batch size, trial counts)
//! - Algorithm / StrategyKind: the dispatchable strategy surface
//! - ResultRow: one output tuple per distinct group key
//! - Error: error type hierarchy
//! - hash64: the reference 64-bit group-key hash (xxh3)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod hash;
pub mod table;
pub mod types;

pub use config::BenchConfig;
pub use error::{Error, Result};
pub use hash::{hash64, partition_index};
pub use table::{RowTable, RowTableBuilder};
pub use types::{Algorithm, ResultRow, StrategyKind, KEY_EMPTY};
