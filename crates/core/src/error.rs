//! Error types for the aggregation testbed
//!
//! One unified error enum for the whole pipeline, built with `thiserror`.
//! Policy per kind:
//!
//! - **Config / UnknownAlgorithm**: abort with a diagnostic before any data
//!   is loaded.
//! - **Io / Parse**: abort with a diagnostic naming the offending file/line.
//! - **TableFull**: internal signal from the lock-free map; strategies
//!   recover by falling back to the radix engine, so callers outside the
//!   executor should never observe it.
//! - **Validation**: abort, reporting the first failing (key, field,
//!   expected, got).

use std::io;
use thiserror::Error;

/// Result type alias for testbed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the aggregation testbed
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (dataset or validation file access)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid experiment configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Algorithm name not recognised by the dispatcher
    #[error("unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),

    /// Malformed CSV input
    #[error("parse error in {path} at line {line}: {message}")]
    Parse {
        /// File being parsed
        path: String,
        /// 1-based line number (header is line 1)
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Lock-free table ran out of slots (load factor reached 1)
    #[error("lock-free table full at capacity {capacity}")]
    TableFull {
        /// Configured slot count
        capacity: usize,
    },

    /// Output disagrees with the reference aggregates
    #[error("validation mismatch for key {key}: {field} expected {expected}, got {got}")]
    Validation {
        /// Group key of the first failing row
        key: i64,
        /// Name of the first failing field (count/sum/min/max)
        field: &'static str,
        /// Reference value
        expected: i64,
        /// Computed value
        got: i64,
    },
}

impl Error {
    /// True for errors that strategies recover from internally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::TableFull { .. })
    }
}
