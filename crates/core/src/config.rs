//! Experiment configuration
//!
//! Mirrors the driver's CLI surface. Constructed once per invocation,
//! validated before any data is loaded, then shared immutably with the
//! strategies.

use crate::error::{Error, Result};
use crate::types::Algorithm;
use std::path::PathBuf;

/// Default scan chunk handed to a worker in one dynamic-scheduling step.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default radix partition count as a multiple of the thread count.
pub const DEFAULT_RADIX_RATIO: usize = 4;

/// Default local-map size at which the duckdb-style engine repartitions.
pub const DEFAULT_ADAPTATION_THRESHOLD: usize = 10_000;

/// Default number of untimed warm-up runs.
pub const DEFAULT_NUM_DRYRUNS: usize = 3;

/// Default number of timed trials.
pub const DEFAULT_NUM_TRIALS: usize = 5;

/// Full experiment configuration for one driver invocation.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Worker thread count p (>= 1)
    pub num_threads: usize,
    /// Strategy to run
    pub algorithm: Algorithm,
    /// Gzipped CSV input
    pub dataset_file_path: PathBuf,
    /// Gzipped CSV reference aggregates
    pub validation_file_path: PathBuf,
    /// Untimed warm-up runs before measurement
    pub num_dryruns: usize,
    /// Timed trials
    pub num_trials: usize,
    /// Rows per dynamic-scheduling chunk
    pub batch_size: usize,
    /// Radix partitions per thread (N = p * ratio)
    pub radix_partition_cnt_ratio: usize,
    /// Local-map entry count that triggers late repartitioning
    pub duckdb_style_adaptation_threshold: usize,
}

impl BenchConfig {
    /// Configuration with defaults for everything the CLI does not require.
    pub fn new(
        num_threads: usize,
        algorithm: Algorithm,
        dataset_file_path: impl Into<PathBuf>,
        validation_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            num_threads,
            algorithm,
            dataset_file_path: dataset_file_path.into(),
            validation_file_path: validation_file_path.into(),
            num_dryruns: DEFAULT_NUM_DRYRUNS,
            num_trials: DEFAULT_NUM_TRIALS,
            batch_size: DEFAULT_BATCH_SIZE,
            radix_partition_cnt_ratio: DEFAULT_RADIX_RATIO,
            duckdb_style_adaptation_threshold: DEFAULT_ADAPTATION_THRESHOLD,
        }
    }

    /// Number of radix partitions N for this configuration.
    pub fn num_partitions(&self) -> usize {
        self.num_threads * self.radix_partition_cnt_ratio
    }

    /// Reject configurations the strategies cannot run with.
    ///
    /// Called by the driver before the dataset is touched, so bad flags fail
    /// fast with a diagnostic rather than mid-trial.
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(Error::Config("--num-threads must be >= 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("--batch-size must be >= 1".into()));
        }
        if self.radix_partition_cnt_ratio == 0 {
            return Err(Error::Config(
                "--radix-partition-cnt-ratio must be >= 1".into(),
            ));
        }
        if !self.dataset_file_path.exists() {
            return Err(Error::Config(format!(
                "dataset file does not exist: {}",
                self.dataset_file_path.display()
            )));
        }
        Ok(())
    }
}
