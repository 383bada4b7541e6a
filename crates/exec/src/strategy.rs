//! The strategy seam
//!
//! Engines hide behind one capability so the driver and the adaptive
//! selector dispatch uniformly: `run(table, options) -> result rows`, with
//! phase durations reported on the side.

use groupby_core::config::BenchConfig;
use groupby_core::table::RowTable;
use groupby_core::{Algorithm, Result, ResultRow};

use crate::adaptive::{AdaptiveAlg1, AdaptiveAlg2, AdaptiveAlg3};
use crate::central::CentralMerge;
use crate::duckdbish::DuckdbishTwoPhase;
use crate::lockfree::LockFreeTable;
use crate::radix::RadixMerge;
use crate::sequential::Sequential;
use crate::timing::PhaseTimings;
use crate::tree::TreeMerge;

/// Everything a strategy needs to know besides the table itself.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Worker thread count p
    pub num_threads: usize,
    /// Rows per dynamic-scheduling chunk
    pub batch_size: usize,
    /// Radix partition count N
    pub num_partitions: usize,
    /// Local-map size triggering late repartitioning (duckdbish)
    pub adaptation_threshold: usize,
}

impl ExecOptions {
    /// Options for `num_threads` workers with the configuration defaults.
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            batch_size: groupby_core::config::DEFAULT_BATCH_SIZE,
            num_partitions: num_threads * groupby_core::config::DEFAULT_RADIX_RATIO,
            adaptation_threshold: groupby_core::config::DEFAULT_ADAPTATION_THRESHOLD,
        }
    }

    /// Options taken from a full benchmark configuration.
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            num_threads: config.num_threads,
            batch_size: config.batch_size,
            num_partitions: config.num_partitions(),
            adaptation_threshold: config.duckdb_style_adaptation_threshold,
        }
    }
}

/// A runnable aggregation strategy.
pub trait Strategy: Send + Sync {
    /// CLI-facing name.
    fn name(&self) -> &'static str;

    /// Aggregate the whole table, recording phase durations into `timings`.
    fn run(
        &self,
        table: &RowTable,
        opts: &ExecOptions,
        timings: &mut PhaseTimings,
    ) -> Result<Vec<ResultRow>>;
}

/// The engine registered for `algorithm`.
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn Strategy> {
    match algorithm {
        Algorithm::Sequential => Box::new(Sequential),
        Algorithm::TwoPhaseCentralMerge => Box::new(CentralMerge),
        Algorithm::TwoPhaseTreeMerge => Box::new(TreeMerge),
        Algorithm::TwoPhaseRadix => Box::new(RadixMerge),
        Algorithm::DuckdbishTwoPhase => Box::new(DuckdbishTwoPhase),
        Algorithm::LockFreeHashTable => Box::new(LockFreeTable),
        Algorithm::AdaptiveAlg1 => Box::new(AdaptiveAlg1),
        Algorithm::AdaptiveAlg2 => Box::new(AdaptiveAlg2),
        Algorithm::AdaptiveAlg3 => Box::new(AdaptiveAlg3),
    }
}

/// Convenience entry point: run `algorithm` over `table` and return the
/// rows plus the recorded phase timings.
pub fn run_algorithm(
    algorithm: Algorithm,
    table: &RowTable,
    opts: &ExecOptions,
) -> Result<(Vec<ResultRow>, PhaseTimings)> {
    let strategy = strategy_for(algorithm);
    let mut timings = PhaseTimings::new();
    let rows = strategy.run(table, opts, &mut timings)?;
    Ok((rows, timings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_algorithm_has_an_engine() {
        for name in Algorithm::NAMES {
            let alg: Algorithm = name.parse().unwrap();
            assert_eq!(strategy_for(alg).name(), name);
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = BenchConfig::new(8, Algorithm::TwoPhaseRadix, "/dev/null", "/dev/null");
        let opts = ExecOptions::from_config(&config);
        assert_eq!(opts.num_threads, 8);
        assert_eq!(opts.num_partitions, 32);
        assert_eq!(opts.batch_size, 10_000);
    }
}
