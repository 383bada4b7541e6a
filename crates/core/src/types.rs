//! Shared value types: the slot sentinel, output rows, and the strategy
//! naming surface used by the CLI and the adaptive selector.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Reserved sentinel marking an empty slot in the lock-free map.
///
/// This key MUST NOT appear in user data; the loader rejects it at the
/// boundary so the slot-claim protocol can rely on it unconditionally.
pub const KEY_EMPTY: i64 = i64::MIN;

/// One output tuple: the four scalar aggregates for a distinct group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResultRow {
    /// Group key (column 0 of the input)
    pub key: i64,
    /// Number of input rows with this key
    pub count: i64,
    /// Wrapping sum of the values
    pub sum: i64,
    /// Minimum value
    pub min: i64,
    /// Maximum value
    pub max: i64,
}

impl ResultRow {
    /// Build a result row from a key and its four aggregates.
    pub fn new(key: i64, count: i64, sum: i64, min: i64, max: i64) -> Self {
        Self {
            key,
            count,
            sum,
            min,
            max,
        }
    }
}

/// The four primary parallel strategies.
///
/// The sequential baseline is a degenerate CENTRAL (p = 1, no merge), so it
/// does not appear here; `Algorithm` carries the full CLI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Two-phase with a serial centralised merge
    Central,
    /// Two-phase with a log2(p)-round tree merge
    Tree,
    /// Two-phase with hash-partitioned parallel merge
    Radix,
    /// Single shared lock-free table, no merge phase
    LockFree,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Central => "centralized-merge",
            StrategyKind::Tree => "tree-merge",
            StrategyKind::Radix => "two-phase-radix",
            StrategyKind::LockFree => "lock-free",
        };
        f.write_str(name)
    }
}

/// Every algorithm selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Single-thread baseline; defines reference output
    Sequential,
    /// Two-phase, worker 0 merges all local maps
    TwoPhaseCentralMerge,
    /// Two-phase, tree-shaped parallel merge
    TwoPhaseTreeMerge,
    /// Two-phase, radix-partitioned parallel merge
    TwoPhaseRadix,
    /// Starts central, repartitions late when cardinality turns out high
    DuckdbishTwoPhase,
    /// Shared linear-probing atomic table
    LockFreeHashTable,
    /// Adaptive selector, heuristic decision tree
    AdaptiveAlg1,
    /// Adaptive selector, cost-model driven
    AdaptiveAlg2,
    /// Adaptive selector, windowed re-decision with state migration
    AdaptiveAlg3,
}

impl Algorithm {
    /// All algorithm names accepted by `--algorithm`, in display order.
    pub const NAMES: [&'static str; 9] = [
        "sequential",
        "two-phase-central-merge",
        "two-phase-tree-merge",
        "two-phase-radix",
        "duckdbish-two-phase",
        "lock-free-hash-table",
        "adaptive-alg1",
        "adaptive-alg2",
        "adaptive-alg3",
    ];

    /// The CLI name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sequential => "sequential",
            Algorithm::TwoPhaseCentralMerge => "two-phase-central-merge",
            Algorithm::TwoPhaseTreeMerge => "two-phase-tree-merge",
            Algorithm::TwoPhaseRadix => "two-phase-radix",
            Algorithm::DuckdbishTwoPhase => "duckdbish-two-phase",
            Algorithm::LockFreeHashTable => "lock-free-hash-table",
            Algorithm::AdaptiveAlg1 => "adaptive-alg1",
            Algorithm::AdaptiveAlg2 => "adaptive-alg2",
            Algorithm::AdaptiveAlg3 => "adaptive-alg3",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Algorithm::Sequential),
            "two-phase-central-merge" => Ok(Algorithm::TwoPhaseCentralMerge),
            "two-phase-tree-merge" => Ok(Algorithm::TwoPhaseTreeMerge),
            "two-phase-radix" => Ok(Algorithm::TwoPhaseRadix),
            "duckdbish-two-phase" => Ok(Algorithm::DuckdbishTwoPhase),
            "lock-free-hash-table" => Ok(Algorithm::LockFreeHashTable),
            "adaptive-alg1" => Ok(Algorithm::AdaptiveAlg1),
            "adaptive-alg2" => Ok(Algorithm::AdaptiveAlg2),
            "adaptive-alg3" => Ok(Algorithm::AdaptiveAlg3),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}
