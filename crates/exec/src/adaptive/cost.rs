//! Strategy cost model
//!
//! Abstract work units as functions of the estimated group count Ĝ, the
//! thread count p, the partition count N, and the rows still to scan S.
//! The constants are empirical and deliberately collected here so they can
//! be re-tuned for a target platform in one place.
//!
//! Scan costs: an unpartitioned scan pays one map touch per row plus the
//! hash-table growth term `G·log₂G`; a partitioned scan pays roughly twice
//! per row (route + absorb into one of N colder maps) but grows N smaller
//! tables, `G·log₂(G/N)`.
//!
//! Merge costs: centralised `(p−1)·G`, tree `λ·log₂(p)·G` with λ covering
//! cache effects, radix `(p−1)·G/p` spread over independent partitions.
//!
//! The lock-free table is gated rather than costed: it only pays off once
//! the aggregate per-thread map footprint `p·G·40B` overflows the last
//! level cache, and it needs enough repetition per key (`4·G ≤ 2·S_total`)
//! for claim contention to amortise. When the gate passes, it wins.

use groupby_core::StrategyKind;

/// Cache-effect multiplier for the tree merge.
pub const TREE_LAMBDA: f64 = 1.1;

/// Gate: estimated group count below which the lock-free table is never
/// considered.
pub const LOCKFREE_MIN_GROUPS: f64 = 500_000.0;

/// Gate: last-level cache size the per-thread maps must overflow.
pub const L3_SIZE_BYTES: f64 = 256.0 * 1024.0 * 1024.0;

/// Bytes per lock-free slot (five atomic i64 fields).
pub const SLOT_BYTES: f64 = 40.0;

#[inline]
fn log2_clamped(x: f64) -> f64 {
    x.max(2.0).log2()
}

/// Serial centralised merge: worker 0 folds p−1 maps of ~G entries.
pub fn central_merge_cost(g: f64, p: usize) -> f64 {
    (p.saturating_sub(1)) as f64 * g
}

/// Tree merge: log₂(p) rounds over ~G entries, λ for cache effects.
pub fn tree_merge_cost(g: f64, p: usize) -> f64 {
    TREE_LAMBDA * (p.max(1) as f64).log2() * g
}

/// Radix merge: (p−1)·G of total work parallelised over N partitions.
pub fn radix_merge_cost(g: f64, p: usize) -> f64 {
    central_merge_cost(g, p) / p.max(1) as f64
}

/// Unpartitioned scan over `rows_to_scan` rows building one G-entry map.
pub fn unpartitioned_scan_cost(g: f64, rows_to_scan: f64) -> f64 {
    rows_to_scan + g * log2_clamped(g)
}

/// Partitioned scan over `rows_to_scan` rows building N maps of ~G/N.
pub fn partitioned_scan_cost(g: f64, rows_to_scan: f64, num_partitions: usize) -> f64 {
    2.0 * rows_to_scan + g * log2_clamped(g / num_partitions.max(1) as f64)
}

/// Lock-free eligibility gate.
pub fn lockfree_eligible(g: f64, p: usize, rows_total: usize) -> bool {
    g >= LOCKFREE_MIN_GROUPS
        && p as f64 * g * SLOT_BYTES >= L3_SIZE_BYTES
        && 4.0 * g <= 2.0 * rows_total as f64
}

/// Full per-strategy cost breakdown for one decision point.
#[derive(Debug, Clone, Copy)]
pub struct CostBreakdown {
    /// scan + merge for the centralised engine
    pub central: f64,
    /// scan + merge for the tree engine
    pub tree: f64,
    /// scan + merge for the radix engine
    pub radix: f64,
    /// whether the lock-free gate passed
    pub lockfree_eligible: bool,
}

/// Pick the cheapest of the three two-phase strategies, ignoring the
/// lock-free gate. Used directly by the windowed selector, which applies
/// its own rows-seen gate.
pub fn cheapest_two_phase(
    g_hat: f64,
    p: usize,
    num_partitions: usize,
    rows_to_scan: usize,
) -> (StrategyKind, CostBreakdown) {
    let s = rows_to_scan as f64;
    let breakdown = CostBreakdown {
        central: unpartitioned_scan_cost(g_hat, s) + central_merge_cost(g_hat, p),
        tree: unpartitioned_scan_cost(g_hat, s) + tree_merge_cost(g_hat, p),
        radix: partitioned_scan_cost(g_hat, s, num_partitions) + radix_merge_cost(g_hat, p),
        lockfree_eligible: false,
    };

    let mut kind = StrategyKind::Central;
    let mut best = breakdown.central;
    if breakdown.tree < best {
        kind = StrategyKind::Tree;
        best = breakdown.tree;
    }
    if breakdown.radix < best {
        kind = StrategyKind::Radix;
    }
    (kind, breakdown)
}

/// Pick the cheapest strategy for Ĝ groups, `p` threads, `num_partitions`
/// radix partitions, `rows_to_scan` rows remaining, and `rows_total` rows
/// overall (the lock-free gate looks at the whole input).
pub fn choose(
    g_hat: f64,
    p: usize,
    num_partitions: usize,
    rows_to_scan: usize,
    rows_total: usize,
) -> (StrategyKind, CostBreakdown) {
    let (kind, mut breakdown) = cheapest_two_phase(g_hat, p, num_partitions, rows_to_scan);
    breakdown.lockfree_eligible = lockfree_eligible(g_hat, p, rows_total);
    if breakdown.lockfree_eligible {
        return (StrategyKind::LockFree, breakdown);
    }
    (kind, breakdown)
}
