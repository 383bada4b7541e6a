//! Lock-free aggregation table
//!
//! A fixed-capacity linear-probing open-address map supporting concurrent
//! upserts from any number of threads. Each slot holds five atomic i64
//! fields; [`groupby_core::KEY_EMPTY`] marks an unclaimed slot.
//!
//! Concurrency protocol:
//! - A slot is claimed by a single winning `compare_exchange` on its key
//!   (AcqRel / Acquire). Once a key is non-EMPTY it never changes again, so
//!   losers converge on the winner's slot via linear probing.
//! - COUNT and SUM are strictly additive: `fetch_add` with Relaxed ordering
//!   is sufficient, wait-free per update.
//! - MIN and MAX are monotone and idempotent, so they use CAS loops that
//!   only install strictly-more-extreme values. Every writer takes the same
//!   path, the slot claimer included, so transiently stale extrema are
//!   always corrected by the time the writers join.
//!
//! Capacity never changes after construction. The caller must size the
//! table to keep the load factor below 1 (3–4x the expected distinct-key
//! count keeps probe chains short); a full table surfaces as `false` from
//! [`LockFreeAggMap::upsert`], which strategies treat as a fallback signal.

use groupby_core::{hash64, ResultRow, KEY_EMPTY};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::accumulator::Accumulator;

struct Slot {
    key: AtomicI64,
    count: AtomicI64,
    sum: AtomicI64,
    min: AtomicI64,
    max: AtomicI64,
}

impl Slot {
    fn empty() -> Self {
        Self {
            key: AtomicI64::new(KEY_EMPTY),
            count: AtomicI64::new(0),
            sum: AtomicI64::new(0),
            min: AtomicI64::new(i64::MAX),
            max: AtomicI64::new(i64::MIN),
        }
    }

    /// Install `v` into `field` while it is more extreme than the current
    /// value under `keep`. Lock-free: a stalled writer can only be passed
    /// by writers installing values that make this one redundant.
    #[inline]
    fn cas_extremum(field: &AtomicI64, v: i64, keep: impl Fn(i64, i64) -> bool) {
        let mut cur = field.load(Ordering::Relaxed);
        while keep(v, cur) {
            match field.compare_exchange_weak(cur, v, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(observed) => cur = observed,
            }
        }
    }

    #[inline]
    fn apply(&self, count: i64, sum: i64, min: i64, max: i64) {
        self.count.fetch_add(count, Ordering::Relaxed);
        self.sum.fetch_add(sum, Ordering::Relaxed);
        Self::cas_extremum(&self.min, min, |v, cur| v < cur);
        Self::cas_extremum(&self.max, max, |v, cur| v > cur);
    }
}

/// Fixed-capacity concurrent aggregation table.
pub struct LockFreeAggMap {
    slots: Box<[Slot]>,
}

impl LockFreeAggMap {
    /// Allocate a table with `capacity` slots, all empty.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Slot::empty()).collect(),
        }
    }

    /// Slot count chosen at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Find or claim the slot for `k`. `None` means every probe saw a
    /// distinct foreign key: the table is full for this key.
    #[inline]
    fn slot_for(&self, k: i64) -> Option<&Slot> {
        let capacity = self.slots.len();
        if capacity == 0 {
            return None;
        }
        let start = (hash64(k) % capacity as u64) as usize;
        for probe in 0..capacity {
            let slot = &self.slots[(start + probe) % capacity];
            let expected = slot.key.load(Ordering::Acquire);
            if expected == KEY_EMPTY {
                match slot.key.compare_exchange(
                    KEY_EMPTY,
                    k,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    // Claimed: the slot is ours for key k.
                    Ok(_) => return Some(slot),
                    // Lost the race; the winner's key decides convergence.
                    Err(winner) if winner == k => return Some(slot),
                    Err(_) => continue,
                }
            }
            if expected == k {
                return Some(slot);
            }
        }
        None
    }

    /// Atomically fold one row value into the entry for `k`.
    ///
    /// Returns `false` when the table has no slot left for `k`; the caller
    /// must discard the attempt and fall back (the partial table state is
    /// not recoverable into a correct result).
    #[inline]
    pub fn upsert(&self, k: i64, v: i64) -> bool {
        match self.slot_for(k) {
            Some(slot) => {
                slot.apply(1, v, v, v);
                true
            }
            None => false,
        }
    }

    /// Fold a whole accumulator into the entry for `k`. Used when merging
    /// thread-local or sampling maps into the table.
    #[inline]
    pub fn accumulate(&self, k: i64, acc: &Accumulator) -> bool {
        self.accumulate_fields(k, acc.count, acc.sum, acc.min, acc.max)
    }

    /// Field-wise variant of [`LockFreeAggMap::accumulate`]; used when
    /// migrating entries out of another lock-free table.
    #[inline]
    pub fn accumulate_fields(&self, k: i64, count: i64, sum: i64, min: i64, max: i64) -> bool {
        match self.slot_for(k) {
            Some(slot) => {
                slot.apply(count, sum, min, max);
                true
            }
            None => false,
        }
    }

    /// Snapshot every claimed slot into result rows.
    ///
    /// Single-threaded by contract: callers invoke this only after all
    /// writers have joined, so one Relaxed load per field is a stable read.
    pub fn snapshot(&self) -> Vec<ResultRow> {
        let mut out = Vec::new();
        self.for_each_entry(|row| out.push(row));
        out
    }

    /// Visit every claimed slot. Same post-join contract as `snapshot`.
    pub fn for_each_entry(&self, mut f: impl FnMut(ResultRow)) {
        for slot in self.slots.iter() {
            let key = slot.key.load(Ordering::Relaxed);
            if key == KEY_EMPTY {
                continue;
            }
            f(ResultRow::new(
                key,
                slot.count.load(Ordering::Relaxed),
                slot.sum.load(Ordering::Relaxed),
                slot.min.load(Ordering::Relaxed),
                slot.max.load(Ordering::Relaxed),
            ));
        }
    }

    /// Number of claimed slots. Post-join contract as `snapshot`.
    pub fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.key.load(Ordering::Relaxed) != KEY_EMPTY)
            .count()
    }
}

impl std::fmt::Debug for LockFreeAggMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockFreeAggMap")
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_upsert_single_thread() {
        let map = LockFreeAggMap::with_capacity(16);
        assert!(map.upsert(1, 10));
        assert!(map.upsert(1, 7));
        assert!(map.upsert(2, 5));

        let mut rows = map.snapshot();
        rows.sort();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ResultRow::new(1, 2, 17, 7, 10));
        assert_eq!(rows[1], ResultRow::new(2, 1, 5, 5, 5));
    }

    #[test]
    fn test_full_table_returns_false() {
        let map = LockFreeAggMap::with_capacity(2);
        assert!(map.upsert(1, 0));
        assert!(map.upsert(2, 0));
        // Both slots claimed by foreign keys: no room for a third key.
        assert!(!map.upsert(3, 0));
        // Existing keys still succeed.
        assert!(map.upsert(1, 5));
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let map = LockFreeAggMap::with_capacity(0);
        assert!(!map.upsert(1, 1));
        assert!(map.snapshot().is_empty());
    }

    #[test]
    fn test_accumulate_matches_repeated_upserts() {
        let by_rows = LockFreeAggMap::with_capacity(8);
        by_rows.upsert(4, 3);
        by_rows.upsert(4, -1);
        by_rows.upsert(4, 9);

        let mut acc = Accumulator::IDENTITY;
        for v in [3, -1, 9] {
            acc.absorb_value(v);
        }
        let by_acc = LockFreeAggMap::with_capacity(8);
        by_acc.accumulate(4, &acc);

        assert_eq!(by_rows.snapshot(), by_acc.snapshot());
    }

    #[test]
    fn test_concurrent_upserts_single_hot_key() {
        let map = Arc::new(LockFreeAggMap::with_capacity(8));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let map = Arc::clone(&map);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..1000i64 {
                        assert!(map.upsert(42, t * 1000 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let rows = map.snapshot();
        assert_eq!(rows.len(), 1);
        let row = rows[0];
        assert_eq!(row.key, 42);
        assert_eq!(row.count, 8000);
        let expected_sum: i64 = (0..8).flat_map(|t| (0..1000).map(move |i| t * 1000 + i)).sum();
        assert_eq!(row.sum, expected_sum);
        assert_eq!(row.min, 0);
        assert_eq!(row.max, 7999);
    }

    #[test]
    fn test_concurrent_upserts_match_sequential_reference() {
        use crate::local_map::LocalAggMap;
        use groupby_core::table::RowTable;
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let rows: Vec<(i64, i64)> = (0..20_000)
            .map(|_| (rng.gen_range(0..500), rng.gen_range(-100..100)))
            .collect();
        let table = Arc::new(RowTable::from_rows(&rows));

        let map = Arc::new(LockFreeAggMap::with_capacity(2048));
        let threads = 8;
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let map = Arc::clone(&map);
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    let mut r = t;
                    while r < table.n_rows() {
                        assert!(map.upsert(table.key(r), table.value(r)));
                        r += threads;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut reference = LocalAggMap::new();
        for r in 0..table.n_rows() {
            reference.absorb_row(&table, r);
        }

        let mut got = map.snapshot();
        got.sort();
        let mut want = Vec::new();
        reference.drain_into(&mut want);
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn test_claimed_slot_key_is_stable() {
        // Hammer two keys that collide into a tiny table from many threads;
        // afterwards each key must own exactly one slot.
        let map = Arc::new(LockFreeAggMap::with_capacity(4));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let map = Arc::clone(&map);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..10_000 {
                        assert!(map.upsert(t % 2, 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut rows = map.snapshot();
        rows.sort();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, 0);
        assert_eq!(rows[1].key, 1);
        assert_eq!(rows[0].count + rows[1].count, 40_000);
    }
}
