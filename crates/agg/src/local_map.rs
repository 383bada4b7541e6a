//! Single-writer aggregation map
//!
//! One of these per worker per scan phase. Exactly one thread writes to a
//! given map at a time; merges in later phases take ownership instead of
//! sharing, so there is nothing to synchronise here.
//!
//! Keys are hashed with xxh3, the same function the radix router and the
//! lock-free table use.

use groupby_core::table::RowTable;
use groupby_core::ResultRow;
use std::collections::hash_map;
use std::collections::HashMap;
use xxhash_rust::xxh3::Xxh3Builder;

use crate::accumulator::Accumulator;

/// Hash map from group key to accumulator, owned by a single writer.
#[derive(Debug, Clone, Default)]
pub struct LocalAggMap {
    entries: HashMap<i64, Accumulator, Xxh3Builder>,
}

impl LocalAggMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty map sized for roughly `capacity` distinct keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, Xxh3Builder::new()),
        }
    }

    /// Number of distinct keys seen.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key has been absorbed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absorb row `r` of `table`: install the identity if the key is new,
    /// then fold in the row's value.
    #[inline]
    pub fn absorb_row(&mut self, table: &RowTable, r: usize) {
        self.entries
            .entry(table.key(r))
            .or_insert(Accumulator::IDENTITY)
            .absorb_value(table.value(r));
    }

    /// Merge `acc` into the entry for `k` (identity if absent).
    #[inline]
    pub fn absorb_accumulator(&mut self, k: i64, acc: &Accumulator) {
        self.entries
            .entry(k)
            .or_insert(Accumulator::IDENTITY)
            .merge(acc);
    }

    /// Fold every entry of `other` into this map.
    pub fn merge_from(&mut self, other: &LocalAggMap) {
        for (&k, acc) in other.iter() {
            self.absorb_accumulator(k, acc);
        }
    }

    /// Look up the accumulator for `k`.
    pub fn get(&self, k: i64) -> Option<&Accumulator> {
        self.entries.get(&k)
    }

    /// Iterate entries in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, i64, Accumulator> {
        self.entries.iter()
    }

    /// Drain the map into result rows, leaving it empty.
    pub fn drain_into(&mut self, out: &mut Vec<ResultRow>) {
        out.reserve(self.entries.len());
        for (k, acc) in self.entries.drain() {
            out.push(ResultRow::new(k, acc.count, acc.sum, acc.min, acc.max));
        }
    }
}

impl<'a> IntoIterator for &'a LocalAggMap {
    type Item = (&'a i64, &'a Accumulator);
    type IntoIter = hash_map::Iter<'a, i64, Accumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
