//! Shared phase building blocks
//!
//! Every two-phase engine is a composition of one scan shape and one merge
//! topology. The scans hand rows out through a [`ChunkCursor`]; the merges
//! take ownership of the per-thread maps, so no map ever has two writers.
//!
//! Ownership handoff between phases uses `parking_lot::Mutex<_>` slots.
//! The locks are uncontended by construction: barriers guarantee exactly
//! one owner per slot per phase. They exist to make the handoff safe
//! without `unsafe`.

use groupby_agg::{LocalAggMap, LockFreeAggMap};
use groupby_core::table::RowTable;
use groupby_core::{partition_index, Error, Result, ResultRow};
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::scheduler::ChunkCursor;

/// Phase 1, unpartitioned: each worker folds its chunks into a private map.
pub fn scan_local(
    table: &RowTable,
    range: Range<usize>,
    threads: usize,
    batch: usize,
) -> Vec<LocalAggMap> {
    let cursor = ChunkCursor::new(range, batch);
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let mut map = LocalAggMap::new();
                    while let Some(chunk) = cursor.next_chunk() {
                        for r in chunk {
                            map.absorb_row(table, r);
                        }
                    }
                    map
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("scan worker panicked"))
            .collect()
    })
}

/// Phase 1, partitioned: each worker routes rows into its own stack of
/// `num_partitions` sub-maps by key hash. Returns `[tid][part]`.
pub fn scan_radix(
    table: &RowTable,
    range: Range<usize>,
    threads: usize,
    batch: usize,
    num_partitions: usize,
) -> Vec<Vec<LocalAggMap>> {
    let cursor = ChunkCursor::new(range, batch);
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let mut parts: Vec<LocalAggMap> =
                        (0..num_partitions).map(|_| LocalAggMap::new()).collect();
                    while let Some(chunk) = cursor.next_chunk() {
                        for r in chunk {
                            let part = partition_index(table.key(r), num_partitions);
                            parts[part].absorb_row(table, r);
                        }
                    }
                    parts
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("scan worker panicked"))
            .collect()
    })
}

/// Phase 1, shared table: all workers upsert into one lock-free map.
///
/// Fails with [`Error::TableFull`] when any worker exhausts the probe
/// sequence; the caller discards the table and falls back.
pub fn scan_lockfree(
    table: &RowTable,
    range: Range<usize>,
    threads: usize,
    batch: usize,
    map: &LockFreeAggMap,
) -> Result<()> {
    let cursor = ChunkCursor::new(range, batch);
    let ok = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    while let Some(chunk) = cursor.next_chunk() {
                        for r in chunk {
                            if !map.upsert(table.key(r), table.value(r)) {
                                return false;
                            }
                        }
                    }
                    true
                })
            })
            .collect();
        handles
            .into_iter()
            .all(|h| h.join().expect("scan worker panicked"))
    });
    if ok {
        Ok(())
    } else {
        Err(Error::TableFull {
            capacity: map.capacity(),
        })
    }
}

/// Phase 2, centralised: fold maps 1..p into map 0, serially.
pub fn merge_central(maps: Vec<LocalAggMap>) -> LocalAggMap {
    let mut iter = maps.into_iter();
    let mut target = iter.next().unwrap_or_default();
    for other in iter {
        target.merge_from(&other);
    }
    target
}

/// Phase 2, tree: ceil(log2(p)) rounds; in round r, every map whose index
/// is a multiple of 2^r absorbs the map 2^(r-1) above it. Rounds are
/// barrier-separated (scope join); merges within a round run in parallel.
pub fn merge_tree(maps: Vec<LocalAggMap>) -> LocalAggMap {
    let p = maps.len();
    let mut slots: Vec<Option<LocalAggMap>> = maps.into_iter().map(Some).collect();
    if p == 0 {
        return LocalAggMap::new();
    }

    let mut step = 2;
    while step / 2 < p {
        let mut work = Vec::new();
        let mut tid = 0;
        while tid < p {
            let other = tid + step / 2;
            if other < p {
                // Both ends exist for this round; take ownership up front.
                let dst = slots[tid].take().expect("merge slot already taken");
                let src = slots[other].take().expect("merge slot already taken");
                work.push((tid, dst, src));
            }
            tid += step;
        }

        let merged = thread::scope(|s| {
            let handles: Vec<_> = work
                .into_iter()
                .map(|(tid, mut dst, src)| {
                    s.spawn(move || {
                        dst.merge_from(&src);
                        (tid, dst)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("merge worker panicked"))
                .collect::<Vec<_>>()
        });
        for (tid, map) in merged {
            slots[tid] = Some(map);
        }
        step *= 2;
    }

    slots[0].take().expect("root merge slot empty")
}

/// Phase 2, radix: partitions are independent, so workers pull partition
/// indices from a shared cursor and each merges one partition's stack of
/// per-thread maps. Input is `[tid][part]`; output is one merged map per
/// partition.
pub fn merge_radix(
    per_thread: Vec<Vec<LocalAggMap>>,
    threads: usize,
    num_partitions: usize,
) -> Vec<LocalAggMap> {
    // Transpose into per-partition stacks.
    let mut stacks: Vec<Vec<LocalAggMap>> = (0..num_partitions)
        .map(|_| Vec::with_capacity(per_thread.len()))
        .collect();
    for thread_maps in per_thread {
        debug_assert_eq!(thread_maps.len(), num_partitions);
        for (part, map) in thread_maps.into_iter().enumerate() {
            stacks[part].push(map);
        }
    }

    let slots: Vec<Mutex<Vec<LocalAggMap>>> = stacks.into_iter().map(Mutex::new).collect();
    let merged: Vec<Mutex<Option<LocalAggMap>>> =
        (0..num_partitions).map(|_| Mutex::new(None)).collect();
    let next = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..threads.max(1) {
            s.spawn(|| loop {
                let part = next.fetch_add(1, Ordering::Relaxed);
                if part >= num_partitions {
                    break;
                }
                let stack = std::mem::take(&mut *slots[part].lock());
                let mut iter = stack.into_iter();
                let mut target = iter.next().unwrap_or_default();
                for other in iter {
                    target.merge_from(&other);
                }
                *merged[part].lock() = Some(target);
            });
        }
    });

    merged
        .into_iter()
        .map(|m| m.into_inner().unwrap_or_default())
        .collect()
}

/// Concatenate per-partition maps into the flat output.
pub fn rows_from_partitions(mut partitions: Vec<LocalAggMap>) -> Vec<ResultRow> {
    let total: usize = partitions.iter().map(|m| m.len()).sum();
    let mut rows = Vec::with_capacity(total);
    for map in partitions.iter_mut() {
        map.drain_into(&mut rows);
    }
    rows
}
