//! Dynamic work distribution
//!
//! A scan phase hands out row chunks of `batch_size` from a shared atomic
//! cursor. Workers that finish early keep pulling chunks, so a skewed or
//! cache-cold region of the table never pins the whole phase to one thread.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared chunk dispenser over a row range.
#[derive(Debug)]
pub struct ChunkCursor {
    next: AtomicUsize,
    end: usize,
    batch: usize,
}

impl ChunkCursor {
    /// Cursor over `range`, dealing chunks of at most `batch` rows.
    pub fn new(range: Range<usize>, batch: usize) -> Self {
        debug_assert!(batch > 0);
        Self {
            next: AtomicUsize::new(range.start),
            end: range.end,
            batch: batch.max(1),
        }
    }

    /// Claim the next chunk, or `None` when the range is exhausted.
    #[inline]
    pub fn next_chunk(&self) -> Option<Range<usize>> {
        let start = self.next.fetch_add(self.batch, Ordering::Relaxed);
        if start >= self.end {
            return None;
        }
        Some(start..(start + self.batch).min(self.end))
    }
}
