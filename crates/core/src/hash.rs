//! Group-key hashing
//!
//! All probe and partition decisions use the same 64-bit xxh3 hash of the
//! key's little-endian bytes. Keeping one hash function across the
//! thread-local maps, the radix router, and the lock-free table means a key
//! lands in the same partition no matter which strategy touched it first;
//! the adaptive engines rely on this when they migrate state mid-run.

use xxhash_rust::xxh3::xxh3_64;

/// 64-bit hash of a group key.
#[inline]
pub fn hash64(key: i64) -> u64 {
    xxh3_64(&key.to_le_bytes())
}

/// Radix partition index for a key given `num_partitions` partitions.
#[inline]
pub fn partition_index(key: i64, num_partitions: usize) -> usize {
    debug_assert!(num_partitions > 0);
    (hash64(key) % num_partitions as u64) as usize
}
