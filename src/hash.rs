//! Digest helpers for callers without their own hash function.
//!
//! The filter consumes 64-bit digests, not keys; any fast non-cryptographic
//! hash with good distribution will do. This module wraps XXH3, which is an
//! excellent default for both small and large keys.
//!
//! Requires the `xxhash` feature.
//!
//! # Examples
//!
//! ```
//! use blockbloom::{hash, BlockedBloomFilter};
//!
//! let mut filter = BlockedBloomFilter::new(1 << 16, 7);
//! filter.add(hash::digest(b"alice"));
//! assert!(filter.has(hash::digest(b"alice")));
//! ```

use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// XXH3 digest of `key`, suitable for [`BlockedBloomFilter::add`](crate::BlockedBloomFilter::add).
#[inline]
#[must_use]
pub fn digest(key: &[u8]) -> u64 {
    xxh3_64(key)
}

/// Seeded XXH3 digest of `key`.
///
/// Distinct seeds give independent digest streams, which is what you want
/// when sharding keys across several filters.
#[inline]
#[must_use]
pub fn digest_with_seed(key: &[u8], seed: u64) -> u64 {
    xxh3_64_with_seed(key, seed)
}
