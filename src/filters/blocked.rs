//! Blocked Bloom filter over 64-bit key digests.

use crate::core::block::{Block, BLOCK_BITS};
use crate::core::params::{self, Config};
use crate::error::Result;

/// Blocked Bloom filter: a probabilistic set of 64-bit key digests.
///
/// # Architecture
///
/// - The bit array is a sequence of 512-bit blocks, each aligned to its own
///   cache line.
/// - The low half of the digest selects the block; the high half seeds an
///   enhanced double-hashing sequence that picks `k` bit positions inside
///   that one block.
/// - Every bit touched for a key therefore lives in a single block, so an
///   [`add`](Self::add) or [`has`](Self::has) costs at most one cache miss
///   regardless of `k` or the total filter size. The price is a slightly
///   higher false positive rate than an unblocked filter of equal size,
///   which [`optimize`](crate::core::params::optimize) compensates for when
///   sizing the filter.
///
/// # Hashing
///
/// The filter consumes an already-computed digest per key and assumes it is
/// uniformly distributed over `u64`; producing it is the caller's job (a
/// fast non-cryptographic hash such as XXH3 over the key's bytes works
/// well — see the `xxhash` feature). A poor hash degrades the false
/// positive guarantee silently.
///
/// # Concurrency
///
/// `add` takes `&mut self` and is not safe for concurrent mutation; two
/// racing adds could lose a bit set and break the no-false-negative
/// guarantee. Callers that need parallel writers should shard by digest into
/// independent filters, one per worker. Concurrent [`has`](Self::has) calls without a
/// concurrent `add` are safe, and the optimizer functions are pure and
/// reentrant.
///
/// # Examples
///
/// ```
/// use blockbloom::{BlockedBloomFilter, Config};
///
/// let mut filter = BlockedBloomFilter::new_optimized(&Config {
///     capacity: 10_000,
///     fp_rate: 0.01,
///     max_bits: 0,
/// })?;
///
/// filter.add(0x9a1b_3c5d_7e9f_0123);
/// assert!(filter.has(0x9a1b_3c5d_7e9f_0123));
/// assert!(!filter.has(0x1111_2222_3333_4444));
/// # Ok::<(), blockbloom::BlockBloomError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockedBloomFilter {
    /// One 512-bit block per cache line.
    blocks: Vec<Block>,
    /// Bit positions set/tested per key.
    k: usize,
}

impl BlockedBloomFilter {
    /// Create a filter of `nbits` bits that uses `nhashes` bit positions per
    /// key.
    ///
    /// `nbits` is rounded up to the next multiple of
    /// [`BLOCK_BITS`](crate::BLOCK_BITS). Degenerate arguments are fixed up
    /// rather than rejected: `nbits < 1` becomes one block and `nhashes < 1`
    /// becomes 1, so construction is total.
    ///
    /// Most callers should size the filter through
    /// [`new_optimized`](Self::new_optimized) instead of picking raw
    /// geometry.
    #[must_use]
    pub fn new(nbits: u64, nhashes: usize) -> Self {
        let (nbits, nhashes) = fix_bits_and_hashes(nbits, nhashes);
        BlockedBloomFilter {
            blocks: vec![Block::default(); (nbits / BLOCK_BITS as u64) as usize],
            k: nhashes,
        }
    }

    /// Create a filter with geometry chosen by
    /// [`optimize`](crate::core::params::optimize) for `cfg`.
    ///
    /// # Errors
    ///
    /// [`BlockBloomError::FalsePositiveRateOutOfBounds`](crate::BlockBloomError::FalsePositiveRateOutOfBounds)
    /// if `cfg.fp_rate` is not in `(0, 1]`.
    pub fn new_optimized(cfg: &Config) -> Result<Self> {
        let (nbits, nhashes) = params::optimize(cfg)?;
        Ok(Self::new(nbits, nhashes))
    }

    /// Add the key with the given digest to the filter.
    ///
    /// Idempotent: adding a digest twice leaves the filter bit-for-bit
    /// identical to adding it once.
    #[inline]
    pub fn add(&mut self, digest: u64) {
        let (mut h1, mut h2) = split_digest(digest);
        let idx = block_index(h2, self.blocks.len());
        let block = &mut self.blocks[idx];
        for i in 0..self.k as u32 {
            block.set(h1);
            (h1, h2) = double_hash(h1, h2, i);
        }
    }

    /// Report whether a key with the given digest might have been added.
    ///
    /// Returns `true` for every digest previously passed to
    /// [`add`](Self::add) on this filter (no false negatives, absent an
    /// intervening [`clear`](Self::clear)). For a digest never added it
    /// returns `true` with probability approximated by
    /// [`fp_rate`](Self::fp_rate); false positives are the fundamental
    /// trade-off of the structure. Short-circuits on the first unset bit.
    #[inline]
    #[must_use]
    pub fn has(&self, digest: u64) -> bool {
        let (mut h1, mut h2) = split_digest(digest);
        let idx = block_index(h2, self.blocks.len());
        let block = &self.blocks[idx];
        for i in 0..self.k as u32 {
            if !block.get(h1) {
                return false;
            }
            (h1, h2) = double_hash(h1, h2, i);
        }
        true
    }

    /// Total size of the bit array, as constructed (a positive multiple of
    /// [`BLOCK_BITS`](crate::BLOCK_BITS)).
    #[must_use]
    pub fn num_bits(&self) -> u64 {
        self.blocks.len() as u64 * BLOCK_BITS as u64
    }

    /// Number of bit positions set/tested per key.
    #[must_use]
    pub fn num_hashes(&self) -> usize {
        self.k
    }

    /// Estimate this filter's false positive rate after `nkeys` distinct
    /// keys have been added.
    ///
    /// Delegates to the standalone
    /// [`params::fp_rate`](crate::core::params::fp_rate) with this filter's
    /// geometry; useful for monitoring an already-filled filter.
    #[must_use]
    pub fn fp_rate(&self, nkeys: u64) -> f64 {
        params::fp_rate(nkeys, self.num_bits(), self.k)
    }

    /// Estimate the number of distinct keys added, from the fill ratio.
    ///
    /// Uses the standard inversion `-(m/k) × ln(1 - ones/m)`. Returns
    /// positive infinity when every bit is set.
    #[must_use]
    pub fn cardinality(&self) -> f64 {
        let ones: u64 = self.blocks.iter().map(|b| u64::from(b.count_ones())).sum();
        if ones == 0 {
            return 0.0;
        }
        let m = self.num_bits() as f64;
        let fill = ones as f64 / m;
        if fill >= 1.0 {
            return f64::INFINITY;
        }
        -(m / self.k as f64) * (1.0 - fill).ln()
    }

    /// True iff no key has been added since construction or the last
    /// [`clear`](Self::clear).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_zero)
    }

    /// Reset the filter to its empty state, keeping its geometry.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
    }
}

/// Round `nbits` up to a whole number of blocks and force both parameters to
/// their minimum valid values.
fn fix_bits_and_hashes(nbits: u64, nhashes: usize) -> (u64, usize) {
    let block_bits = BLOCK_BITS as u64;
    let mut nbits = nbits.max(1);
    if nbits % block_bits != 0 {
        nbits += block_bits - nbits % block_bits;
    }
    (nbits, nhashes.max(1))
}

/// Fold the digest into two independent 32-bit values: a block selector and
/// a bit-position seed.
#[inline]
fn split_digest(digest: u64) -> (u32, u32) {
    ((digest >> 32) as u32, digest as u32)
}

/// Map a 32-bit hash onto `[0, num_blocks)` by multiply-shift range
/// reduction, which avoids the modulo and has no bias worth worrying about
/// at these block counts.
#[inline]
fn block_index(h: u32, num_blocks: usize) -> usize {
    ((u64::from(h) * num_blocks as u64) >> 32) as usize
}

/// One step of enhanced double hashing (Dillinger & Manolios): the `h1`
/// stream yields the bit positions, `h2` advances so the probe sequence is
/// not a fixed stride.
#[inline]
fn double_hash(h1: u32, h2: u32, i: u32) -> (u32, u32) {
    (h1.wrapping_add(h2), h2.wrapping_add(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_add_and_has() {
        let mut filter = BlockedBloomFilter::new(1 << 16, 7);
        assert!(filter.is_empty());

        filter.add(42);
        filter.add(0xdead_beef_cafe_f00d);

        assert!(filter.has(42));
        assert!(filter.has(0xdead_beef_cafe_f00d));
        assert!(!filter.has(0x0123_4567_89ab_cdef));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_new_rounds_up_to_block_multiple() {
        let filter = BlockedBloomFilter::new(1, 1);
        assert_eq!(filter.num_bits(), BLOCK_BITS as u64);

        let filter = BlockedBloomFilter::new(513, 4);
        assert_eq!(filter.num_bits(), 2 * BLOCK_BITS as u64);

        let filter = BlockedBloomFilter::new(1024, 4);
        assert_eq!(filter.num_bits(), 1024);
    }

    #[test]
    fn test_new_fixes_up_degenerate_parameters() {
        let filter = BlockedBloomFilter::new(0, 0);
        assert_eq!(filter.num_bits(), BLOCK_BITS as u64);
        assert_eq!(filter.num_hashes(), 1);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut once = BlockedBloomFilter::new(1 << 12, 5);
        let mut twice = once.clone();

        once.add(0x1122_3344_5566_7788);
        twice.add(0x1122_3344_5566_7788);
        twice.add(0x1122_3344_5566_7788);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_identical_sequences_give_identical_state() {
        let mut a = BlockedBloomFilter::new(1 << 14, 6);
        let mut b = BlockedBloomFilter::new(1 << 14, 6);

        for digest in (0..1000u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)) {
            a.add(digest);
            b.add(digest);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut filter = BlockedBloomFilter::new(1 << 12, 4);
        filter.add(1);
        filter.add(2);
        assert!(!filter.is_empty());

        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.has(1));
        assert!(!filter.has(2));
        assert_eq!(filter.cardinality(), 0.0);
    }

    #[test]
    fn test_cardinality_tracks_distinct_keys() {
        let mut filter = BlockedBloomFilter::new_optimized(&Config {
            capacity: 10_000,
            fp_rate: 0.01,
            max_bits: 0,
        })
        .unwrap();

        for digest in (0..5000u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)) {
            filter.add(digest);
        }
        // Duplicates must not move the estimate.
        for digest in (0..5000u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)) {
            filter.add(digest);
        }

        let estimate = filter.cardinality();
        assert!(
            (4500.0..=5500.0).contains(&estimate),
            "cardinality estimate {} far from 5000",
            estimate
        );
    }

    #[test]
    fn test_fp_rate_delegates_to_estimator() {
        let filter = BlockedBloomFilter::new(1 << 20, 8);
        assert_eq!(filter.fp_rate(0), 0.0);
        assert_eq!(
            filter.fp_rate(10_000),
            params::fp_rate(10_000, filter.num_bits(), filter.num_hashes())
        );
    }

    #[test]
    fn test_single_hash_filter_works() {
        let mut filter = BlockedBloomFilter::new(BLOCK_BITS as u64, 1);
        filter.add(99);
        assert!(filter.has(99));
    }
}
