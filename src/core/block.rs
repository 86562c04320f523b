//! Fixed-width bit blocks sized to a hardware cache line.
//!
//! A [`Block`] is the unit of locality in the filter: every bit touched for a
//! single key lives inside one block, so an `add` or `has` costs at most one
//! cache miss regardless of the hash count or total filter size.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ...
//! Word 7: [bit 448]...[bit 511]
//! ```
//!
//! `#[repr(align(64))]` keeps each block on its own cache line even inside a
//! `Vec<Block>`.

/// Number of bits in one block (one 64-byte cache line).
pub const BLOCK_BITS: usize = 512;

/// `u64` words per block.
pub(crate) const BLOCK_WORDS: usize = BLOCK_BITS / 64;

/// A 512-bit block of the filter's bit array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(align(64))]
pub(crate) struct Block([u64; BLOCK_WORDS]);

impl Block {
    /// Set bit `i % BLOCK_BITS`. Idempotent.
    #[inline]
    pub(crate) fn set(&mut self, i: u32) {
        self.0[(i as usize / 64) % BLOCK_WORDS] |= 1u64 << (i % 64);
    }

    /// Test bit `i % BLOCK_BITS`.
    #[inline]
    pub(crate) fn get(&self, i: u32) -> bool {
        self.0[(i as usize / 64) % BLOCK_WORDS] & (1u64 << (i % 64)) != 0
    }

    /// Number of set bits in this block (POPCNT per word).
    #[inline]
    pub(crate) fn count_ones(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }

    /// True iff no bit is set.
    #[inline]
    pub(crate) fn is_zero(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Reset all bits to zero.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.0 = [0; BLOCK_WORDS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut b = Block::default();
        assert!(!b.get(0));
        b.set(0);
        b.set(63);
        b.set(64);
        b.set(511);
        assert!(b.get(0));
        assert!(b.get(63));
        assert!(b.get(64));
        assert!(b.get(511));
        assert!(!b.get(1));
        assert_eq!(b.count_ones(), 4);
    }

    #[test]
    fn test_index_wraps_modulo_block_bits() {
        let mut b = Block::default();
        b.set(512 + 7);
        assert!(b.get(7));
        assert!(b.get(u32::MAX / BLOCK_BITS as u32 * BLOCK_BITS as u32 + 7));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut b = Block::default();
        b.set(100);
        let before = b;
        b.set(100);
        assert_eq!(b, before);
        assert_eq!(b.count_ones(), 1);
    }

    #[test]
    fn test_clear_and_is_zero() {
        let mut b = Block::default();
        assert!(b.is_zero());
        b.set(300);
        assert!(!b.is_zero());
        b.clear();
        assert!(b.is_zero());
    }

    #[test]
    fn test_block_is_cache_line_sized() {
        assert_eq!(std::mem::size_of::<Block>(), 64);
        assert_eq!(std::mem::align_of::<Block>(), 64);
    }
}
