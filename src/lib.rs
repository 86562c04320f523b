//! blockbloom: cache-efficient blocked Bloom filters for Rust.
//!
//! A Bloom filter answers "might this key have been added?" in a fraction of
//! the memory an exact set would need. It can produce:
//! - **False positives**: may report a key that was never added
//! - **Zero false negatives**: a `false` answer is always definitive
//!
//! This crate implements the *blocked* variant: the bit array is split into
//! 512-bit blocks, and all bits for one key land in a single block. That
//! bounds every operation to at most one cache miss, at the price of a
//! slightly higher false positive rate — which the built-in optimizer
//! compensates for when sizing the filter (following Putze, Sanders and
//! Singler's analysis).
//!
//! The filter operates on 64-bit digests rather than keys. Hash your keys
//! with any fast, well-distributed hash (XXH3 via the `xxhash` feature, or
//! your own) and feed the digests in.
//!
//! # Quick Start
//!
//! ```
//! use blockbloom::{BlockedBloomFilter, Config};
//!
//! // Size the filter for 100k keys at a 0.1% false positive rate.
//! let mut filter = BlockedBloomFilter::new_optimized(&Config {
//!     capacity: 100_000,
//!     fp_rate: 0.001,
//!     max_bits: 0,
//! })?;
//!
//! let digest = 0x243f_6a88_85a3_08d3; // from your hash function
//! filter.add(digest);
//! assert!(filter.has(digest));
//! # Ok::<(), blockbloom::BlockBloomError>(())
//! ```
//!
//! # Sizing by hand
//!
//! [`core::params::optimize`] is exposed standalone, as is the false
//! positive estimator [`core::params::fp_rate`] for monitoring a filter
//! that is already in service:
//!
//! ```
//! use blockbloom::core::params::{fp_rate, optimize};
//! use blockbloom::Config;
//!
//! let (nbits, nhashes) = optimize(&Config {
//!     capacity: 1_000_000,
//!     fp_rate: 0.01,
//!     max_bits: 1 << 26, // hard memory ceiling: 8 MiB of bits
//! })?;
//! assert!(nbits <= 1 << 26);
//!
//! // How bad does it get if we overfill by 2x?
//! let degraded = fp_rate(2_000_000, nbits, nhashes);
//! assert!(degraded > 0.01);
//! # Ok::<(), blockbloom::BlockBloomError>(())
//! ```
//!
//! # Concurrency
//!
//! A filter is a plain value: `add` requires `&mut self`, concurrent reads
//! are safe, concurrent writes are not. The intended parallel composition is
//! sharding — one independent filter per worker, selected by digest — rather
//! than locking a shared instance.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/blockbloom/0.1.0")]

/// Core building blocks: block storage and parameter mathematics
pub mod core;

/// Error types and result alias
pub mod error;

/// Filter implementations
pub mod filters;

/// XXH3 digest convenience (requires the `xxhash` feature)
#[cfg(feature = "xxhash")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash")))]
pub mod hash;

// Re-export the working set at the crate root.
pub use self::core::params::Config;
pub use self::core::BLOCK_BITS;
pub use error::{BlockBloomError, Result};
pub use filters::BlockedBloomFilter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports() {
        let mut filter = BlockedBloomFilter::new_optimized(&Config {
            capacity: 1000,
            fp_rate: 0.01,
            max_bits: 0,
        })
        .unwrap();
        filter.add(7);
        assert!(filter.has(7));
        assert_eq!(filter.num_bits() % BLOCK_BITS as u64, 0);
    }

    #[test]
    fn test_invalid_config_surfaces_error() {
        let err = BlockedBloomFilter::new_optimized(&Config {
            capacity: 1000,
            fp_rate: 0.0,
            max_bits: 0,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            BlockBloomError::FalsePositiveRateOutOfBounds { .. }
        ));
    }
}
