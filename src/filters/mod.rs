//! Filter implementations.
//!
//! One filter lives here: [`BlockedBloomFilter`], a cache-line-blocked Bloom
//! filter over 64-bit key digests. Variants that change the contract rather
//! than the layout (counting, deletion, scalable growth) are out of scope
//! for this crate; callers that need concurrent writers shard by digest into
//! independent filters.

pub mod blocked;

pub use blocked::BlockedBloomFilter;
