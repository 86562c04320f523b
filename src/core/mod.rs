//! Core building blocks: block storage and parameter mathematics.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── block.rs   - 512-bit cache-line blocks
//! ├── params.rs  - Geometry optimization and FPR estimation
//! └── mod.rs     - This file (public API)
//! ```
//!
//! The two halves are independent apart from the shared [`BLOCK_BITS`]
//! constant: `params` never touches filter state, and `block` knows nothing
//! about probabilities. Everything in `params` is a pure function, safe for
//! unrestricted concurrent use.

pub mod params;

pub(crate) mod block;

pub use block::BLOCK_BITS;
pub use params::{fp_rate, optimize, Config};
