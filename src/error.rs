//! Error types for blockbloom operations.
//!
//! The only fallible operation in this crate is parameter optimization: a
//! target false positive rate outside `(0, 1]` is a programming error and is
//! surfaced immediately rather than silently clamped.
//!
//! # Error Propagation
//!
//! ```
//! use blockbloom::{Config, Result};
//! use blockbloom::core::params::optimize;
//!
//! fn geometry_for(capacity: u64, fp_rate: f64) -> Result<(u64, usize)> {
//!     optimize(&Config { capacity, fp_rate, max_bits: 0 })
//! }
//! # assert!(geometry_for(1000, 0.01).is_ok());
//! # assert!(geometry_for(1000, 0.0).is_err());
//! ```

use std::fmt;

/// Result type alias for blockbloom operations.
pub type Result<T> = std::result::Result<T, BlockBloomError>;

/// Errors that can occur when configuring a blocked Bloom filter.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - `#[non_exhaustive]` leaves room for future configuration checks
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BlockBloomError {
    /// False positive rate out of valid bounds `(0, 1]`.
    ///
    /// A rate of 0 would require infinite memory; a rate above 1 is not a
    /// probability. NaN fails the range check and lands here as well.
    FalsePositiveRateOutOfBounds {
        /// The invalid false positive rate that was provided.
        fp_rate: f64,
    },
}

impl fmt::Display for BlockBloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1].",
                    fp_rate
                )
            }
        }
    }
}

impl std::error::Error for BlockBloomError {}

impl BlockBloomError {
    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_fp_rate_out_of_bounds() {
        let err = BlockBloomError::fp_rate_out_of_bounds(1.5);
        let display = format!("{err}");
        assert!(display.contains("1.5"));
        assert!(display.contains("out of bounds"));
        assert!(display.contains("(0, 1]"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(BlockBloomError::fp_rate_out_of_bounds(0.0));
    }

    #[test]
    fn test_error_clone_and_eq() {
        let err1 = BlockBloomError::fp_rate_out_of_bounds(-0.1);
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(BlockBloomError::fp_rate_out_of_bounds(2.0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
