//! Filter geometry selection and false positive rate estimation.
//!
//! For a vanilla Bloom filter the optimal bits-per-key ratio for a target
//! false positive rate `p` is `c = -log2(p) / ln 2`, and the optimal hash
//! count is `k = c × ln 2`. A blocked filter pays a locality tax on top of
//! that: confining each key's bits to one 512-bit block raises the false
//! positive rate, because block loads are uneven. Putze, Sanders and Singler
//! ("Cache-, Hash- and Space-Efficient Bloom Filters", 2007) quantify both
//! effects:
//!
//! - [`CORRECT_C`] is their Table I — the bits-per-key ratio a blocked filter
//!   needs to match what a vanilla filter achieves with ratio `c` — extended
//!   down to zero.
//! - [`fp_rate`] is their Equation (3): the number of keys landing in a block
//!   is approximately Poisson-distributed, so the blocked FPR is a Poisson
//!   mixture of per-load single-block FPRs rather than a closed form.
//!
//! The series terms span hundreds of orders of magnitude, so the single-block
//! FPR and the Poisson pmf are evaluated in log space and only exponentiated
//! when the two are combined.
//!
//! # Examples
//!
//! ```
//! use blockbloom::core::params::{fp_rate, optimize};
//! use blockbloom::Config;
//!
//! let (nbits, nhashes) = optimize(&Config {
//!     capacity: 100_000,
//!     fp_rate: 0.01,
//!     max_bits: 0,
//! })?;
//! assert_eq!(nbits % 512, 0);
//!
//! // Estimate the rate once the filter holds 100k keys.
//! let estimate = fp_rate(100_000, nbits, nhashes);
//! assert!(estimate > 0.0 && estimate < 0.02);
//! # Ok::<(), blockbloom::BlockBloomError>(())
//! ```

use crate::core::block::BLOCK_BITS;
use crate::error::{BlockBloomError, Result};
use std::f64::consts::LN_2;

/// Absolute ceiling on filter size: 2³² blocks (256 GiB of bits).
const ABS_MAX_BITS: u64 = (1u64 << 32) * BLOCK_BITS as u64;

/// Relative tail bound for truncating the Poisson mixture.
const TAIL_EPSILON: f64 = 1e-8;

/// Hard cap on mixture terms. The adaptive cutoff is not proven to trigger
/// for degenerate geometries (per-term underflow makes the relative test
/// NaN), so iteration is bounded unconditionally.
const MAX_SERIES_TERMS: u32 = 8192;

/// Bits-per-key correction for the blocked layout.
///
/// Maps `c = nbits/capacity` for a vanilla Bloom filter to the `c'` a blocked
/// filter needs for the same false positive rate. Putze et al.'s Table I,
/// extended down to zero. For `c > 34` the values become huge and are hard to
/// compute; [`optimize`] falls back to tripling `c` instead.
const CORRECT_C: [u8; 35] = [
    1, 1, 2, 4, 5, //
    6, 7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 18, 20, 21, 23, //
    25, 26, 28, 30, 32, 35, 38, 40, 44, 48, 51, 58, 64, 74, 90,
];

/// Parameters for [`optimize`] and
/// [`BlockedBloomFilter::new_optimized`](crate::BlockedBloomFilter::new_optimized).
///
/// This is a construction-time input only; the filter does not retain it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Expected number of distinct keys to be added.
    ///
    /// More keys can always be added, but the false positive rate can be
    /// expected to exceed `fp_rate` once the count passes the capacity.
    /// Zero is treated as one.
    pub capacity: u64,

    /// Desired upper bound on the false positive rate when the filter has
    /// been filled to capacity. Must be in `(0, 1]`.
    pub fp_rate: f64,

    /// Maximum size of the filter in bits. Zero means no limit, up to an
    /// absolute cap of 2³² blocks.
    pub max_bits: u64,
}

/// Compute the filter geometry `(nbits, nhashes)` that achieves the desired
/// false positive rate described by `cfg`.
///
/// `nbits` is always a multiple of [`BLOCK_BITS`]. The estimated geometry is
/// imprecise for false positive rates below ca. 1e-15, where the correction
/// table runs out and the bit count is conservatively tripled instead.
///
/// # Errors
///
/// [`BlockBloomError::FalsePositiveRateOutOfBounds`] if `cfg.fp_rate` is not
/// in `(0, 1]`.
///
/// # Examples
///
/// ```
/// use blockbloom::core::params::optimize;
/// use blockbloom::Config;
///
/// let (nbits, nhashes) = optimize(&Config {
///     capacity: 10_000,
///     fp_rate: 0.01,
///     max_bits: 0,
/// })?;
/// assert_eq!(nbits, 110_080); // 11 bits/key, rounded up to a block multiple
/// assert!(nhashes >= 1);
/// # Ok::<(), blockbloom::BlockBloomError>(())
/// ```
pub fn optimize(cfg: &Config) -> Result<(u64, usize)> {
    let p = cfg.fp_rate;
    if !(p > 0.0 && p <= 1.0) {
        return Err(BlockBloomError::fp_rate_out_of_bounds(p));
    }
    // Assume the client wants to add at least one key; log2(0) = -inf.
    let n = if cfg.capacity == 0 {
        1.0
    } else {
        cfg.capacity as f64
    };

    // Optimal bits per key for a vanilla Bloom filter.
    let mut c = (-p.log2() / LN_2).ceil();
    if (c as usize) < CORRECT_C.len() {
        c = f64::from(CORRECT_C[c as usize]);
    } else {
        // The desired FPR is beyond the correction table. Triple the bits;
        // a documented approximation, not a derived bound.
        c *= 3.0;
    }

    let block_bits = BLOCK_BITS as u64;

    let mut max_bits = ABS_MAX_BITS;
    if cfg.max_bits != 0 && cfg.max_bits < max_bits {
        max_bits = cfg.max_bits;
    }

    // Clamp the ideal size at the cap while still in floating point: for
    // huge capacities `c * n` can exceed the u64 range, where the cast
    // saturates and the round-up below would overflow.
    let mut nbits = (c * n).min(max_bits as f64).ceil() as u64;

    // Round up to a multiple of BLOCK_BITS.
    if nbits % block_bits != 0 {
        nbits += block_bits - nbits % block_bits;
    }
    if nbits > max_bits {
        // The cap is the controlling constraint, so round down here.
        nbits = max_bits - max_bits % block_bits;
    }

    // The corresponding optimal hash count is k = c × ln 2, but the blocked
    // FPR is not smooth enough to trust naive rounding: probe both
    // neighboring integers and keep the one with the lower estimated
    // log-FPR.
    let c = nbits as f64 / n;
    let k = c * LN_2;
    let k_lo = k.floor().max(1.0);
    let k_hi = k.ceil().max(1.0);
    let k = if log_fpr_block(c, k_lo) < log_fpr_block(c, k_hi) {
        k_lo
    } else {
        k_hi
    };

    Ok((nbits, k as usize))
}

/// Estimate the false positive rate of a blocked Bloom filter of `nbits` bits
/// and `nhashes` hash functions after `nkeys` distinct keys have been added.
///
/// Returns 0 when `nkeys == 0`: an empty filter cannot produce a false
/// positive.
#[must_use]
pub fn fp_rate(nkeys: u64, nbits: u64, nhashes: usize) -> f64 {
    if nkeys == 0 {
        return 0.0;
    }
    fp_rate_for_ratio(nbits as f64 / nkeys as f64, nhashes as f64)
}

/// Putze et al.'s Equation (3): Poisson mixture over per-block key loads.
fn fp_rate_for_ratio(c: f64, k: f64) -> f64 {
    if c <= 0.0 {
        // No bits per key at all: every probe is a false positive. The
        // series would see an infinite Poisson mean and sum NaN.
        return 1.0;
    }
    let lambda = BLOCK_BITS as f64 / c;
    let log_lambda = lambda.ln();

    let mut sum = 0.0;
    let mut log_fact = 0.0; // ln(i!), accumulated as the series advances
    for i in 1..=MAX_SERIES_TERMS {
        let fi = f64::from(i);
        log_fact += fi.ln();
        let log_poisson = fi * log_lambda - lambda - log_fact;
        let add = (log_poisson + log_fpr_block(BLOCK_BITS as f64 / fi, k)).exp();
        sum += add;
        if add / sum < TAIL_EPSILON {
            break;
        }
    }

    sum.clamp(0.0, 1.0)
}

/// Log of the FPR of a single block holding keys at `c` bits per key:
/// `ln((1 - e^(-k/c))^k)`.
fn log_fpr_block(c: f64, k: f64) -> f64 {
    k * (-(-k / c).exp()).ln_1p()
}
