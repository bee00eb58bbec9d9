//! Numeric term encoding.
//!
//! Numeric field values are indexed as prefix-coded terms at several
//! precision shifts so that a range query can be answered with a small set
//! of coarse terms instead of one term per value. This module holds the
//! order-preserving `f64`/`i64` conversion, the prefix-coded term codec and
//! the range decomposition that turns `[min, max]` into term ranges.

pub mod prefix_coded;
pub mod range;

pub use self::prefix_coded::{PrefixCoded, SHIFT_START_INT64, valid_prefix_coded_term};
pub use self::range::{TermRange, TermRanges, increment_bytes, split_int64_range};

use crate::error::Result;

/// Map an `f64` onto an `i64` whose signed ordering matches the float's.
pub fn f64_to_i64(value: f64) -> i64 {
    let bits = value.to_bits() as i64;
    if bits < 0 { bits ^ i64::MAX } else { bits }
}

/// Inverse of [`f64_to_i64`].
pub fn i64_to_f64(value: i64) -> f64 {
    let bits = if value < 0 { value ^ i64::MAX } else { value };
    f64::from_bits(bits as u64)
}

/// All terms a numeric value is indexed under: one prefix-coded term per
/// precision shift `0, step, 2 * step, ...` below 64.
pub fn numeric_terms(value: f64, precision_step: u32) -> Result<Vec<PrefixCoded>> {
    crate::config::validate_precision_step(precision_step)?;
    let sortable = f64_to_i64(value);
    (0..64)
        .step_by(precision_step as usize)
        .map(|shift| PrefixCoded::new_int64(sortable, shift))
        .collect()
}
