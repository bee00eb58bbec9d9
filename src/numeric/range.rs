//! Trie range splitting for numeric range queries.
//!
//! [`split_int64_range`] covers `[min, max]` with prefix-coded term ranges,
//! walking from the finest precision upward. Partial blocks at either edge
//! are emitted at the current shift; whatever remains when the next level is
//! unusable becomes one coarse range. The result is a handful of ranges per
//! level, so even a range spanning most of `i64` expands to a few hundred
//! terms at most.

use crate::error::Result;
use crate::numeric::prefix_coded::PrefixCoded;

/// A closed interval of prefix-coded terms at one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRange {
    pub start_term: Vec<u8>,
    pub end_term: Vec<u8>,
}

impl TermRange {
    /// Range over `[min_bound, max_bound]` at `shift`. The end is widened to
    /// the last value of its block so that it encodes to the same coarse
    /// term.
    pub fn new(min_bound: i64, max_bound: i64, shift: u32) -> Result<Self> {
        let max_bound = max_bound | (1i64 << shift).wrapping_sub(1);
        Ok(TermRange {
            start_term: PrefixCoded::new_int64(min_bound, shift)?.into_bytes(),
            end_term: PrefixCoded::new_int64(max_bound, shift)?.into_bytes(),
        })
    }

    /// Every term from `start_term` through `end_term`, in order.
    pub fn enumerate(&self) -> Vec<Vec<u8>> {
        let mut terms = Vec::new();
        let mut next = self.start_term.clone();
        while next <= self.end_term {
            let successor = next_term(&next);
            let wrapped = successor <= next;
            terms.push(next);
            if wrapped {
                break;
            }
            next = successor;
        }
        terms
    }
}

/// Big-endian successor of a byte string with fixed width: the last byte is
/// incremented and an overflow to zero carries into the preceding byte. A
/// string of all `0xFF` wraps to all zeros.
pub fn increment_bytes(input: &[u8]) -> Vec<u8> {
    let mut rv = input.to_vec();
    for byte in rv.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
    rv
}

/// Successor of a prefix-coded term. Byte strings with a payload byte above
/// `0x7f` are never produced by the codec, so the carry skips straight past
/// them instead of visiting each one.
fn next_term(term: &[u8]) -> Vec<u8> {
    let mut next = increment_bytes(term);
    while let Some(pos) = next.iter().skip(1).position(|&b| b > 0x7f).map(|p| p + 1) {
        next[pos..].iter_mut().for_each(|b| *b = 0);
        let carried = increment_bytes(&next[..pos]);
        next[..pos].copy_from_slice(&carried);
    }
    next
}

/// Ordered term ranges produced by a split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermRanges(Vec<TermRange>);

impl TermRanges {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TermRange> {
        self.0.iter()
    }

    /// Concatenated enumeration of every range.
    pub fn enumerate(&self) -> Vec<Vec<u8>> {
        self.0.iter().flat_map(TermRange::enumerate).collect()
    }

    fn push(&mut self, range: TermRange) {
        self.0.push(range);
    }
}

impl IntoIterator for TermRanges {
    type Item = TermRange;
    type IntoIter = std::vec::IntoIter<TermRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Split `[min_bound, max_bound]` (both inclusive) into prefix-coded term
/// ranges using `precision_step` bits per level. An empty interval yields no
/// ranges.
pub fn split_int64_range(
    mut min_bound: i64,
    mut max_bound: i64,
    precision_step: u32,
) -> Result<TermRanges> {
    crate::config::validate_precision_step(precision_step)?;

    let mut ranges = TermRanges::default();
    if min_bound > max_bound {
        return Ok(ranges);
    }

    let mut shift: u32 = 0;
    loop {
        let diff = 1i64.checked_shl(shift + precision_step).unwrap_or(0);
        let mask = (1i64 << precision_step).wrapping_sub(1) << shift;
        let has_lower = min_bound & mask != 0;
        let has_upper = max_bound & mask != mask;

        let next_min_bound = if has_lower {
            min_bound.wrapping_add(diff) & !mask
        } else {
            min_bound & !mask
        };
        let next_max_bound = if has_upper {
            max_bound.wrapping_sub(diff) & !mask
        } else {
            max_bound & !mask
        };

        let lower_wrapped = next_min_bound < min_bound;
        let upper_wrapped = next_max_bound > max_bound;

        if shift + precision_step >= 64
            || next_min_bound > next_max_bound
            || lower_wrapped
            || upper_wrapped
        {
            // coarsest usable level: whatever is left becomes one range
            ranges.push(TermRange::new(min_bound, max_bound, shift)?);
            break;
        }

        if has_lower {
            ranges.push(TermRange::new(min_bound, min_bound | mask, shift)?);
        }
        if has_upper {
            ranges.push(TermRange::new(max_bound & !mask, max_bound, shift)?);
        }

        min_bound = next_min_bound;
        max_bound = next_max_bound;
        shift += precision_step;
    }

    Ok(ranges)
}
