//! Prefix-coded numeric terms.
//!
//! Layout: one header byte `SHIFT_START_INT64 + shift`, followed by the
//! sign-flipped value shifted right by `shift`, written big-endian 7 bits per
//! byte. Keeping every payload byte below `0x80` keeps terms valid UTF-8, and
//! byte-wise comparison of two terms with the same shift orders them like the
//! values they encode.

use std::fmt;

use crate::error::{HalberdError, Result};

/// Header byte for a shift of zero.
pub const SHIFT_START_INT64: u8 = 0x20;

const SIGN_FLIP: u64 = 0x8000_0000_0000_0000;

/// Number of 7-bit payload bytes for a shift.
fn payload_len(shift: u32) -> usize {
    ((63 - shift) / 7) as usize + 1
}

/// A numeric value encoded at a precision shift.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixCoded(Vec<u8>);

impl PrefixCoded {
    /// Encode `value` with its lowest `shift` bits dropped.
    pub fn new_int64(value: i64, shift: u32) -> Result<Self> {
        if shift > 63 {
            return Err(HalberdError::other(format!(
                "cannot prefix-code with shift {shift}, must be <= 63"
            )));
        }

        let n_chars = payload_len(shift);
        let mut bytes = vec![0u8; n_chars + 1];
        bytes[0] = SHIFT_START_INT64 + shift as u8;

        let mut sortable = ((value as u64) ^ SIGN_FLIP) >> shift;
        for slot in bytes[1..].iter_mut().rev() {
            *slot = (sortable & 0x7f) as u8;
            sortable >>= 7;
        }

        Ok(PrefixCoded(bytes))
    }

    /// Wrap raw term bytes after checking the header and length.
    pub fn from_term(term: &[u8]) -> Result<Self> {
        match valid_prefix_coded_term(term) {
            Some(_) => Ok(PrefixCoded(term.to_vec())),
            None => Err(invalid_term(term)),
        }
    }

    /// The precision shift of this term.
    pub fn shift(&self) -> Result<u32> {
        match self.0.first() {
            Some(&b) if (SHIFT_START_INT64..=SHIFT_START_INT64 + 63).contains(&b) => {
                Ok(u32::from(b - SHIFT_START_INT64))
            }
            _ => Err(invalid_term(&self.0)),
        }
    }

    /// Decode the value. The dropped low bits come back as zeros.
    pub fn int64(&self) -> Result<i64> {
        let shift = self.shift()?;
        let mut sortable: u64 = 0;
        for &b in &self.0[1..] {
            if b > 0x7f {
                return Err(invalid_term(&self.0));
            }
            sortable = (sortable << 7) | u64::from(b);
        }
        Ok(((sortable << shift) ^ SIGN_FLIP) as i64)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for PrefixCoded {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrefixCoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrefixCoded({:02x?})", self.0)
    }
}

/// Return the shift if `term` has the shape of a prefix-coded term.
pub fn valid_prefix_coded_term(term: &[u8]) -> Option<u32> {
    let &first = term.first()?;
    if !(SHIFT_START_INT64..=SHIFT_START_INT64 + 63).contains(&first) {
        return None;
    }
    let shift = u32::from(first - SHIFT_START_INT64);
    if term.len() != payload_len(shift) + 1 {
        return None;
    }
    Some(shift)
}

fn invalid_term(term: &[u8]) -> HalberdError {
    HalberdError::other(format!("invalid prefix coded term {term:02x?}"))
}
