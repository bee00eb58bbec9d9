//! Numeric range searcher.
//!
//! A range over `f64` values is mapped onto sortable `i64`s, split into
//! prefix-coded term ranges and answered by a disjunction over every term
//! those ranges enumerate.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::index::IndexReader;
use crate::numeric::{TermRanges, f64_to_i64, split_int64_range};
use crate::search::searcher::{Searcher, SearcherOptions, new_multi_term_searcher_bytes};

/// A range of numeric values. Absent bounds are open; by default the
/// minimum is inclusive and the maximum exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default = "default_inclusive_min")]
    pub inclusive_min: bool,
    #[serde(default)]
    pub inclusive_max: bool,
    /// Bits per precision level; falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_step: Option<u32>,
}

fn default_inclusive_min() -> bool {
    true
}

impl Default for NumericRange {
    fn default() -> Self {
        NumericRange {
            min: None,
            max: None,
            inclusive_min: true,
            inclusive_max: false,
            precision_step: None,
        }
    }
}

impl NumericRange {
    /// `[min, max)`.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        NumericRange {
            min,
            max,
            ..Default::default()
        }
    }

    pub fn inclusive_min(mut self, inclusive: bool) -> Self {
        self.inclusive_min = inclusive;
        self
    }

    pub fn inclusive_max(mut self, inclusive: bool) -> Self {
        self.inclusive_max = inclusive;
        self
    }

    /// Override the precision step. It must match the step the field was
    /// indexed with.
    pub fn with_precision_step(mut self, step: u32) -> Self {
        self.precision_step = Some(step);
        self
    }

    /// Inclusive sortable bounds of this range.
    pub fn int64_bounds(&self) -> (i64, i64) {
        let mut min = f64_to_i64(self.min.unwrap_or(f64::NEG_INFINITY));
        let mut max = f64_to_i64(self.max.unwrap_or(f64::INFINITY));
        if !self.inclusive_min && min != i64::MAX {
            min += 1;
        }
        if !self.inclusive_max && max != i64::MIN {
            max -= 1;
        }
        (min, max)
    }

    /// Prefix-coded term ranges covering this range.
    pub fn term_ranges(&self, default_step: u32) -> Result<TermRanges> {
        let (min, max) = self.int64_bounds();
        split_int64_range(min, max, self.precision_step.unwrap_or(default_step))
    }
}

/// Searcher over every document whose `field` value lies in `range`.
///
/// Fails with a clause overflow before any term searcher is opened when the
/// range expands to more terms than `config.max_clause_count`.
pub fn new_numeric_range_searcher(
    reader: &dyn IndexReader,
    range: &NumericRange,
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    let ranges = range.term_ranges(config.numeric_precision_step)?;
    let terms = ranges.enumerate();
    debug!(
        "numeric range {:?}..{:?} on field {field} split into {} ranges, {} terms",
        range.min,
        range.max,
        ranges.len(),
        terms.len()
    );

    config.check_clause_count(terms.len())?;
    new_multi_term_searcher_bytes(reader, &terms, field, boost, options, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::valid_prefix_coded_term;

    #[test]
    fn test_exclusive_bounds() {
        let range = NumericRange::new(Some(1.0), Some(2.0));
        let (min, max) = range.int64_bounds();
        assert_eq!(min, f64_to_i64(1.0));
        assert_eq!(max, f64_to_i64(2.0) - 1);

        let range = NumericRange::new(Some(1.0), Some(2.0))
            .inclusive_min(false)
            .inclusive_max(true);
        let (min, max) = range.int64_bounds();
        assert_eq!(min, f64_to_i64(1.0) + 1);
        assert_eq!(max, f64_to_i64(2.0));
    }

    #[test]
    fn test_open_bounds_saturate() {
        let (min, max) = NumericRange::default().int64_bounds();
        assert_eq!(min, f64_to_i64(f64::NEG_INFINITY));
        assert_eq!(max, f64_to_i64(f64::INFINITY) - 1);
    }

    #[test]
    fn test_precision_step_override() {
        let range = NumericRange::new(Some(-100.0), Some(100.0));
        let coarse = range.clone().with_precision_step(8).term_ranges(4).unwrap();
        assert!(!coarse.is_empty());
        assert!(
            coarse
                .enumerate()
                .iter()
                .all(|t| valid_prefix_coded_term(t).is_some_and(|shift| shift % 8 == 0))
        );
        assert!(range.clone().with_precision_step(0).term_ranges(4).is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let range: NumericRange = serde_json::from_str(r#"{"min": 1.5, "max": null}"#).unwrap();
        assert_eq!(range.min, Some(1.5));
        assert!(range.inclusive_min);
        assert!(!range.inclusive_max);
        assert_eq!(range.precision_step, None);
    }
}
