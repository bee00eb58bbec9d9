//! Numeric range query.

use serde::{Deserialize, Serialize};

use crate::config::{SearchConfig, validate_precision_step};
use crate::error::{HalberdError, Result};
use crate::index::IndexReader;
use crate::query::{Query, default_boost, require_field};
use crate::search::searcher::{NumericRange, Searcher, SearcherOptions, new_numeric_range_searcher};

/// Matches documents whose numeric field value lies in a range.
///
/// # Example
///
/// ```
/// use halberd::query::{NumericRangeQuery, Query};
/// use halberd::search::searcher::NumericRange;
///
/// let query = NumericRangeQuery::new("price", NumericRange::new(Some(10.0), None));
/// assert!(query.validate().is_ok());
///
/// let unbounded = NumericRangeQuery::new("price", NumericRange::new(None, None));
/// assert!(unbounded.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRangeQuery {
    #[serde(flatten)]
    range: NumericRange,
    field: String,
    #[serde(default = "default_boost")]
    boost: f64,
}

impl NumericRangeQuery {
    pub fn new<S: Into<String>>(field: S, range: NumericRange) -> Self {
        NumericRangeQuery {
            range,
            field: field.into(),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn range(&self) -> &NumericRange {
        &self.range
    }
}

impl Query for NumericRangeQuery {
    fn field(&self) -> &str {
        &self.field
    }

    fn boost(&self) -> f64 {
        self.boost
    }

    fn set_boost(&mut self, boost: f64) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let open = if self.range.inclusive_min { '[' } else { '(' };
        let close = if self.range.inclusive_max { ']' } else { ')' };
        let bound = |b: Option<f64>| b.map_or_else(|| "*".to_string(), |v| v.to_string());
        format!(
            "{}:{open}{}, {}{close}",
            self.field,
            bound(self.range.min),
            bound(self.range.max)
        )
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.field)?;
        if self.range.min.is_none() && self.range.max.is_none() {
            return Err(HalberdError::query(
                "numeric range query must specify min or max",
            ));
        }
        if let Some(step) = self.range.precision_step {
            validate_precision_step(step)?;
        }
        Ok(())
    }

    fn searcher(
        &self,
        reader: &dyn IndexReader,
        options: SearcherOptions,
        config: &SearchConfig,
    ) -> Result<Box<dyn Searcher>> {
        require_field(&self.field)?;
        new_numeric_range_searcher(reader, &self.range, &self.field, self.boost, options, config)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description() {
        let query = NumericRangeQuery::new(
            "price",
            NumericRange::new(Some(1.5), None).inclusive_min(false),
        );
        assert_eq!(query.description(), "price:(1.5, *)");
    }

    #[test]
    fn test_deserialize_flattened_range() {
        let query: NumericRangeQuery =
            serde_json::from_str(r#"{"field": "price", "min": -5, "max": 5}"#).unwrap();
        assert_eq!(query.range().min, Some(-5.0));
        assert_eq!(query.range().max, Some(5.0));
        assert!(query.range().inclusive_min);
        assert!(!query.range().inclusive_max);
        assert!(query.validate().is_ok());
    }
}
