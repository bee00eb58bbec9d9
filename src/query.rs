//! Query objects that expand into searchers.

pub mod numeric_range;
pub mod prefix;
pub mod regexp;
pub mod wildcard;

use std::fmt::Debug;

use crate::config::SearchConfig;
use crate::error::{HalberdError, Result};
use crate::index::IndexReader;
use crate::search::searcher::{Searcher, SearcherOptions};

pub use self::numeric_range::NumericRangeQuery;
pub use self::prefix::PrefixQuery;
pub use self::regexp::RegexpQuery;
pub use self::wildcard::{WildcardQuery, wildcard_to_regexp};

/// A query over a single field.
pub trait Query: Send + Sync + Debug {
    /// Field this query searches.
    fn field(&self) -> &str;

    fn boost(&self) -> f64;

    fn set_boost(&mut self, boost: f64);

    /// Human-readable description of the query.
    fn description(&self) -> String;

    /// Check the query without touching an index.
    fn validate(&self) -> Result<()>;

    /// Build the searcher answering this query.
    fn searcher(
        &self,
        reader: &dyn IndexReader,
        options: SearcherOptions,
        config: &SearchConfig,
    ) -> Result<Box<dyn Searcher>>;

    fn clone_box(&self) -> Box<dyn Query>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub(crate) fn default_boost() -> f64 {
    1.0
}

pub(crate) fn require_field(field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(HalberdError::query("query field must not be empty"));
    }
    Ok(())
}
