//! Prefix query.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::index::IndexReader;
use crate::query::{Query, default_boost, require_field};
use crate::search::searcher::{Searcher, SearcherOptions, new_term_prefix_searcher};

/// Matches documents containing a term that starts with `prefix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixQuery {
    prefix: String,
    field: String,
    #[serde(default = "default_boost")]
    boost: f64,
}

impl PrefixQuery {
    pub fn new<S: Into<String>, P: Into<String>>(field: S, prefix: P) -> Self {
        PrefixQuery {
            prefix: prefix.into(),
            field: field.into(),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Query for PrefixQuery {
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
        format!("{}:{}*", self.field, self.prefix)
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.field)
    }

    fn searcher(
        &self,
        reader: &dyn IndexReader,
        options: SearcherOptions,
        config: &SearchConfig,
    ) -> Result<Box<dyn Searcher>> {
        require_field(&self.field)?;
        new_term_prefix_searcher(reader, &self.prefix, &self.field, self.boost, options, config)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
