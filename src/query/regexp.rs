//! Regular expression query.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{HalberdError, Result};
use crate::index::IndexReader;
use crate::query::{Query, default_boost, require_field};
use crate::search::searcher::{Searcher, SearcherOptions, new_pattern_searcher};

/// Matches documents containing a term the pattern matches in full.
///
/// Terms are always matched whole, so a leading `^` is redundant and is
/// stripped before compiling. A trailing `$` is kept. The compiled pattern
/// is cached after the first successful compile.
///
/// # Example
///
/// ```
/// use halberd::query::{Query, RegexpQuery};
///
/// let query = RegexpQuery::new("name", "^ma.*y");
/// assert!(query.validate().is_ok());
/// assert_eq!(query.compiled().unwrap().as_str(), "ma.*y");
///
/// assert!(RegexpQuery::new("name", "ma(").validate().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegexpQuery {
    #[serde(rename = "regexp")]
    pattern: String,
    field: String,
    #[serde(default = "default_boost")]
    boost: f64,
    #[serde(skip)]
    compiled: OnceLock<Regex>,
}

impl RegexpQuery {
    pub fn new<S: Into<String>, P: Into<String>>(field: S, pattern: P) -> Self {
        RegexpQuery {
            pattern: pattern.into(),
            field: field.into(),
            boost: 1.0,
            compiled: OnceLock::new(),
        }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled pattern, compiling it on first use.
    pub fn compiled(&self) -> Result<&Regex> {
        if let Some(re) = self.compiled.get() {
            return Ok(re);
        }
        let source = self.pattern.strip_prefix('^').unwrap_or(&self.pattern);
        let re = Regex::new(source).map_err(|e| HalberdError::invalid_pattern(&self.pattern, e))?;
        Ok(self.compiled.get_or_init(|| re))
    }
}

impl Query for RegexpQuery {
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
        format!("{}:/{}/", self.field, self.pattern)
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.field)?;
        self.compiled().map(|_| ())
    }

    fn searcher(
        &self,
        reader: &dyn IndexReader,
        options: SearcherOptions,
        config: &SearchConfig,
    ) -> Result<Box<dyn Searcher>> {
        require_field(&self.field)?;
        let re = self.compiled()?;
        new_pattern_searcher(reader, re, &self.field, self.boost, options, config)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
