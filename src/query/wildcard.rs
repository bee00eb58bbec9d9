//! Wildcard query implementation for pattern matching.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{HalberdError, Result};
use crate::index::IndexReader;
use crate::query::{Query, default_boost, require_field};
use crate::search::searcher::{Searcher, SearcherOptions, new_pattern_searcher};

/// Translate a wildcard pattern into a regular expression.
///
/// Regex metacharacters are escaped first, then `*` becomes `.*` and `?`
/// becomes `.`. There is no escape for a literal `*` or `?`.
///
/// ```
/// use halberd::query::wildcard_to_regexp;
///
/// assert_eq!(wildcard_to_regexp("te?t*"), "te.t.*");
/// assert_eq!(wildcard_to_regexp("a.b"), "a\\.b");
/// ```
pub fn wildcard_to_regexp(wildcard: &str) -> String {
    let mut regexp = String::with_capacity(wildcard.len() * 2);
    for c in wildcard.chars() {
        match c {
            '+' | '(' | ')' | '^' | '$' | '.' | '{' | '}' | '[' | ']' | '|' | '\\' => {
                regexp.push('\\');
                regexp.push(c);
            }
            '*' => regexp.push_str(".*"),
            '?' => regexp.push('.'),
            _ => regexp.push(c),
        }
    }
    regexp
}

/// A query that matches documents containing terms that match a wildcard pattern.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildcardQuery {
    wildcard: String,
    field: String,
    #[serde(default = "default_boost")]
    boost: f64,
    #[serde(skip)]
    compiled: OnceLock<Regex>,
}

impl WildcardQuery {
    pub fn new<S: Into<String>, P: Into<String>>(field: S, wildcard: P) -> Self {
        WildcardQuery {
            wildcard: wildcard.into(),
            field: field.into(),
            boost: 1.0,
            compiled: OnceLock::new(),
        }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    /// The translated pattern, compiled on first use.
    pub fn compiled(&self) -> Result<&Regex> {
        if let Some(re) = self.compiled.get() {
            return Ok(re);
        }
        let re = Regex::new(&wildcard_to_regexp(&self.wildcard))
            .map_err(|e| HalberdError::invalid_pattern(&self.wildcard, e))?;
        Ok(self.compiled.get_or_init(|| re))
    }
}

impl Query for WildcardQuery {
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
        format!("{}:{}", self.field, self.wildcard)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        assert_eq!(wildcard_to_regexp("te?t*"), "te.t.*");
        assert_eq!(wildcard_to_regexp("*"), ".*");
        assert_eq!(wildcard_to_regexp("a+b(c)"), "a\\+b\\(c\\)");
        assert_eq!(wildcard_to_regexp("^$|[]{}"), "\\^\\$\\|\\[\\]\\{\\}");
        assert_eq!(wildcard_to_regexp("x\\y"), "x\\\\y");
        assert_eq!(wildcard_to_regexp("plain"), "plain");
    }

    #[test]
    fn test_compiled_pattern() {
        let query = WildcardQuery::new("name", "ma?y*");
        let re = query.compiled().unwrap();
        assert_eq!(re.as_str(), "ma.y.*");
        assert!(query.validate().is_ok());

        // every metacharacter is escaped, so any wildcard compiles
        assert!(WildcardQuery::new("name", "((([").validate().is_ok());
    }
}
