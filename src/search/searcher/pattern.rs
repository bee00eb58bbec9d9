//! Searcher over the terms of a field matching a compiled pattern.
//!
//! The term dictionary is walked from the pattern's literal prefix, when one
//! can be read off the pattern source, and every term the pattern matches
//! in full is kept. Regular expression and wildcard queries both end up
//! here.

use log::debug;
use regex::Regex;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::index::IndexReader;
use crate::search::searcher::{
    Searcher, SearcherOptions, collect_dict_terms, new_multi_term_searcher_bytes,
};

/// Searcher over every term of `field` that `pattern` matches as a whole.
///
/// The literal prefix is derived from `pattern.as_str()`, so the pattern
/// must not rely on builder flags such as case insensitivity that the source
/// text does not show.
pub fn new_pattern_searcher(
    reader: &dyn IndexReader,
    pattern: &Regex,
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    let prefix = literal_prefix(pattern.as_str());
    let dict = if prefix.is_empty() {
        reader.field_dict(field)?
    } else {
        reader.field_dict_prefix(field, prefix.as_bytes())?
    };
    let terms = collect_dict_terms(dict, config, |term| matches_whole_term(pattern, term))?;
    debug!(
        "pattern {:?} on field {field} (prefix {prefix:?}) matched {} terms",
        pattern.as_str(),
        terms.len()
    );

    new_multi_term_searcher_bytes(reader, &terms, field, boost, options, config)
}

/// The leftmost match must span the whole term. Terms that are not UTF-8
/// never match.
pub(crate) fn matches_whole_term(pattern: &Regex, term: &[u8]) -> bool {
    let Ok(term) = std::str::from_utf8(term) else {
        return false;
    };
    pattern
        .find(term)
        .is_some_and(|m| m.start() == 0 && m.end() == term.len())
}

/// Literal text every match must start with. Conservative: any alternation
/// disables the prefix, and a literal made optional or repeatable by the
/// next character is left out.
pub(crate) fn literal_prefix(pattern: &str) -> String {
    if pattern.contains('|') {
        return String::new();
    }
    let mut prefix = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' | '{' => {
                prefix.pop();
                break;
            }
            '.' | '+' | '(' | ')' | '[' | ']' | '}' | '^' | '$' | '\\' => break,
            _ => prefix.push(c),
        }
    }
    prefix
}
