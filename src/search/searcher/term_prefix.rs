//! Prefix searcher.

use log::debug;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::index::IndexReader;
use crate::search::searcher::{
    Searcher, SearcherOptions, collect_dict_terms, new_multi_term_searcher_bytes,
};

/// Searcher over every term of `field` starting with `prefix`.
pub fn new_term_prefix_searcher(
    reader: &dyn IndexReader,
    prefix: &str,
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    let dict = reader.field_dict_prefix(field, prefix.as_bytes())?;
    let terms = collect_dict_terms(dict, config, |_| true)?;
    debug!("prefix {prefix:?} on field {field} matched {} terms", terms.len());

    new_multi_term_searcher_bytes(reader, &terms, field, boost, options, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::search::context::SearchContext;
    use crate::search::pool::DocumentMatchPool;

    #[test]
    fn test_prefix() {
        let index = MemoryIndex::builder()
            .add(MemoryDocument::new("a").with_terms("name", &["marty"]))
            .add(MemoryDocument::new("b").with_terms("name", &["mary"]))
            .add(MemoryDocument::new("c").with_terms("name", &["steve"]))
            .add(MemoryDocument::new("d").with_terms("name", &["mar"]))
            .build()
            .unwrap();

        let mut searcher = new_term_prefix_searcher(
            &index,
            "mar",
            "name",
            1.0,
            SearcherOptions::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(searcher.count(), 3);

        let mut ctx = SearchContext::new(DocumentMatchPool::new(4, 1));
        let mut ids = Vec::new();
        while let Some(dm) = searcher.next(&mut ctx).unwrap() {
            ids.push(dm.internal_id);
            ctx.pool.put(dm);
        }
        assert_eq!(ids, vec![0, 1, 3]);

        let config = SearchConfig::builder().max_clause_count(2).build().unwrap();
        assert!(
            new_term_prefix_searcher(
                &index,
                "mar",
                "name",
                1.0,
                SearcherOptions::default(),
                &config
            )
            .is_err()
        );
    }
}
