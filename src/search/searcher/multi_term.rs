//! Disjunction over a set of literal terms.

use log::{debug, warn};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::index::IndexReader;
use crate::search::searcher::{DisjunctionSearcher, Searcher, SearcherOptions, TermSearcher};

/// Sub-searchers built so far. Dropping the guard closes all of them, so an
/// early return leaves nothing open.
struct PendingSearchers(Vec<Box<dyn Searcher>>);

impl PendingSearchers {
    fn with_capacity(capacity: usize) -> Self {
        PendingSearchers(Vec::with_capacity(capacity))
    }

    fn push(&mut self, searcher: Box<dyn Searcher>) {
        self.0.push(searcher);
    }

    fn into_inner(mut self) -> Vec<Box<dyn Searcher>> {
        std::mem::take(&mut self.0)
    }
}

impl Drop for PendingSearchers {
    fn drop(&mut self) {
        for searcher in &mut self.0 {
            if let Err(e) = searcher.close() {
                warn!("failed to close term searcher during cleanup: {e}");
            }
        }
    }
}

/// One term searcher per string term, unioned by a disjunction.
pub fn new_multi_term_searcher<S: AsRef<str>>(
    reader: &dyn IndexReader,
    terms: &[S],
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    build(
        reader,
        terms.iter().map(|t| t.as_ref().as_bytes()),
        terms.len(),
        field,
        boost,
        options,
        config,
    )
}

/// One term searcher per byte-string term, unioned by a disjunction.
pub fn new_multi_term_searcher_bytes<B: AsRef<[u8]>>(
    reader: &dyn IndexReader,
    terms: &[B],
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    build(
        reader,
        terms.iter().map(AsRef::<[u8]>::as_ref),
        terms.len(),
        field,
        boost,
        options,
        config,
    )
}

fn build<'a>(
    reader: &dyn IndexReader,
    terms: impl Iterator<Item = &'a [u8]>,
    len: usize,
    field: &str,
    boost: f64,
    options: SearcherOptions,
    config: &SearchConfig,
) -> Result<Box<dyn Searcher>> {
    config.check_clause_count(len)?;
    debug!("expanding {len} terms on field {field}");

    let mut pending = PendingSearchers::with_capacity(len);
    for term in terms {
        let searcher = TermSearcher::new_bytes(reader, term, field, boost, options)?;
        pending.push(Box::new(searcher));
    }

    // the disjunction owns the sub-searchers from here on, and closes them
    // itself if it fails
    let disjunction = DisjunctionSearcher::new(pending.into_inner(), 0, options, config)?;
    Ok(Box::new(disjunction))
}
