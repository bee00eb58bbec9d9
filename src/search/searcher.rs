//! Searchers: pull-based producers of [`DocumentMatch`]es.
//!
//! Leaf [`TermSearcher`]s walk one postings list; [`DisjunctionSearcher`]s
//! union several searchers. Pattern, prefix and numeric range queries expand
//! into a set of terms and are answered by a disjunction of term searchers
//! built through [`new_multi_term_searcher`].

pub mod disjunction;
pub mod multi_term;
pub mod numeric_range;
pub mod pattern;
pub mod term;
pub mod term_prefix;

use std::fmt::Debug;

use crate::config::SearchConfig;
use crate::error::{HalberdError, Result};
use crate::index::FieldDict;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::DocumentMatchPool;

pub use self::disjunction::DisjunctionSearcher;
pub use self::multi_term::{new_multi_term_searcher, new_multi_term_searcher_bytes};
pub use self::numeric_range::{NumericRange, new_numeric_range_searcher};
pub use self::pattern::new_pattern_searcher;
pub use self::term::TermSearcher;
pub use self::term_prefix::new_term_prefix_searcher;

/// Options shared by every searcher of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearcherOptions {
    /// Compute scores. When false every match scores zero.
    pub score: bool,
    /// Record term locations on matches.
    pub include_term_vectors: bool,
}

impl Default for SearcherOptions {
    fn default() -> Self {
        SearcherOptions {
            score: true,
            include_term_vectors: false,
        }
    }
}

/// A producer of matches in ascending internal id order.
pub trait Searcher: Send + Debug {
    /// The next match, taken from `ctx.pool`. `Ok(None)` when exhausted.
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>>;

    /// Upper bound on the number of matches.
    fn count(&self) -> u64;

    /// How many pooled matches this searcher may hold at once.
    fn document_match_pool_size(&self) -> usize;

    /// Release every underlying cursor. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Hand matches read ahead but not yet returned back to `pool`. Called
    /// when a collection stops before the searcher is exhausted.
    fn release_buffered(&mut self, _pool: &mut DocumentMatchPool) {}
}

/// Walk `dict` to the end, keeping the terms `keep` accepts. The dictionary
/// is closed whatever happens; the first error wins.
pub(crate) fn collect_dict_terms(
    mut dict: Box<dyn FieldDict>,
    config: &SearchConfig,
    mut keep: impl FnMut(&[u8]) -> bool,
) -> Result<Vec<Vec<u8>>> {
    let mut terms = Vec::new();
    let walked = loop {
        match dict.next() {
            Ok(Some(entry)) => {
                if keep(&entry.term) {
                    terms.push(entry.term);
                    if config.too_many_clauses(terms.len()) {
                        break Err(HalberdError::too_many_clauses(
                            terms.len(),
                            config.max_clause_count.unwrap_or_default(),
                        ));
                    }
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let closed = dict.close();
    walked?;
    closed?;
    Ok(terms)
}
