//! Union of several searchers.

use std::cmp::Reverse;

use log::warn;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::DocumentMatchPool;
use crate::search::searcher::{Searcher, SearcherOptions};

/// Merges sub-searchers by internal id and emits each document once.
///
/// The score of a document is the sum of its constituent scores times
/// `coord = matched / total`. Documents matched by fewer than `min`
/// sub-searchers are dropped.
#[derive(Debug)]
pub struct DisjunctionSearcher {
    searchers: Vec<Box<dyn Searcher>>,
    currs: Vec<Option<DocumentMatch>>,
    min: usize,
    options: SearcherOptions,
    count: u64,
    pool_size: usize,
    initialized: bool,
    closed: bool,
}

impl DisjunctionSearcher {
    /// Take ownership of `searchers`. If the clause limit is exceeded every
    /// sub-searcher is closed before the error is returned.
    pub fn new(
        mut searchers: Vec<Box<dyn Searcher>>,
        min: usize,
        options: SearcherOptions,
        config: &SearchConfig,
    ) -> Result<Self> {
        if let Err(e) = config.check_clause_count(searchers.len()) {
            for searcher in &mut searchers {
                if let Err(close_err) = searcher.close() {
                    warn!("failed to close sub-searcher: {close_err}");
                }
            }
            return Err(e);
        }

        // most selective last
        searchers.sort_by_key(|s| Reverse(s.count()));

        let count = searchers.iter().map(|s| s.count()).sum();
        let pool_size = searchers.len()
            + searchers
                .iter()
                .map(|s| s.document_match_pool_size())
                .sum::<usize>();
        let currs = searchers.iter().map(|_| None).collect();

        Ok(DisjunctionSearcher {
            searchers,
            currs,
            min,
            options,
            count,
            pool_size,
            initialized: false,
            closed: false,
        })
    }

    fn initialize(&mut self, ctx: &mut SearchContext) -> Result<()> {
        for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
            *curr = searcher.next(ctx)?;
        }
        self.initialized = true;
        Ok(())
    }
}

impl Searcher for DisjunctionSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if self.closed {
            return Ok(None);
        }
        if !self.initialized {
            self.initialize(ctx)?;
        }

        let total = self.searchers.len();
        loop {
            let Some(doc) = self.currs.iter().flatten().map(|d| d.internal_id).min() else {
                return Ok(None);
            };

            let mut matched: Option<DocumentMatch> = None;
            let mut matching = 0usize;
            let mut score = 0.0;
            for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
                let Some(mut dm) = curr.take_if(|d| d.internal_id == doc) else {
                    continue;
                };
                matching += 1;
                score += dm.score;
                match matched.as_mut() {
                    None => matched = Some(dm),
                    Some(first) => {
                        first.locations.append(&mut dm.locations);
                        ctx.pool.put(dm);
                    }
                }

                match searcher.next(ctx) {
                    Ok(next) => *curr = next,
                    Err(e) => {
                        if let Some(dm) = matched.take() {
                            ctx.pool.put(dm);
                        }
                        return Err(e);
                    }
                }
            }

            let Some(mut dm) = matched else {
                continue;
            };
            if matching < self.min {
                ctx.pool.put(dm);
                continue;
            }
            if self.options.score {
                dm.score = score * (matching as f64 / total as f64);
            }
            return Ok(Some(dm));
        }
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn document_match_pool_size(&self) -> usize {
        self.pool_size
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut result = Ok(());
        for searcher in &mut self.searchers {
            if let Err(e) = searcher.close() {
                warn!("failed to close sub-searcher: {e}");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn release_buffered(&mut self, pool: &mut DocumentMatchPool) {
        for curr in &mut self.currs {
            if let Some(dm) = curr.take() {
                pool.put(dm);
            }
        }
        for searcher in &mut self.searchers {
            searcher.release_buffered(pool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HalberdError;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::search::searcher::TermSearcher;

    fn index() -> MemoryIndex {
        MemoryIndex::builder()
            .add(MemoryDocument::new("a").with_terms("body", &["cat"]))
            .add(MemoryDocument::new("b").with_terms("body", &["cat", "dog"]))
            .add(MemoryDocument::new("c").with_terms("body", &["dog"]))
            .add(MemoryDocument::new("d").with_terms("body", &["cow"]))
            .build()
            .unwrap()
    }

    fn term_searchers(index: &MemoryIndex, terms: &[&str]) -> Vec<Box<dyn Searcher>> {
        terms
            .iter()
            .map(|t| {
                Box::new(
                    TermSearcher::new(index, t, "body", 1.0, SearcherOptions::default()).unwrap(),
                ) as Box<dyn Searcher>
            })
            .collect()
    }

    fn drain(searcher: &mut dyn Searcher, ctx: &mut SearchContext) -> Vec<(u64, f64)> {
        let mut out = Vec::new();
        while let Some(dm) = searcher.next(ctx).unwrap() {
            out.push((dm.internal_id, dm.score));
            ctx.pool.put(dm);
        }
        out
    }

    #[test]
    fn test_union_with_coord() {
        let index = index();
        let subs = term_searchers(&index, &["cat", "dog"]);
        let mut disjunction = DisjunctionSearcher::new(
            subs,
            0,
            SearcherOptions::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(disjunction.count(), 4);
        assert_eq!(disjunction.document_match_pool_size(), 4);

        let mut ctx = SearchContext::new(DocumentMatchPool::new(8, 1));
        let hits = drain(&mut disjunction, &mut ctx);
        let ids: Vec<u64> = hits.iter().map(|h| h.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // doc 1 matched both clauses: full coord beats the half coord of the others
        assert!(hits[1].1 > hits[0].1);
        assert!(hits[1].1 > hits[2].1);
        assert_eq!(ctx.pool.stats().outstanding, 0);
        disjunction.close().unwrap();
    }

    #[test]
    fn test_min_should_match() {
        let index = index();
        let subs = term_searchers(&index, &["cat", "dog", "cow"]);
        let mut disjunction = DisjunctionSearcher::new(
            subs,
            2,
            SearcherOptions::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        let mut ctx = SearchContext::new(DocumentMatchPool::new(8, 1));
        let ids: Vec<u64> = drain(&mut disjunction, &mut ctx)
            .into_iter()
            .map(|h| h.0)
            .collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(ctx.pool.stats().outstanding, 0);
    }

    #[test]
    fn test_clause_limit() {
        let index = index();
        let subs = term_searchers(&index, &["cat", "dog", "cow"]);
        let config = SearchConfig::builder().max_clause_count(2).build().unwrap();
        let err = DisjunctionSearcher::new(subs, 0, SearcherOptions::default(), &config)
            .unwrap_err();
        assert!(matches!(err, HalberdError::TooManyClauses { count: 3, max: 2 }));
    }

    #[test]
    fn test_empty() {
        let mut disjunction = DisjunctionSearcher::new(
            Vec::new(),
            0,
            SearcherOptions::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        let mut ctx = SearchContext::new(DocumentMatchPool::new(1, 1));
        assert!(disjunction.next(&mut ctx).unwrap().is_none());
        assert_eq!(disjunction.count(), 0);
    }

    #[test]
    fn test_release_buffered_returns_read_ahead() {
        let index = index();
        let inner = DisjunctionSearcher::new(
            term_searchers(&index, &["dog", "cow"]),
            0,
            SearcherOptions::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        let mut subs = term_searchers(&index, &["cat"]);
        subs.push(Box::new(inner));
        let mut outer =
            DisjunctionSearcher::new(subs, 0, SearcherOptions::default(), &SearchConfig::default())
                .unwrap();

        let mut ctx = SearchContext::new(DocumentMatchPool::new(8, 1));
        let first = outer.next(&mut ctx).unwrap().unwrap();
        assert_eq!(first.internal_id, 0);
        ctx.pool.put(first);
        assert!(ctx.pool.stats().outstanding > 0);

        outer.release_buffered(&mut ctx.pool);
        assert_eq!(ctx.pool.stats().outstanding, 0);
        outer.close().unwrap();
    }
}
