//! Top-N collector.
//!
//! Keeps the best `size + skip` matches in a [`CollectStoreHeap`] whose root
//! is the worst match held. Every match evicted from the heap is compared
//! against the best match evicted so far; a new match that does not beat it
//! cannot make the window and goes straight back to the pool without
//! touching the heap.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use log::debug;

use crate::collector::Collector;
use crate::collector::heap::CollectStoreHeap;
use crate::config::SearchConfig;
use crate::error::{HalberdError, Result};
use crate::index::IndexReader;
use crate::search::context::{CollectContext, SearchContext};
use crate::search::document_match::DocumentMatch;
use crate::search::facet::{FacetResults, FacetsBuilder};
use crate::search::pool::{DocumentMatchPool, PoolStats};
use crate::search::searcher::Searcher;
use crate::search::sort::SortOrder;

/// Collects the best `size` matches after skipping the best `skip`.
///
/// # Example
///
/// ```
/// use halberd::collector::{Collector, TopNCollector};
/// use halberd::index::memory::{MemoryDocument, MemoryIndex};
/// use halberd::search::{CollectContext, SearcherOptions, SortOrder};
/// use halberd::search::searcher::TermSearcher;
///
/// let index = MemoryIndex::builder()
///     .add(MemoryDocument::new("a").with_terms("body", &["rust"]))
///     .add(MemoryDocument::new("b").with_terms("body", &["rust", "fast"]))
///     .build()
///     .unwrap();
/// let mut searcher =
///     TermSearcher::new(&index, "rust", "body", 1.0, SearcherOptions::default()).unwrap();
///
/// let mut collector = TopNCollector::new(10, 0, SortOrder::by_score());
/// collector
///     .collect(&CollectContext::new(), &mut searcher, &index)
///     .unwrap();
/// assert_eq!(collector.total(), 2);
/// assert_eq!(collector.results()[0].id.as_deref(), Some("a"));
/// ```
#[derive(Debug)]
pub struct TopNCollector {
    size: usize,
    skip: usize,
    sort: SortOrder,
    config: SearchConfig,
    store: CollectStoreHeap,
    lowest_excluded: Option<DocumentMatch>,
    needed_fields: Vec<String>,
    needs_doc_ids: bool,
    facets_builder: Option<FacetsBuilder>,
    total: u64,
    max_score: f64,
    took: Duration,
    results: Vec<DocumentMatch>,
    pool_stats: PoolStats,
}

impl TopNCollector {
    pub fn new(size: usize, skip: usize, sort: SortOrder) -> Self {
        Self::with_config(size, skip, sort, SearchConfig::default())
    }

    pub fn with_config(size: usize, skip: usize, sort: SortOrder, config: SearchConfig) -> Self {
        let comparator = sort.comparator();
        // ties go to the match pulled first
        let compare = Box::new(move |a: &DocumentMatch, b: &DocumentMatch| {
            comparator
                .compare(a, b)
                .then_with(|| a.hit_number.cmp(&b.hit_number))
        });
        let store = CollectStoreHeap::new(config.backing_size(size, skip), compare);

        TopNCollector {
            size,
            skip,
            needed_fields: sort.required_fields(),
            needs_doc_ids: sort.requires_doc_id(),
            sort,
            config,
            store,
            lowest_excluded: None,
            facets_builder: None,
            total: 0,
            max_score: 0.0,
            took: Duration::ZERO,
            results: Vec::new(),
            pool_stats: PoolStats::default(),
        }
    }

    /// Take ownership of the results.
    pub fn into_results(self) -> Vec<DocumentMatch> {
        self.results
    }

    /// Pool counters of the last collection.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool_stats
    }

    /// Hand every held match back to `pool`. Counters are left alone.
    fn release(&mut self, pool: &mut DocumentMatchPool) {
        self.store.drain_into(pool);
        if let Some(dm) = self.lowest_excluded.take() {
            pool.put(dm);
        }
        self.results.clear();
    }

    fn collect_all(
        &mut self,
        ctx: &CollectContext,
        search_ctx: &mut SearchContext,
        searcher: &mut dyn Searcher,
        reader: &dyn IndexReader,
    ) -> Result<()> {
        let check_every = self.config.check_done_every.max(1);
        loop {
            if self.total % check_every == 0 {
                ctx.check()?;
            }
            let Some(dm) = searcher.next(search_ctx)? else {
                return Ok(());
            };
            if let Err((dm, e)) = self.collect_single(search_ctx, reader, dm) {
                search_ctx.pool.put(dm);
                return Err(e);
            }
        }
    }

    /// Admit one match. On failure the match is handed back with the error.
    fn collect_single(
        &mut self,
        ctx: &mut SearchContext,
        reader: &dyn IndexReader,
        mut dm: DocumentMatch,
    ) -> std::result::Result<(), (DocumentMatch, HalberdError)> {
        if !self.needed_fields.is_empty() {
            if let Err(e) = self.visit_field_terms(reader, dm.internal_id) {
                return Err((dm, e));
            }
        }

        self.total += 1;
        dm.hit_number = self.total;
        if dm.score > self.max_score {
            self.max_score = dm.score;
        }

        if self.needs_doc_ids {
            match reader.external_id(dm.internal_id) {
                Ok(id) => dm.id = Some(id),
                Err(e) => return Err((dm, e)),
            }
        }

        self.sort.value(&mut dm);

        if let Some(lowest) = &self.lowest_excluded {
            if self.store.compare(&dm, lowest) != Ordering::Less {
                ctx.pool.put(dm);
                return Ok(());
            }
        }

        self.store.add(dm);
        if self.store.len() > self.size + self.skip {
            if let Some(removed) = self.store.remove_last() {
                match self.lowest_excluded.take() {
                    None => self.lowest_excluded = Some(removed),
                    Some(lowest) => {
                        if self.store.compare(&removed, &lowest) == Ordering::Less {
                            self.lowest_excluded = Some(removed);
                            ctx.pool.put(lowest);
                        } else {
                            self.lowest_excluded = Some(lowest);
                            ctx.pool.put(removed);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Feed the terms of the needed fields to the facets and the sort order.
    fn visit_field_terms(&mut self, reader: &dyn IndexReader, internal_id: u64) -> Result<()> {
        let facets = &mut self.facets_builder;
        let sort = &mut self.sort;

        if let Some(facets) = facets.as_mut() {
            facets.start_doc();
        }
        let visited =
            reader.visit_document_field_terms(internal_id, &self.needed_fields, &mut |field, term| {
                if let Some(facets) = facets.as_mut() {
                    facets.update_visitor(field, term);
                }
                sort.update_visitor(field, term);
            });
        if let Some(facets) = facets.as_mut() {
            facets.end_doc();
        }
        visited
    }

    fn finalize(&mut self, pool: &mut DocumentMatchPool, reader: &dyn IndexReader) -> Result<()> {
        if let Some(dm) = self.lowest_excluded.take() {
            pool.put(dm);
        }
        self.results = self.store.final_results(self.skip, pool, |dm| {
            if dm.id.is_none() {
                dm.id = Some(reader.external_id(dm.internal_id)?);
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl Collector for TopNCollector {
    fn collect(
        &mut self,
        ctx: &CollectContext,
        searcher: &mut dyn Searcher,
        reader: &dyn IndexReader,
    ) -> Result<()> {
        let start = Instant::now();

        let backing_size = self.config.backing_size(self.size, self.skip);
        let mut search_ctx = SearchContext::new(DocumentMatchPool::new(
            backing_size + searcher.document_match_pool_size(),
            self.sort.len(),
        ));
        self.release(&mut search_ctx.pool);
        self.total = 0;
        self.max_score = 0.0;
        if let Some(facets) = self.facets_builder.as_mut() {
            facets.reset();
        }

        let collected = self.collect_all(ctx, &mut search_ctx, searcher, reader);
        self.took = start.elapsed();

        let outcome = match collected {
            Ok(()) => self.finalize(&mut search_ctx.pool, reader),
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            searcher.release_buffered(&mut search_ctx.pool);
            self.release(&mut search_ctx.pool);
        }
        self.pool_stats = search_ctx.pool.stats();

        match &outcome {
            Ok(()) => debug!(
                "collected {} of {} matches in {:?} (max score {})",
                self.results.len(),
                self.total,
                self.took,
                self.max_score
            ),
            Err(e) => debug!("collection stopped after {:?}: {e}", self.took),
        }
        outcome
    }

    fn results(&self) -> &[DocumentMatch] {
        &self.results
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn max_score(&self) -> f64 {
        self.max_score
    }

    fn took(&self) -> Duration {
        self.took
    }

    fn set_facets_builder(&mut self, facets: FacetsBuilder) {
        for field in facets.required_fields() {
            if !self.needed_fields.contains(&field) {
                self.needed_fields.push(field);
            }
        }
        self.facets_builder = Some(facets);
    }

    fn facet_results(&self) -> FacetResults {
        self.facets_builder
            .as_ref()
            .map(FacetsBuilder::results)
            .unwrap_or_default()
    }
}
