//! Collector implementations for gathering search results.

pub mod heap;
pub mod topn;

use std::fmt::Debug;
use std::time::Duration;

use crate::error::Result;
use crate::index::IndexReader;
use crate::search::context::CollectContext;
use crate::search::document_match::DocumentMatch;
use crate::search::facet::{FacetResults, FacetsBuilder};
use crate::search::searcher::Searcher;

pub use self::heap::CollectStoreHeap;
pub use self::topn::TopNCollector;

/// Trait for collecting search results.
pub trait Collector: Send + Debug {
    /// Drive `searcher` to completion and finalize the results. A cancelled
    /// or failed collection reports the error and keeps no results.
    fn collect(
        &mut self,
        ctx: &CollectContext,
        searcher: &mut dyn Searcher,
        reader: &dyn IndexReader,
    ) -> Result<()>;

    /// Get the final results, best first.
    fn results(&self) -> &[DocumentMatch];

    /// Get the total number of matches seen.
    fn total(&self) -> u64;

    /// Highest score seen.
    fn max_score(&self) -> f64;

    /// Wall-clock time of the last collection.
    fn took(&self) -> Duration;

    /// Register facets to be computed over every match. Counts start over
    /// at each collection.
    fn set_facets_builder(&mut self, facets: FacetsBuilder);

    /// Facet counts of the last collection, empty when no facets were
    /// registered.
    fn facet_results(&self) -> FacetResults;
}
