//! Searchers, match records and everything a collection passes around.

pub mod context;
pub mod document_match;
pub mod facet;
pub mod pool;
pub mod searcher;
pub mod sort;

pub use self::context::{CollectContext, SearchContext};
pub use self::document_match::{DocumentMatch, TermLocation};
pub use self::facet::{
    FacetBuilder, FacetResult, FacetResults, FacetsBuilder, NumericFacetBuilder,
    NumericRangeFacet, TermFacet, TermsFacetBuilder,
};
pub use self::pool::{DocumentMatchPool, PoolStats};
pub use self::searcher::{Searcher, SearcherOptions};
pub use self::sort::{
    MissingPlacement, SearchSort, SortComparator, SortField, SortFieldType, SortMode, SortOrder,
    SortValue,
};
