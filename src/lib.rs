//! # Halberd
//!
//! Query execution and ranking core for full-text search.
//!
//! ## Features
//!
//! - Numeric range queries answered with trie-coded terms
//! - Regular expression, wildcard and prefix expansion into term disjunctions
//! - Bounded top-N collection with pruning, field sorting and facets
//! - Cooperative cancellation with deadlines and cancellation tokens
//! - Reader-agnostic: any [`index::IndexReader`] can be searched

pub mod collector;
pub mod config;
pub mod error;
pub mod index;
pub mod numeric;
pub mod query;
pub mod search;

pub mod prelude {
    pub use crate::collector::{Collector, TopNCollector};
    pub use crate::config::SearchConfig;
    pub use crate::error::{HalberdError, Result};
    pub use crate::index::IndexReader;
    pub use crate::query::{NumericRangeQuery, PrefixQuery, Query, RegexpQuery, WildcardQuery};
    pub use crate::search::searcher::NumericRange;
    pub use crate::search::{
        CollectContext, DocumentMatch, FacetsBuilder, Searcher, SearcherOptions, SortOrder,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
