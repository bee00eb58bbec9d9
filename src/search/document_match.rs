//! Match records produced by searchers.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::search::sort::SortValue;

/// Where a term occurred inside a matched document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLocation {
    pub field: String,
    pub term: Vec<u8>,
    /// 1-based token positions.
    pub positions: Vec<u64>,
}

/// A document matched by a searcher.
///
/// Matches are handed out by a [`DocumentMatchPool`](crate::search::DocumentMatchPool)
/// and move by value from searcher to collector to result list. A match that
/// is dropped from the pipeline goes back to the pool.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocumentMatch {
    /// Reader-internal document id.
    pub internal_id: u64,
    /// External id, resolved lazily.
    pub id: Option<String>,
    pub score: f64,
    /// Sort key, one value per sort criterion.
    pub sort: Cow<'static, [SortValue]>,
    /// 1-based position in the order matches were pulled.
    pub hit_number: u64,
    pub locations: Vec<TermLocation>,
}

impl DocumentMatch {
    /// A blank match whose sort key has room for `sort_size` values.
    pub fn with_sort_capacity(sort_size: usize) -> Self {
        DocumentMatch {
            sort: Cow::Owned(Vec::with_capacity(sort_size)),
            ..Default::default()
        }
    }

    /// Clear every field, keeping allocations for reuse.
    pub fn reset(&mut self) {
        self.internal_id = 0;
        self.id = None;
        self.score = 0.0;
        self.hit_number = 0;
        self.locations.clear();
        match &mut self.sort {
            Cow::Owned(values) => values.clear(),
            Cow::Borrowed(_) => self.sort = Cow::Owned(Vec::new()),
        }
    }
}
