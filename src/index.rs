//! Index reader interfaces.
//!
//! The search core never touches storage directly. Everything it needs from
//! an index goes through [`IndexReader`]: document counts, external id
//! resolution, postings cursors per term, ordered term dictionaries and the
//! per-document term visitor used by sorting and faceting.

pub mod memory;

use std::fmt::Debug;

use crate::error::Result;

/// One posting of a term: the document it occurs in and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// Internal document id.
    pub internal_id: u64,
    /// Term frequency within the field.
    pub freq: u64,
    /// Field length normalisation factor.
    pub norm: f64,
    /// Term positions, populated only when locations were requested.
    pub positions: Vec<u64>,
}

/// A term dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub term: Vec<u8>,
    /// Number of documents containing the term.
    pub count: u64,
}

/// Cursor over the postings of one term, ascending by internal id.
pub trait TermPostings: Send + Debug {
    /// Advance to the next posting. `Ok(None)` means the list is exhausted.
    fn next(&mut self) -> Result<Option<Posting>>;

    /// Number of postings in the list.
    fn count(&self) -> u64;

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;
}

/// Cursor over the terms of one field in ascending byte order.
pub trait FieldDict: Send + Debug {
    /// Advance to the next entry. `Ok(None)` means the dictionary is
    /// exhausted; any error is a real failure.
    fn next(&mut self) -> Result<Option<DictEntry>>;

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;
}

/// Read access to an inverted index.
pub trait IndexReader: Send + Sync + Debug {
    /// Number of live documents.
    fn doc_count(&self) -> Result<u64>;

    /// Map an internal document id to the application's id.
    fn external_id(&self, internal_id: u64) -> Result<String>;

    /// Open a postings cursor for `term` in `field`. A term that does not
    /// occur yields an empty cursor.
    fn term_postings(
        &self,
        term: &[u8],
        field: &str,
        include_locations: bool,
    ) -> Result<Box<dyn TermPostings>>;

    /// All terms of `field`.
    fn field_dict(&self, field: &str) -> Result<Box<dyn FieldDict>> {
        self.field_dict_prefix(field, &[])
    }

    /// Terms of `field` starting with `prefix`.
    fn field_dict_prefix(&self, field: &str, prefix: &[u8]) -> Result<Box<dyn FieldDict>>;

    /// Call `visitor` with every indexed term of the listed fields for one
    /// document.
    fn visit_document_field_terms(
        &self,
        internal_id: u64,
        fields: &[String],
        visitor: &mut dyn FnMut(&str, &[u8]),
    ) -> Result<()>;
}
