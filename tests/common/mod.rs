//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use halberd::error::{HalberdError, Result};
use halberd::index::memory::{MemoryDocument, MemoryIndex};
use halberd::index::{FieldDict, IndexReader, TermPostings};
use halberd::search::{SearchContext, Searcher};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small product catalog: name tokens, tags and a price.
pub fn catalog() -> Result<MemoryIndex> {
    let products: [(&str, &[&str], &[&str], f64); 8] = [
        ("p1", &["test", "kit"], &["lab"], -5.0),
        ("p2", &["text", "book"], &["school", "lab"], -1.0),
        ("p3", &["toast", "rack"], &["kitchen"], 0.0),
        ("p4", &["tests", "suite"], &["lab"], 4.0),
        ("p5", &["tent"], &["outdoor"], 5.0),
        ("p6", &["tet", "game"], &["toy"], 6.0),
        ("p7", &["textile"], &["school"], 12.5),
        ("p8", &["rest"], &[], 99.0),
    ];

    let mut builder = MemoryIndex::builder();
    for (id, name, tags, price) in products {
        let mut doc = MemoryDocument::new(id)
            .with_terms("name", name)
            .with_number("price", price);
        if !tags.is_empty() {
            doc = doc.with_terms("tag", tags);
        }
        builder = builder.add(doc);
    }
    builder.build()
}

/// Drain a searcher, returning the external ids it matched in order.
pub fn matched_ids(
    searcher: &mut dyn Searcher,
    reader: &dyn IndexReader,
    ctx: &mut SearchContext,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    while let Some(dm) = searcher.next(ctx)? {
        ids.push(reader.external_id(dm.internal_id)?);
        ctx.pool.put(dm);
    }
    Ok(ids)
}

/// Wraps a reader, counting postings cursors opened and closed, and
/// optionally failing the n-th `term_postings` call or `doc_count`.
#[derive(Debug)]
pub struct CountingReader {
    inner: MemoryIndex,
    fail_postings_at: Option<usize>,
    fail_doc_count: bool,
    fail_visit_on: Option<u64>,
    calls: AtomicUsize,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl CountingReader {
    pub fn new(inner: MemoryIndex) -> Self {
        CountingReader {
            inner,
            fail_postings_at: None,
            fail_doc_count: false,
            fail_visit_on: None,
            calls: AtomicUsize::new(0),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the `n`-th postings open, counting from 1.
    pub fn fail_postings_at(mut self, n: usize) -> Self {
        self.fail_postings_at = Some(n);
        self
    }

    pub fn fail_doc_count(mut self) -> Self {
        self.fail_doc_count = true;
        self
    }

    /// Fail field visits of the document with this internal id.
    pub fn fail_visit_on(mut self, internal_id: u64) -> Self {
        self.fail_visit_on = Some(internal_id);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn postings_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IndexReader for CountingReader {
    fn doc_count(&self) -> Result<u64> {
        if self.fail_doc_count {
            return Err(HalberdError::index("injected doc count failure"));
        }
        self.inner.doc_count()
    }

    fn external_id(&self, internal_id: u64) -> Result<String> {
        self.inner.external_id(internal_id)
    }

    fn term_postings(
        &self,
        term: &[u8],
        field: &str,
        include_locations: bool,
    ) -> Result<Box<dyn TermPostings>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_postings_at == Some(n) {
            return Err(HalberdError::index(format!("injected failure on open {n}")));
        }
        let inner = self.inner.term_postings(term, field, include_locations)?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingPostings {
            inner,
            closed: self.closed.clone(),
            done: false,
        }))
    }

    fn field_dict_prefix(&self, field: &str, prefix: &[u8]) -> Result<Box<dyn FieldDict>> {
        self.inner.field_dict_prefix(field, prefix)
    }

    fn visit_document_field_terms(
        &self,
        internal_id: u64,
        fields: &[String],
        visitor: &mut dyn FnMut(&str, &[u8]),
    ) -> Result<()> {
        if self.fail_visit_on == Some(internal_id) {
            return Err(HalberdError::index(format!(
                "injected visit failure on {internal_id}"
            )));
        }
        self.inner
            .visit_document_field_terms(internal_id, fields, visitor)
    }
}

#[derive(Debug)]
struct CountingPostings {
    inner: Box<dyn TermPostings>,
    closed: Arc<AtomicUsize>,
    done: bool,
}

impl TermPostings for CountingPostings {
    fn next(&mut self) -> Result<Option<halberd::index::Posting>> {
        self.inner.next()
    }

    fn count(&self) -> u64 {
        self.inner.count()
    }

    fn close(&mut self) -> Result<()> {
        if !self.done {
            self.done = true;
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.close()
    }
}
