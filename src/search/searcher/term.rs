//! Leaf searcher over the postings of one term.

use log::warn;

use crate::error::Result;
use crate::index::{IndexReader, TermPostings};
use crate::search::context::SearchContext;
use crate::search::document_match::{DocumentMatch, TermLocation};
use crate::search::searcher::{Searcher, SearcherOptions};

/// Yields one match per posting of `(field, term)`.
///
/// Score is `boost * sqrt(freq) * idf * norm` with
/// `idf = 1 + ln(doc_count / (postings + 1))`.
#[derive(Debug)]
pub struct TermSearcher {
    field: String,
    term: Vec<u8>,
    boost: f64,
    options: SearcherOptions,
    postings: Box<dyn TermPostings>,
    count: u64,
    idf: f64,
    closed: bool,
}

impl TermSearcher {
    pub fn new(
        reader: &dyn IndexReader,
        term: &str,
        field: &str,
        boost: f64,
        options: SearcherOptions,
    ) -> Result<Self> {
        Self::new_bytes(reader, term.as_bytes(), field, boost, options)
    }

    pub fn new_bytes(
        reader: &dyn IndexReader,
        term: &[u8],
        field: &str,
        boost: f64,
        options: SearcherOptions,
    ) -> Result<Self> {
        let mut postings = reader.term_postings(term, field, options.include_term_vectors)?;
        let doc_total = match reader.doc_count() {
            Ok(n) => n,
            Err(e) => {
                if let Err(close_err) = postings.close() {
                    warn!("failed to close postings for field {field}: {close_err}");
                }
                return Err(e);
            }
        };

        let count = postings.count();
        let idf = 1.0 + (doc_total as f64 / (count as f64 + 1.0)).ln();

        Ok(TermSearcher {
            field: field.to_string(),
            term: term.to_vec(),
            boost,
            options,
            postings,
            count,
            idf,
            closed: false,
        })
    }

    pub fn term(&self) -> &[u8] {
        &self.term
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Searcher for TermSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if self.closed {
            return Ok(None);
        }
        let Some(posting) = self.postings.next()? else {
            return Ok(None);
        };

        let mut dm = ctx.pool.get();
        dm.internal_id = posting.internal_id;
        if self.options.score {
            dm.score = self.boost * (posting.freq as f64).sqrt() * self.idf * posting.norm;
        }
        if self.options.include_term_vectors && !posting.positions.is_empty() {
            dm.locations.push(TermLocation {
                field: self.field.clone(),
                term: self.term.clone(),
                positions: posting.positions,
            });
        }
        Ok(Some(dm))
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.postings.close()
    }
}
