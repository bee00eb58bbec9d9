//! A small in-memory inverted index.
//!
//! `MemoryIndex` implements [`IndexReader`] over documents that arrive
//! already analysed: text fields are lists of tokens and numeric fields are
//! indexed as prefix-coded terms at every precision shift. It backs tests,
//! benchmarks and demos; it is not a storage engine.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;

use crate::config::DEFAULT_NUMERIC_PRECISION_STEP;
use crate::error::{HalberdError, Result};
use crate::index::{DictEntry, FieldDict, IndexReader, Posting, TermPostings};
use crate::numeric::numeric_terms;

type FieldPostings = BTreeMap<Vec<u8>, Arc<[Posting]>>;

#[derive(Debug, Clone)]
enum FieldValue {
    Tokens(Vec<String>),
    Number(f64),
}

/// A document to be added to a [`MemoryIndex`].
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    id: String,
    fields: Vec<(String, FieldValue)>,
}

impl MemoryDocument {
    pub fn new<S: Into<String>>(id: S) -> Self {
        MemoryDocument {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Add a text field given as its tokens, in order.
    pub fn with_terms<S: AsRef<str>>(mut self, field: &str, tokens: &[S]) -> Self {
        let tokens = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        self.fields
            .push((field.to_string(), FieldValue::Tokens(tokens)));
        self
    }

    /// Add a numeric field.
    pub fn with_number(mut self, field: &str, value: f64) -> Self {
        self.fields
            .push((field.to_string(), FieldValue::Number(value)));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Builder for [`MemoryIndex`].
#[derive(Debug)]
pub struct MemoryIndexBuilder {
    precision_step: u32,
    documents: Vec<MemoryDocument>,
}

impl Default for MemoryIndexBuilder {
    fn default() -> Self {
        MemoryIndexBuilder {
            precision_step: DEFAULT_NUMERIC_PRECISION_STEP,
            documents: Vec::new(),
        }
    }
}

impl MemoryIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precision step used to index numeric fields.
    /// Default: 4
    pub fn precision_step(mut self, step: u32) -> Self {
        self.precision_step = step;
        self
    }

    /// Queue a document. Internal ids are assigned in insertion order,
    /// starting at zero.
    pub fn add(mut self, document: MemoryDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn build(self) -> Result<MemoryIndex> {
        let mut postings: AHashMap<String, BTreeMap<Vec<u8>, Vec<Posting>>> = AHashMap::new();
        let mut doc_terms = Vec::with_capacity(self.documents.len());
        let mut ids = Vec::with_capacity(self.documents.len());

        for (internal_id, document) in self.documents.into_iter().enumerate() {
            let internal_id = internal_id as u64;
            let mut stored: AHashMap<String, Vec<Vec<u8>>> = AHashMap::new();

            for (field, value) in document.fields {
                let dict = postings.entry(field.clone()).or_default();
                let visited = stored.entry(field).or_default();

                match value {
                    FieldValue::Tokens(tokens) => {
                        let norm = if tokens.is_empty() {
                            1.0
                        } else {
                            1.0 / (tokens.len() as f64).sqrt()
                        };
                        // token -> 1-based positions, first-occurrence order
                        let mut positions: Vec<(Vec<u8>, Vec<u64>)> = Vec::new();
                        for (i, token) in tokens.into_iter().enumerate() {
                            let term = token.into_bytes();
                            match positions.iter_mut().find(|(t, _)| *t == term) {
                                Some((_, list)) => list.push(i as u64 + 1),
                                None => positions.push((term, vec![i as u64 + 1])),
                            }
                        }
                        for (term, list) in positions {
                            visited.push(term.clone());
                            dict.entry(term).or_default().push(Posting {
                                internal_id,
                                freq: list.len() as u64,
                                norm,
                                positions: list,
                            });
                        }
                    }
                    FieldValue::Number(value) => {
                        for term in numeric_terms(value, self.precision_step)? {
                            let term = term.into_bytes();
                            visited.push(term.clone());
                            dict.entry(term).or_default().push(Posting {
                                internal_id,
                                freq: 1,
                                norm: 1.0,
                                positions: Vec::new(),
                            });
                        }
                    }
                }
            }

            ids.push(document.id);
            doc_terms.push(stored);
        }

        let fields: AHashMap<String, FieldPostings> = postings
            .into_iter()
            .map(|(field, dict)| {
                let dict: FieldPostings = dict
                    .into_iter()
                    .map(|(term, list)| (term, Arc::<[Posting]>::from(list)))
                    .collect();
                (field, dict)
            })
            .collect();

        debug!("built memory index with {} documents", ids.len());

        Ok(MemoryIndex {
            ids,
            fields,
            doc_terms,
        })
    }
}

/// Immutable in-memory index.
#[derive(Debug)]
pub struct MemoryIndex {
    ids: Vec<String>,
    fields: AHashMap<String, FieldPostings>,
    doc_terms: Vec<AHashMap<String, Vec<Vec<u8>>>>,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::new()
    }

    /// Number of distinct terms in `field`.
    pub fn term_count(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, BTreeMap::len)
    }
}

impl IndexReader for MemoryIndex {
    fn doc_count(&self) -> Result<u64> {
        Ok(self.ids.len() as u64)
    }

    fn external_id(&self, internal_id: u64) -> Result<String> {
        usize::try_from(internal_id)
            .ok()
            .and_then(|i| self.ids.get(i))
            .cloned()
            .ok_or_else(|| HalberdError::id_resolution(internal_id, "no such document"))
    }

    fn term_postings(
        &self,
        term: &[u8],
        field: &str,
        include_locations: bool,
    ) -> Result<Box<dyn TermPostings>> {
        let postings = self
            .fields
            .get(field)
            .and_then(|dict| dict.get(term))
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()));
        Ok(Box::new(MemoryPostings {
            postings,
            position: 0,
            include_locations,
            closed: false,
        }))
    }

    fn field_dict_prefix(&self, field: &str, prefix: &[u8]) -> Result<Box<dyn FieldDict>> {
        let entries = match self.fields.get(field) {
            Some(dict) => dict
                .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(|(term, _)| term.starts_with(prefix))
                .map(|(term, list)| DictEntry {
                    term: term.clone(),
                    count: list.len() as u64,
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(Box::new(MemoryFieldDict {
            entries: entries.into_iter(),
            closed: false,
        }))
    }

    fn visit_document_field_terms(
        &self,
        internal_id: u64,
        fields: &[String],
        visitor: &mut dyn FnMut(&str, &[u8]),
    ) -> Result<()> {
        let stored = usize::try_from(internal_id)
            .ok()
            .and_then(|i| self.doc_terms.get(i))
            .ok_or_else(|| HalberdError::index(format!("no stored terms for doc {internal_id}")))?;
        for field in fields {
            if let Some(terms) = stored.get(field) {
                for term in terms {
                    visitor(field, term);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryPostings {
    postings: Arc<[Posting]>,
    position: usize,
    include_locations: bool,
    closed: bool,
}

impl TermPostings for MemoryPostings {
    fn next(&mut self) -> Result<Option<Posting>> {
        if self.closed {
            return Err(HalberdError::index("postings cursor used after close"));
        }
        let Some(posting) = self.postings.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let mut posting = posting.clone();
        if !self.include_locations {
            posting.positions.clear();
        }
        Ok(Some(posting))
    }

    fn count(&self) -> u64 {
        self.postings.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryFieldDict {
    entries: std::vec::IntoIter<DictEntry>,
    closed: bool,
}

impl FieldDict for MemoryFieldDict {
    fn next(&mut self) -> Result<Option<DictEntry>> {
        if self.closed {
            return Err(HalberdError::index("dictionary cursor used after close"));
        }
        Ok(self.entries.next())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
