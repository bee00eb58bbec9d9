//! Sort orders and the comparator the collector ranks matches with.
//!
//! A [`SortOrder`] is a list of criteria. For each match the collector feeds
//! the visited field terms to [`SortOrder::update_visitor`] and then asks
//! [`SortOrder::value`] for the match's sort key. Keys are compared with a
//! [`SortComparator`]: `Ordering::Less` means the left match ranks better.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::numeric::valid_prefix_coded_term;
use crate::search::document_match::DocumentMatch;

/// One component of a sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortValue {
    /// Placeholder for a score criterion; the comparator reads the score
    /// from the match itself.
    Score,
    Term(Vec<u8>),
    /// The document has no value for the criterion.
    Missing,
}

/// Sort key shared by every match of a score-only sort.
pub(crate) static SORT_BY_SCORE: [SortValue; 1] = [SortValue::Score];

/// How the terms of a sort field are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortFieldType {
    /// Numeric if every term is prefix-coded, text otherwise.
    #[default]
    Auto,
    String,
    Number,
}

/// Which value to use when a document has several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// The first value visited.
    #[default]
    Default,
    Min,
    Max,
}

/// Where documents without a value go, regardless of direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPlacement {
    First,
    #[default]
    Last,
}

/// Sort on the indexed terms of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, rename = "type")]
    pub field_type: SortFieldType,
    #[serde(default)]
    pub mode: SortMode,
    #[serde(default)]
    pub missing: MissingPlacement,
}

impl SortField {
    pub fn new<S: Into<String>>(field: S) -> Self {
        SortField {
            field: field.into(),
            descending: false,
            field_type: SortFieldType::Auto,
            mode: SortMode::Default,
            missing: MissingPlacement::Last,
        }
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn field_type(mut self, field_type: SortFieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn mode(mut self, mode: SortMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn missing(mut self, missing: MissingPlacement) -> Self {
        self.missing = missing;
        self
    }

    /// Reduce the visited terms of one document to its sort value.
    fn value(&self, terms: &mut Vec<Vec<u8>>) -> SortValue {
        let numeric = match self.field_type {
            SortFieldType::Number => true,
            SortFieldType::String => false,
            SortFieldType::Auto => {
                !terms.is_empty() && terms.iter().all(|t| valid_prefix_coded_term(t).is_some())
            }
        };
        if numeric {
            // only full-precision terms carry the exact value
            terms.retain(|t| valid_prefix_coded_term(t) == Some(0));
        }

        let chosen = match self.mode {
            SortMode::Default => terms.drain(..).next(),
            SortMode::Min => terms.drain(..).min(),
            SortMode::Max => terms.drain(..).max(),
        };
        chosen.map_or(SortValue::Missing, SortValue::Term)
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSort {
    Score { descending: bool },
    Id { descending: bool },
    Field(SortField),
}

impl SearchSort {
    fn descending(&self) -> bool {
        match self {
            SearchSort::Score { descending } | SearchSort::Id { descending } => *descending,
            SearchSort::Field(field) => field.descending,
        }
    }
}

/// An ordered list of sort criteria plus the per-document scratch space used
/// while gathering field values.
#[derive(Debug, Clone)]
pub struct SortOrder {
    criteria: Vec<SearchSort>,
    /// Terms visited for each criterion of the current document.
    visited: Vec<Vec<Vec<u8>>>,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::by_score()
    }
}

impl SortOrder {
    pub fn new(criteria: Vec<SearchSort>) -> Self {
        let visited = vec![Vec::new(); criteria.len()];
        SortOrder { criteria, visited }
    }

    /// Highest score first.
    pub fn by_score() -> Self {
        Self::new(vec![SearchSort::Score { descending: true }])
    }

    /// Parse string criteria: `_score`, `_id` or a field name, each
    /// optionally prefixed with `-` for descending order.
    ///
    /// ```
    /// use halberd::search::{SearchSort, SortOrder};
    ///
    /// let order = SortOrder::parse(&["-_score", "_id"]);
    /// assert_eq!(
    ///     order.criteria(),
    ///     &[
    ///         SearchSort::Score { descending: true },
    ///         SearchSort::Id { descending: false },
    ///     ]
    /// );
    /// ```
    pub fn parse(criteria: &[&str]) -> Self {
        let criteria = criteria
            .iter()
            .map(|raw| {
                let (descending, name) = match raw.strip_prefix('-') {
                    Some(name) => (true, name),
                    None => (false, *raw),
                };
                match name {
                    "_score" => SearchSort::Score { descending },
                    "_id" => SearchSort::Id { descending },
                    field => SearchSort::Field(SortField::new(field).descending(descending)),
                }
            })
            .collect();
        Self::new(criteria)
    }

    pub fn criteria(&self) -> &[SearchSort] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Whether sorting needs the external id of every match.
    pub fn requires_doc_id(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| matches!(c, SearchSort::Id { .. }))
    }

    /// Fields whose terms must be visited to compute sort keys.
    pub fn required_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for criterion in &self.criteria {
            if let SearchSort::Field(field) = criterion {
                if !fields.contains(&field.field) {
                    fields.push(field.field.clone());
                }
            }
        }
        fields
    }

    /// Per criterion: whether it sorts on score.
    pub fn cache_is_score(&self) -> Vec<bool> {
        self.criteria
            .iter()
            .map(|c| matches!(c, SearchSort::Score { .. }))
            .collect()
    }

    /// Per criterion: whether it sorts descending.
    pub fn cache_descending(&self) -> Vec<bool> {
        self.criteria.iter().map(SearchSort::descending).collect()
    }

    /// A single score criterion needs no per-document key.
    pub fn is_score_only(&self) -> bool {
        matches!(self.criteria.as_slice(), [SearchSort::Score { .. }])
    }

    /// Record a visited term of the current document.
    pub fn update_visitor(&mut self, field: &str, term: &[u8]) {
        for (criterion, visited) in self.criteria.iter().zip(self.visited.iter_mut()) {
            if let SearchSort::Field(sort_field) = criterion {
                if sort_field.field == field {
                    visited.push(term.to_vec());
                }
            }
        }
    }

    /// Compute the sort key of `dm` from the terms visited since the last
    /// call and store it on the match.
    pub fn value(&mut self, dm: &mut DocumentMatch) {
        if self.is_score_only() {
            dm.sort = Cow::Borrowed(&SORT_BY_SCORE);
            return;
        }

        let mut key = match std::mem::take(&mut dm.sort) {
            Cow::Owned(mut values) => {
                values.clear();
                values
            }
            Cow::Borrowed(_) => Vec::with_capacity(self.criteria.len()),
        };
        for (criterion, visited) in self.criteria.iter().zip(self.visited.iter_mut()) {
            let value = match criterion {
                SearchSort::Score { .. } => SortValue::Score,
                SearchSort::Id { .. } => match &dm.id {
                    Some(id) => SortValue::Term(id.as_bytes().to_vec()),
                    None => SortValue::Missing,
                },
                SearchSort::Field(field) => field.value(visited),
            };
            visited.clear();
            key.push(value);
        }
        dm.sort = Cow::Owned(key);
    }

    /// A comparator detached from the visiting state.
    pub fn comparator(&self) -> SortComparator {
        let criteria = self
            .criteria
            .iter()
            .map(|c| match c {
                SearchSort::Score { descending } => CompareBy::Score {
                    descending: *descending,
                },
                SearchSort::Id { descending } => CompareBy::Value {
                    descending: *descending,
                    missing: MissingPlacement::Last,
                },
                SearchSort::Field(field) => CompareBy::Value {
                    descending: field.descending,
                    missing: field.missing,
                },
            })
            .collect();
        SortComparator { criteria }
    }
}

#[derive(Debug, Clone, Copy)]
enum CompareBy {
    Score {
        descending: bool,
    },
    Value {
        descending: bool,
        missing: MissingPlacement,
    },
}

/// Three-way comparison of two matches under a [`SortOrder`].
#[derive(Debug, Clone)]
pub struct SortComparator {
    criteria: Vec<CompareBy>,
}

impl SortComparator {
    /// `Less` when `i` ranks before `j`.
    pub fn compare(&self, i: &DocumentMatch, j: &DocumentMatch) -> Ordering {
        if let [CompareBy::Score { descending }] = self.criteria.as_slice() {
            return compare_scores(i.score, j.score, *descending);
        }

        for (x, by) in self.criteria.iter().enumerate() {
            let ordering = match *by {
                CompareBy::Score { descending } => compare_scores(i.score, j.score, descending),
                CompareBy::Value {
                    descending,
                    missing,
                } => compare_values(i.sort.get(x), j.sort.get(x), descending, missing),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn compare_scores(a: f64, b: f64, descending: bool) -> Ordering {
    let ordering = a.total_cmp(&b);
    if descending { ordering.reverse() } else { ordering }
}

fn compare_values(
    a: Option<&SortValue>,
    b: Option<&SortValue>,
    descending: bool,
    missing: MissingPlacement,
) -> Ordering {
    let missing_first = missing == MissingPlacement::First;
    match (a, b) {
        (Some(SortValue::Term(a)), Some(SortValue::Term(b))) => {
            let ordering = a.cmp(b);
            if descending { ordering.reverse() } else { ordering }
        }
        (Some(SortValue::Term(_)), _) => {
            if missing_first {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (_, Some(SortValue::Term(_))) => {
            if missing_first {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        _ => Ordering::Equal,
    }
}
