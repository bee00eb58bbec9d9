//! Facet counting over the terms visited during collection.
//!
//! Every collected match is visited once: [`FacetsBuilder::start_doc`], one
//! [`FacetsBuilder::update_visitor`] call per indexed term of the required
//! fields, then [`FacetsBuilder::end_doc`]. Facets count every match, not
//! only the ones that make it into the result window.

use std::collections::BTreeMap;
use std::fmt::Debug;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::numeric::{PrefixCoded, i64_to_f64, valid_prefix_coded_term};

/// A term and how many times it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFacet {
    pub term: String,
    pub count: u64,
}

/// A named numeric range and how many values fell into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRangeFacet {
    pub name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: u64,
}

/// Result of one facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetResult {
    pub field: String,
    /// Values counted, including the ones trimmed into `other`.
    pub total: u64,
    /// Documents without any value for the field.
    pub missing: u64,
    /// Values counted but not reported because of the size limit.
    pub other: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<TermFacet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numeric_ranges: Vec<NumericRangeFacet>,
}

/// Facet results by facet name.
pub type FacetResults = BTreeMap<String, FacetResult>;

/// A single facet fed with the visited terms of each document.
pub trait FacetBuilder: Send + Debug {
    /// Field this facet reads.
    fn field(&self) -> &str;

    fn start_doc(&mut self);

    fn update_visitor(&mut self, field: &str, term: &[u8]);

    fn end_doc(&mut self);

    fn result(&self) -> FacetResult;

    /// Forget every count, keeping the configuration.
    fn reset(&mut self);
}

/// Named collection of facet builders driven by a collector.
#[derive(Debug, Default)]
pub struct FacetsBuilder {
    facets: Vec<(String, Box<dyn FacetBuilder>)>,
}

impl FacetsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, name: S, facet: Box<dyn FacetBuilder>) {
        self.facets.push((name.into(), facet));
    }

    /// Fields the collector must visit for these facets.
    pub fn required_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for (_, facet) in &self.facets {
            if !fields.iter().any(|f| f == facet.field()) {
                fields.push(facet.field().to_string());
            }
        }
        fields
    }

    pub fn start_doc(&mut self) {
        for (_, facet) in &mut self.facets {
            facet.start_doc();
        }
    }

    pub fn update_visitor(&mut self, field: &str, term: &[u8]) {
        for (_, facet) in &mut self.facets {
            facet.update_visitor(field, term);
        }
    }

    pub fn end_doc(&mut self) {
        for (_, facet) in &mut self.facets {
            facet.end_doc();
        }
    }

    pub fn reset(&mut self) {
        for (_, facet) in &mut self.facets {
            facet.reset();
        }
    }

    pub fn results(&self) -> FacetResults {
        self.facets
            .iter()
            .map(|(name, facet)| (name.clone(), facet.result()))
            .collect()
    }
}

/// Counts the distinct terms of a field and reports the most frequent.
#[derive(Debug)]
pub struct TermsFacetBuilder {
    field: String,
    size: usize,
    counts: AHashMap<Vec<u8>, u64>,
    total: u64,
    missing: u64,
    saw_value: bool,
}

impl TermsFacetBuilder {
    pub fn new<S: Into<String>>(field: S, size: usize) -> Self {
        TermsFacetBuilder {
            field: field.into(),
            size,
            counts: AHashMap::new(),
            total: 0,
            missing: 0,
            saw_value: false,
        }
    }
}

impl FacetBuilder for TermsFacetBuilder {
    fn field(&self) -> &str {
        &self.field
    }

    fn start_doc(&mut self) {
        self.saw_value = false;
    }

    fn update_visitor(&mut self, field: &str, term: &[u8]) {
        if field == self.field {
            self.saw_value = true;
            self.total += 1;
            *self.counts.entry(term.to_vec()).or_insert(0) += 1;
        }
    }

    fn end_doc(&mut self) {
        if !self.saw_value {
            self.missing += 1;
        }
    }

    fn reset(&mut self) {
        self.counts.clear();
        self.total = 0;
        self.missing = 0;
        self.saw_value = false;
    }

    fn result(&self) -> FacetResult {
        let mut terms: Vec<TermFacet> = self
            .counts
            .iter()
            .map(|(term, &count)| TermFacet {
                term: String::from_utf8_lossy(term).into_owned(),
                count,
            })
            .collect();
        terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        terms.truncate(self.size);

        let reported: u64 = terms.iter().map(|t| t.count).sum();
        FacetResult {
            field: self.field.clone(),
            total: self.total,
            missing: self.missing,
            other: self.total - reported,
            terms,
            numeric_ranges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct NumericRangeBucket {
    name: String,
    min: Option<f64>,
    max: Option<f64>,
    count: u64,
}

impl NumericRangeBucket {
    fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value < max)
    }
}

/// Counts numeric values falling into named `[min, max)` ranges.
#[derive(Debug)]
pub struct NumericFacetBuilder {
    field: String,
    size: usize,
    ranges: Vec<NumericRangeBucket>,
    total: u64,
    missing: u64,
    saw_value: bool,
}

impl NumericFacetBuilder {
    pub fn new<S: Into<String>>(field: S, size: usize) -> Self {
        NumericFacetBuilder {
            field: field.into(),
            size,
            ranges: Vec::new(),
            total: 0,
            missing: 0,
            saw_value: false,
        }
    }

    /// Add a range; an absent bound is open.
    pub fn add_range<S: Into<String>>(&mut self, name: S, min: Option<f64>, max: Option<f64>) {
        self.ranges.push(NumericRangeBucket {
            name: name.into(),
            min,
            max,
            count: 0,
        });
    }
}

impl FacetBuilder for NumericFacetBuilder {
    fn field(&self) -> &str {
        &self.field
    }

    fn start_doc(&mut self) {
        self.saw_value = false;
    }

    fn update_visitor(&mut self, field: &str, term: &[u8]) {
        if field != self.field || valid_prefix_coded_term(term) != Some(0) {
            return;
        }
        let Ok(sortable) = PrefixCoded::from_term(term).and_then(|p| p.int64()) else {
            return;
        };
        let value = i64_to_f64(sortable);
        self.saw_value = true;
        for range in &mut self.ranges {
            if range.contains(value) {
                range.count += 1;
                self.total += 1;
            }
        }
    }

    fn end_doc(&mut self) {
        if !self.saw_value {
            self.missing += 1;
        }
    }

    fn reset(&mut self) {
        for range in &mut self.ranges {
            range.count = 0;
        }
        self.total = 0;
        self.missing = 0;
        self.saw_value = false;
    }

    fn result(&self) -> FacetResult {
        let mut ranges: Vec<NumericRangeFacet> = self
            .ranges
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| NumericRangeFacet {
                name: r.name.clone(),
                min: r.min,
                max: r.max,
                count: r.count,
            })
            .collect();
        ranges.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        ranges.truncate(self.size);

        let reported: u64 = ranges.iter().map(|r| r.count).sum();
        FacetResult {
            field: self.field.clone(),
            total: self.total,
            missing: self.missing,
            other: self.total - reported,
            terms: Vec::new(),
            numeric_ranges: ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::numeric_terms;

    #[test]
    fn test_terms_facet() {
        let mut facet = TermsFacetBuilder::new("tag", 2);
        let docs: [&[&str]; 4] = [&["a", "b"], &["a"], &[], &["c", "a", "b"]];
        for tags in docs {
            facet.start_doc();
            for tag in tags {
                facet.update_visitor("tag", tag.as_bytes());
                facet.update_visitor("other", b"noise");
            }
            facet.end_doc();
        }

        let result = facet.result();
        assert_eq!(result.total, 6);
        assert_eq!(result.missing, 1);
        assert_eq!(
            result.terms,
            vec![
                TermFacet {
                    term: "a".to_string(),
                    count: 3
                },
                TermFacet {
                    term: "b".to_string(),
                    count: 2
                },
            ]
        );
        assert_eq!(result.other, 1);
    }

    #[test]
    fn test_numeric_facet_uses_full_precision_terms() {
        let mut facet = NumericFacetBuilder::new("price", 10);
        facet.add_range("cheap", None, Some(10.0));
        facet.add_range("mid", Some(10.0), Some(100.0));
        facet.add_range("luxury", Some(100.0), None);

        for price in [1.0, 9.99, 10.0, 50.0, 250.0] {
            facet.start_doc();
            for term in numeric_terms(price, 4).unwrap() {
                facet.update_visitor("price", term.as_bytes());
            }
            facet.end_doc();
        }
        facet.start_doc();
        facet.end_doc();

        let result = facet.result();
        assert_eq!(result.total, 5);
        assert_eq!(result.missing, 1);
        let counts: Vec<(&str, u64)> = result
            .numeric_ranges
            .iter()
            .map(|r| (r.name.as_str(), r.count))
            .collect();
        assert_eq!(counts, vec![("cheap", 2), ("mid", 2), ("luxury", 1)]);
    }

    #[test]
    fn test_facets_builder() {
        let mut builder = FacetsBuilder::new();
        builder.add("tags", Box::new(TermsFacetBuilder::new("tag", 5)));
        builder.add("tags_again", Box::new(TermsFacetBuilder::new("tag", 1)));
        builder.add("prices", Box::new(NumericFacetBuilder::new("price", 5)));
        assert_eq!(
            builder.required_fields(),
            vec!["tag".to_string(), "price".to_string()]
        );

        builder.start_doc();
        builder.update_visitor("tag", b"x");
        builder.end_doc();

        let results = builder.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results["tags"].total, 1);
        assert_eq!(results["prices"].missing, 1);
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut builder = FacetsBuilder::new();
        builder.add("tags", Box::new(TermsFacetBuilder::new("tag", 5)));
        let mut prices = NumericFacetBuilder::new("price", 4);
        prices.add_range("low", None, Some(10.0));
        builder.add("prices", Box::new(prices));

        let run = |builder: &mut FacetsBuilder| {
            builder.start_doc();
            builder.update_visitor("tag", b"x");
            for term in numeric_terms(3.0, 4).unwrap() {
                builder.update_visitor("price", term.as_bytes());
            }
            builder.end_doc();
            builder.results()
        };

        let first = run(&mut builder);
        builder.reset();
        assert_eq!(builder.results()["tags"].total, 0);
        assert!(builder.results()["prices"].numeric_ranges.is_empty());

        let second = run(&mut builder);
        assert_eq!(first, second);
        assert_eq!(second["tags"].terms[0].count, 1);
        assert_eq!(second["prices"].numeric_ranges[0].count, 1);
    }
}
