//! Numeric range searches against indexed prefix-coded terms.

mod common;

use halberd::config::SearchConfig;
use halberd::error::{HalberdError, Result};
use halberd::index::memory::{MemoryDocument, MemoryIndex};
use halberd::query::{NumericRangeQuery, Query};
use halberd::search::searcher::{NumericRange, new_numeric_range_searcher};
use halberd::search::{DocumentMatchPool, SearchContext, SearcherOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{CountingReader, catalog, init_logger, matched_ids};

fn search_price(index: &MemoryIndex, range: NumericRange) -> Result<Vec<String>> {
    let config = SearchConfig::default();
    let mut searcher =
        new_numeric_range_searcher(index, &range, "price", 1.0, SearcherOptions::default(), &config)?;
    let mut ctx = SearchContext::new(DocumentMatchPool::new(
        searcher.document_match_pool_size(),
        1,
    ));
    let ids = matched_ids(searcher.as_mut(), index, &mut ctx)?;
    searcher.close()?;
    Ok(ids)
}

#[test]
fn test_half_open_range_across_zero() -> Result<()> {
    init_logger();
    let index = catalog()?;
    // prices: p1=-5 p2=-1 p3=0 p4=4 p5=5 p6=6
    let ids = search_price(&index, NumericRange::new(Some(-5.0), Some(5.0)))?;
    assert_eq!(ids, vec!["p1", "p2", "p3", "p4"]);
    Ok(())
}

#[test]
fn test_inclusive_flags() -> Result<()> {
    init_logger();
    let index = catalog()?;

    let ids = search_price(
        &index,
        NumericRange::new(Some(-5.0), Some(5.0))
            .inclusive_min(false)
            .inclusive_max(true),
    )?;
    assert_eq!(ids, vec!["p2", "p3", "p4", "p5"]);

    let ids = search_price(
        &index,
        NumericRange::new(Some(4.0), Some(4.0)).inclusive_max(true),
    )?;
    assert_eq!(ids, vec!["p4"]);

    let ids = search_price(&index, NumericRange::new(Some(4.0), Some(4.0)))?;
    assert!(ids.is_empty());
    Ok(())
}

#[test]
fn test_open_bounds() -> Result<()> {
    init_logger();
    let index = catalog()?;

    let ids = search_price(&index, NumericRange::new(None, Some(0.0)))?;
    assert_eq!(ids, vec!["p1", "p2"]);

    let ids = search_price(&index, NumericRange::new(Some(6.0), None))?;
    assert_eq!(ids, vec!["p6", "p7", "p8"]);
    Ok(())
}

#[test]
fn test_matches_brute_force() -> Result<()> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(42);

    for step in [4u32, 8] {
        let values: Vec<f64> = (0..120)
            .map(|_| rng.random_range(-100_000i64..100_000) as f64 / 100.0)
            .collect();

        let mut builder = MemoryIndex::builder().precision_step(step);
        for (i, value) in values.iter().enumerate() {
            builder = builder.add(MemoryDocument::new(format!("v{i}")).with_number("n", *value));
        }
        let index = builder.build()?;
        let config = SearchConfig::builder().numeric_precision_step(step).build()?;

        for _ in 0..25 {
            let a = rng.random_range(-110_000i64..110_000) as f64 / 100.0;
            let b = rng.random_range(-110_000i64..110_000) as f64 / 100.0;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let min = rng.random_bool(0.9).then_some(lo);
            let max = rng.random_bool(0.9).then_some(hi);
            let range = NumericRange::new(min, max)
                .inclusive_min(rng.random_bool(0.5))
                .inclusive_max(rng.random_bool(0.5));

            let expected: Vec<String> = values
                .iter()
                .enumerate()
                .filter(|&(_, &v)| {
                    let above = match range.min {
                        None => true,
                        Some(m) if range.inclusive_min => v >= m,
                        Some(m) => v > m,
                    };
                    let below = match range.max {
                        None => true,
                        Some(m) if range.inclusive_max => v <= m,
                        Some(m) => v < m,
                    };
                    above && below
                })
                .map(|(i, _)| format!("v{i}"))
                .collect();

            let mut searcher = new_numeric_range_searcher(
                &index,
                &range,
                "n",
                1.0,
                SearcherOptions::default(),
                &config,
            )?;
            let mut ctx = SearchContext::new(DocumentMatchPool::new(
                searcher.document_match_pool_size(),
                1,
            ));
            let got = matched_ids(searcher.as_mut(), &index, &mut ctx)?;
            searcher.close()?;
            assert_eq!(got, expected, "step {step}, range {range:?}");
        }
    }
    Ok(())
}

#[test]
fn test_clause_overflow_opens_nothing() -> Result<()> {
    init_logger();
    let reader = CountingReader::new(catalog()?);
    let config = SearchConfig::builder().max_clause_count(3).build()?;

    let err = new_numeric_range_searcher(
        &reader,
        &NumericRange::new(Some(-5.0), Some(5.0)),
        "price",
        1.0,
        SearcherOptions::default(),
        &config,
    )
    .unwrap_err();

    match err {
        HalberdError::TooManyClauses { count, max } => {
            assert!(count > 3);
            assert_eq!(max, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(reader.postings_calls(), 0);
    Ok(())
}

#[test]
fn test_query_through_trait_object() -> Result<()> {
    init_logger();
    let index = catalog()?;
    let query: Box<dyn Query> = Box::new(
        NumericRangeQuery::new("price", NumericRange::new(Some(10.0), None)).with_boost(2.0),
    );
    query.validate()?;
    assert_eq!(query.description(), "price:[10, *)");

    let copy = query.clone();
    let mut searcher = copy.searcher(&index, SearcherOptions::default(), &SearchConfig::default())?;
    let mut ctx = SearchContext::new(DocumentMatchPool::new(
        searcher.document_match_pool_size(),
        1,
    ));
    let ids = matched_ids(searcher.as_mut(), &index, &mut ctx)?;
    searcher.close()?;
    assert_eq!(ids, vec!["p7", "p8"]);
    Ok(())
}

#[test]
fn test_query_from_json() -> Result<()> {
    init_logger();
    let query: NumericRangeQuery = serde_json::from_str(
        r#"{"field": "price", "min": 0, "max": 5, "inclusive_max": true, "boost": 0.5}"#,
    )?;
    assert_eq!(query.boost(), 0.5);
    assert!(query.range().inclusive_max);

    let index = catalog()?;
    let mut searcher = query.searcher(&index, SearcherOptions::default(), &SearchConfig::default())?;
    let mut ctx = SearchContext::new(DocumentMatchPool::new(0, 1));
    let ids = matched_ids(searcher.as_mut(), &index, &mut ctx)?;
    searcher.close()?;
    assert_eq!(ids, vec!["p3", "p4", "p5"]);
    Ok(())
}
