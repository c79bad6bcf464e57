//! Integration tests for the facet processing pipeline.

use std::cell::RefCell;

use serde_json::json;

use palisade::backend::{
    Document, RangeFacet, SearchBackend, SearchRequest, SearchResponse,
};
use palisade::config::{FieldSettings, FieldType, StaticFieldConfig};
use palisade::error::{PalisadeError, Result};
use palisade::facet::{FacetKind, FacetPipeline};
use palisade::query::QueryContext;

/// Backend double: replays canned responses in order and records every
/// request.
struct MockBackend {
    responses: RefCell<Vec<SearchResponse>>,
    requests: RefCell<Vec<SearchRequest>>,
}

impl MockBackend {
    fn new(responses: Vec<SearchResponse>) -> Self {
        MockBackend {
            responses: RefCell::new(responses),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl SearchBackend for MockBackend {
    fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests.borrow_mut().push(request.clone());
        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            Err(PalisadeError::backend("no canned response left"))
        } else {
            Ok(responses.remove(0))
        }
    }
}

fn genre_counts() -> Vec<(String, u64)> {
    vec![
        ("Fiction".to_string(), 5),
        ("Poetry".to_string(), 3),
        ("Drama".to_string(), 1),
        ("Essays".to_string(), 0),
    ]
}

fn date_facet() -> RangeFacet {
    RangeFacet::from_entries(vec![
        ("2020-01-01T00:00:00Z".to_string(), json!(5)),
        ("2021-01-01T00:00:00Z".to_string(), json!(3)),
        ("gap".to_string(), json!("+1YEAR")),
        ("end".to_string(), json!("2022-01-01T00:00:00Z")),
    ])
}

#[test]
fn test_end_to_end_field_and_date_facets() -> Result<()> {
    let store = StaticFieldConfig::new()
        .add(
            FieldType::FacetFields,
            FieldSettings::new("genre").with_label("Genre"),
        )
        .add(
            FieldType::FacetFields,
            FieldSettings::new("date_dt").with_date_format("Y"),
        );
    let backend = MockBackend::new(vec![]);

    let mut response = SearchResponse::default();
    response.facets.fields.insert("genre".to_string(), genre_counts());
    response.facets.dates.insert("date_dt".to_string(), date_facet());
    let ctx = QueryContext::new("*:*", response);

    let pipeline = FacetPipeline::new(&backend, &store);
    let facets = pipeline.process(&ctx)?;

    assert_eq!(facets.len(), 2);
    assert_eq!(facets[0].field, "genre");
    assert_eq!(facets[0].label, "Genre");
    assert_eq!(facets[0].kind, FacetKind::Field);
    // The zero-count bucket is excluded by the default minimum count.
    assert_eq!(facets[0].buckets.len(), 3);
    assert_eq!(facets[0].buckets[0].filter, "genre:\"Fiction\"");

    let date = &facets[1];
    assert_eq!(date.kind, FacetKind::LegacyDate);
    assert_eq!(date.buckets.len(), 2);
    assert_eq!(
        date.buckets[0].filter,
        "date_dt:[2020-01-01T00:00:00Z TO 2021-01-01T00:00:00Z]"
    );
    assert_eq!(date.buckets[0].label, "2020 - 2021");
    assert_eq!(date.buckets[0].count, 5);
    assert_eq!(date.buckets[1].label, "2021 - 2022");
    assert_eq!(date.buckets[1].count, 3);

    // No variable-gap fields, no label substitution: no backend calls.
    assert_eq!(backend.request_count(), 0);
    Ok(())
}

#[test]
fn test_minimum_count_and_active_exclusion() -> Result<()> {
    let store = StaticFieldConfig::new().add(FieldType::FacetFields, FieldSettings::new("genre"));
    let backend = MockBackend::new(vec![]);

    let mut response = SearchResponse::default();
    response.facets.fields.insert("genre".to_string(), genre_counts());
    let ctx = QueryContext::new("*:*", response)
        .with_filters(vec!["genre:\"Fiction\"".to_string()]);

    let pipeline = FacetPipeline::new(&backend, &store).with_minimum_count(2);
    let facets = pipeline.process(&ctx)?;

    // Fiction is active, Drama and Essays fall below the minimum.
    assert_eq!(facets[0].buckets.len(), 1);
    assert_eq!(facets[0].buckets[0].raw_value, "Poetry");

    let raw_total: u64 = genre_counts().iter().map(|(_, c)| c).sum();
    let output_total: u64 = facets[0].buckets.iter().map(|b| b.count).sum();
    assert!(output_total <= raw_total);
    Ok(())
}

#[test]
fn test_soft_limit_splits_buckets() -> Result<()> {
    let store = StaticFieldConfig::new().add(FieldType::FacetFields, FieldSettings::new("genre"));
    let backend = MockBackend::new(vec![]);

    let counts: Vec<(String, u64)> = (0..7).map(|i| (format!("value{i}"), 7 - i)).collect();
    let mut response = SearchResponse::default();
    response.facets.fields.insert("genre".to_string(), counts);
    let ctx = QueryContext::new("*:*", response);

    let pipeline = FacetPipeline::new(&backend, &store).with_soft_limit(5);
    let facets = pipeline.process(&ctx)?;

    assert_eq!(facets[0].soft_limit, Some(5));
    assert_eq!(facets[0].visible_buckets().len(), 5);
    assert_eq!(facets[0].hidden_buckets().len(), 2);

    // Under the limit, no split.
    let pipeline = FacetPipeline::new(&backend, &store).with_soft_limit(10);
    let facets = pipeline.process(&ctx)?;
    assert_eq!(facets[0].soft_limit, None);
    assert_eq!(facets[0].hidden_buckets().len(), 0);
    Ok(())
}

#[test]
fn test_processing_is_idempotent() -> Result<()> {
    let store = StaticFieldConfig::new()
        .add(FieldType::FacetFields, FieldSettings::new("genre"))
        .add(
            FieldType::FacetFields,
            FieldSettings::new("date_dt").with_date_format("Y"),
        );
    let backend = MockBackend::new(vec![]);

    let mut response = SearchResponse::default();
    response.facets.fields.insert("genre".to_string(), genre_counts());
    response.facets.dates.insert("date_dt".to_string(), date_facet());
    let ctx = QueryContext::new("*:*", response);

    let pipeline = FacetPipeline::new(&backend, &store);
    let first = pipeline.process(&ctx)?;
    let second = pipeline.process(&ctx)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_variable_gap_refresh_feeds_the_slider() -> Result<()> {
    let store = StaticFieldConfig::new().add(
        FieldType::FacetFields,
        FieldSettings::new("date_dt")
            .with_variable_gap()
            .with_slider(),
    );

    // The refresh returns a recalculated histogram with empty edges.
    let mut refreshed = SearchResponse::default();
    refreshed.facets.dates.insert(
        "date_dt".to_string(),
        RangeFacet::from_entries(vec![
            ("2020-01-01T00:00:00Z".to_string(), json!(0)),
            ("2020-01-08T00:00:00Z".to_string(), json!(4)),
            ("2020-01-15T00:00:00Z".to_string(), json!(0)),
            ("end".to_string(), json!("2020-01-22T00:00:00Z")),
        ]),
    );
    let backend = MockBackend::new(vec![refreshed]);

    let mut response = SearchResponse::default();
    response.facets.dates.insert("date_dt".to_string(), date_facet());
    let ctx = QueryContext::new("*:*", response).with_filters(vec![
        "date_dt:[2020-01-01T00:00:00Z TO 2020-03-01T00:00:00Z]".to_string(),
    ]);

    let pipeline = FacetPipeline::new(&backend, &store);
    let facets = pipeline.process(&ctx)?;

    // Exactly one extra, facet-only backend call.
    assert_eq!(backend.request_count(), 1);
    let requests = backend.requests.borrow();
    assert_eq!(requests[0].limit, 0);
    assert_eq!(
        requests[0].params.get("f.date_dt.facet.date.gap").map(String::as_str),
        Some("+7DAYS")
    );
    assert_eq!(
        requests[0]
            .params
            .get("f.date_dt.facet.date.start")
            .map(String::as_str),
        Some("2020-01-01T00:00:00Z-1SECOND")
    );

    // The slider uses the refreshed histogram and keeps its empty edges.
    let series = facets[0].slider.as_ref().expect("slider series");
    let counts: Vec<Option<u64>> = series.points.iter().map(|p| p.count).collect();
    assert_eq!(counts, vec![Some(0), Some(4), Some(0), None]);
    assert_eq!(series.gap_label.as_deref(), Some("weeks"));
    Ok(())
}

#[test]
fn test_refresh_failure_propagates() {
    let store = StaticFieldConfig::new().add(
        FieldType::FacetFields,
        FieldSettings::new("date_dt").with_variable_gap(),
    );
    // No canned response for the refresh query.
    let backend = MockBackend::new(vec![]);

    let mut response = SearchResponse::default();
    response.facets.dates.insert("date_dt".to_string(), date_facet());
    let ctx = QueryContext::new("*:*", response).with_filters(vec![
        "date_dt:[2020-01-01T00:00:00Z TO 2020-03-01T00:00:00Z]".to_string(),
    ]);

    let pipeline = FacetPipeline::new(&backend, &store);
    let result = pipeline.process(&ctx);
    assert!(matches!(result, Err(PalisadeError::Backend(_))));
}

#[test]
fn test_pid_label_substitution_and_fallback() -> Result<()> {
    use palisade::facet::LabelResolver;

    struct Repository;
    impl LabelResolver for Repository {
        fn resolve(&self, pid: &str) -> Option<String> {
            (pid == "islandora:2").then(|| "Loaded Object".to_string())
        }
    }

    let store = StaticFieldConfig::new().add(
        FieldType::FacetFields,
        FieldSettings::new("collection").with_pid_to_label(),
    );

    let mut lookup_response = SearchResponse::default();
    lookup_response.num_found = 1;
    lookup_response.documents.push(
        Document::new()
            .with_field("PID", "islandora:1")
            .with_field("object_label", "Indexed Object"),
    );
    let backend = MockBackend::new(vec![lookup_response]);

    let mut response = SearchResponse::default();
    response.facets.fields.insert(
        "collection".to_string(),
        vec![
            ("info:fedora/islandora:1".to_string(), 9),
            ("islandora:2".to_string(), 4),
            ("islandora:3".to_string(), 2),
        ],
    );
    let ctx = QueryContext::new("*:*", response);

    let repository = Repository;
    let pipeline = FacetPipeline::new(&backend, &store).with_label_fallback(&repository);
    let facets = pipeline.process(&ctx)?;

    let labels: Vec<&str> = facets[0].buckets.iter().map(|b| b.label.as_str()).collect();
    // Batch lookup, fallback lookup, raw value in that order of preference.
    assert_eq!(labels, vec!["Indexed Object", "Loaded Object", "islandora:3"]);

    // One batched lookup query for all candidates.
    assert_eq!(backend.request_count(), 1);
    let requests = backend.requests.borrow();
    assert!(requests[0].query.starts_with("PID:("));
    assert_eq!(requests[0].params.get("facet").map(String::as_str), Some("false"));
    assert_eq!(requests[0].limit, 3);
    Ok(())
}

#[test]
fn test_numeric_range_facets_are_skipped() -> Result<()> {
    let store = StaticFieldConfig::new()
        .add(FieldType::FacetFields, FieldSettings::new("pages_i"))
        .add(
            FieldType::FacetFields,
            FieldSettings::new("issued_dt").with_date_format("Y"),
        );
    let backend = MockBackend::new(vec![]);

    let mut response = SearchResponse::default();
    response.facets.ranges.insert(
        "pages_i".to_string(),
        RangeFacet::from_entries(vec![
            ("0".to_string(), json!(4)),
            ("end".to_string(), json!("100")),
        ]),
    );
    response.facets.ranges.insert("issued_dt".to_string(), date_facet());
    let ctx = QueryContext::new("*:*", response);

    let pipeline =
        FacetPipeline::new(&backend, &store).with_date_fields(["issued_dt"]);
    let facets = pipeline.process(&ctx)?;

    // Only the date range renders; the numeric range has no form yet.
    assert_eq!(facets.len(), 1);
    assert_eq!(facets[0].field, "issued_dt");
    assert_eq!(facets[0].kind, FacetKind::Range);
    assert_eq!(facets[0].buckets[0].label, "2020 - 2021");
    Ok(())
}
