//! Search backend abstraction and the raw faceted response model.
//!
//! Palisade never talks a wire protocol itself: the consumer supplies an
//! implementation of [`SearchBackend`] that executes a Solr-style query and
//! returns documents plus the three facet sections. The pipeline issues at
//! most two extra calls per pass through this trait (bound discovery and the
//! batched variable-gap refresh).

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Metadata keys Solr mixes into date/range facet sections next to the
/// bucket counts.
pub const SENTINEL_KEYS: [&str; 6] = ["gap", "start", "end", "other", "hardend", "include"];

/// Sort direction for a backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// The wire representation of this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A sort clause for a backend query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl Sort {
    /// Create a new sort clause.
    pub fn new<S: Into<String>>(field: S, order: SortOrder) -> Self {
        Sort {
            field: field.into(),
            order,
        }
    }
}

/// One backend query: the main search plus any number of auxiliary calls the
/// facet pipeline issues share this shape.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// The raw query string.
    pub query: String,
    /// Filter queries, applied conjunctively. A leading `-` negates.
    pub filters: Vec<String>,
    /// Additional backend parameters (facet toggles, per-field date ranges,
    /// field lists, ...).
    pub params: BTreeMap<String, String>,
    /// Maximum number of documents to return. Zero requests facet counts
    /// only.
    pub limit: usize,
    /// Result offset.
    pub start: usize,
    /// Optional sort clause.
    pub sort: Option<Sort>,
    /// Caller-supplied deadline for the backend call.
    pub timeout: Option<Duration>,
}

impl SearchRequest {
    /// Create a request for the given query string.
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchRequest {
            query: query.into(),
            ..SearchRequest::default()
        }
    }

    /// Set the filter queries.
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Set a backend parameter.
    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the document limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the sort clause.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A single result document as loosely-typed field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Field name to value. Multi-valued fields arrive as JSON arrays.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document::default()
    }

    /// Set a string field value.
    pub fn with_field<K: Into<String>, V: Into<String>>(mut self, field: K, value: V) -> Self {
        self.fields
            .insert(field.into(), Value::String(value.into()));
        self
    }

    /// Get a field as a string, taking the first entry of a multi-valued
    /// field.
    pub fn str_value(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s),
            Value::Array(values) => values.iter().find_map(|v| v.as_str()),
            _ => None,
        }
    }
}

/// A date or numeric range facet section: ordered bucket edges plus the
/// metadata Solr reports alongside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFacet {
    /// Bucket lower edges and their counts, in backend order.
    pub counts: Vec<(String, u64)>,
    /// Bucket width in date-math syntax.
    pub gap: Option<String>,
    /// Lower bound of the whole histogram.
    pub start: Option<String>,
    /// Exclusive upper bound of the last bucket.
    pub end: Option<String>,
}

impl RangeFacet {
    /// Build a range facet from raw response entries, splitting the sentinel
    /// metadata keys out of the bucket list.
    pub fn from_entries(entries: Vec<(String, Value)>) -> Self {
        let mut facet = RangeFacet::default();
        for (key, value) in entries {
            match key.as_str() {
                "gap" => facet.gap = value.as_str().map(str::to_string),
                "start" => facet.start = value.as_str().map(str::to_string),
                "end" => facet.end = value.as_str().map(str::to_string),
                key if SENTINEL_KEYS.contains(&key) => {}
                _ => {
                    if let Some(count) = value.as_u64() {
                        facet.counts.push((key, count));
                    }
                }
            }
        }
        facet
    }
}

/// All facet sections of one backend response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    /// Discrete field facets: field name to ordered value/count pairs.
    pub fields: HashMap<String, Vec<(String, u64)>>,
    /// Legacy date facets (Solr 1.4 `facet_dates`).
    pub dates: HashMap<String, RangeFacet>,
    /// Date or numeric range facets (Solr 3.1 `facet_ranges`).
    pub ranges: HashMap<String, RangeFacet>,
}

/// A backend query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching documents.
    pub num_found: u64,
    /// Offset of the first returned document.
    pub start: u64,
    /// Returned documents.
    pub documents: Vec<Document>,
    /// Facet sections.
    pub facets: FacetCounts,
}

/// A search backend that executes Solr-style queries.
///
/// Implementations must support faceting on arbitrary fields, date-math
/// range expressions in filter values, single-row sorted queries for
/// min/max discovery, and a facet-only mode (`limit == 0`) that still
/// returns facet counts. Retry and backoff, if any, belong to the
/// implementation; this crate issues each call exactly once.
pub trait SearchBackend {
    /// Execute a query and return documents plus facet counts.
    fn execute(&self, request: &SearchRequest) -> Result<SearchResponse>;
}
