//! Per-request query state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::SearchResponse;

/// Query strings the legacy stack treats as "no query at all".
pub const EMPTY_QUERIES: [&str; 4] = ["", " ", "*", "*:*"];

/// An immutable snapshot of one executed search: the raw query, its
/// parameters and filters, and the backend response.
///
/// Owned by the caller and passed by reference into every facet operation;
/// nothing in this crate reads query state from ambient scope. Variable-gap
/// recalculation returns a refreshed copy of the date facet section instead
/// of mutating this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    /// The raw query string.
    pub query: String,
    /// Backend parameters the query ran with.
    pub params: BTreeMap<String, String>,
    /// Applied filter queries, in order. A leading `-` negates.
    pub filters: Vec<String>,
    /// The raw backend response.
    pub response: SearchResponse,
}

impl QueryContext {
    /// Create a context for an executed query.
    pub fn new<S: Into<String>>(query: S, response: SearchResponse) -> Self {
        QueryContext {
            query: query.into(),
            params: BTreeMap::new(),
            filters: Vec::new(),
            response,
        }
    }

    /// Set the applied filters.
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Set a backend parameter.
    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Whether a filter fragment is already applied, by exact string match.
    pub fn has_filter(&self, fragment: &str) -> bool {
        self.filters.iter().any(|filter| filter == fragment)
    }

    /// Whether the query string is one of the recognized empty forms.
    pub fn is_empty_query(&self) -> bool {
        EMPTY_QUERIES.contains(&self.query.as_str())
    }
}

/// The caller-visible refinement state: applied filters plus any extra
/// parameters that should survive into refined queries.
///
/// [`with_filter`], [`with_excluded_filter`] and [`without_filter`] return
/// new parameter sets for the presentation layer to build links from;
/// removal matches by exact string equality, not semantic equality.
///
/// [`with_filter`]: RefinementParams::with_filter
/// [`with_excluded_filter`]: RefinementParams::with_excluded_filter
/// [`without_filter`]: RefinementParams::without_filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementParams {
    /// Applied filters, in order.
    pub filters: Vec<String>,
    /// Extra parameters carried through refinement.
    pub extra: BTreeMap<String, String>,
}

impl RefinementParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        RefinementParams::default()
    }

    /// Create a parameter set from the current filters.
    pub fn from_filters(filters: Vec<String>) -> Self {
        RefinementParams {
            filters,
            extra: BTreeMap::new(),
        }
    }

    /// A copy with the filter appended.
    pub fn with_filter(&self, filter: &str) -> RefinementParams {
        let mut next = self.clone();
        next.filters.push(filter.to_string());
        next
    }

    /// A copy with the negated filter appended.
    pub fn with_excluded_filter(&self, filter: &str) -> RefinementParams {
        let mut next = self.clone();
        next.filters.push(format!("-{filter}"));
        next
    }

    /// A copy with every exact occurrence of the filter removed.
    pub fn without_filter(&self, filter: &str) -> RefinementParams {
        let mut next = self.clone();
        next.filters.retain(|existing| existing != filter);
        next
    }
}
