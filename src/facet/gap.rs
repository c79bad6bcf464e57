//! Variable gap recalculation for date histogram facets.
//!
//! When a date facet is configured for a variable gap, the histogram bucket
//! width follows the currently active range filters instead of the fixed
//! configuration: a user narrowing from twenty years to two months should
//! see weekly buckets, not a single year bucket. The recalculation reads the
//! active bounds, picks a gap token that keeps the bucket count near
//! fifteen, and refreshes all affected date facets in one extra backend
//! call.

use std::collections::{BTreeMap, HashMap};

use ahash::AHashSet;

use crate::backend::{RangeFacet, SearchBackend, SearchRequest, Sort, SortOrder};
use crate::datemath::{gap_for_span, parse_solr_date};
use crate::error::{PalisadeError, Result};
use crate::query::filter::{parse_range, split_field_value};
use crate::query::QueryContext;

/// The outcome of one recalculation pass.
///
/// The refreshed facets are a copy; the caller's [`QueryContext`] is never
/// mutated.
#[derive(Debug, Clone, Default)]
pub struct GapRecalculation {
    /// Date facet sections to use for this pass, refreshed where needed.
    pub date_facets: HashMap<String, RangeFacet>,
    /// Fields whose histogram was recomputed. Slider preparation keeps the
    /// empty edge buckets of these fields.
    pub refreshed: AHashSet<String>,
    /// The per-field date range parameters sent with the refresh query.
    pub params: BTreeMap<String, String>,
}

/// Recalculate date histogram parameters for every variable-gap field with
/// an active positive range filter, and refresh the affected facets with a
/// single facet-only backend query.
///
/// Wildcard bounds are discovered through one-row sorted queries. A field
/// whose discovered range collapses (`from >= to`) keeps its original,
/// non-recalculated buckets. A failing refresh query propagates; stale
/// buckets are never silently rendered as recalculated ones.
pub fn recalculate<B: SearchBackend + ?Sized>(
    backend: &B,
    ctx: &QueryContext,
    variable_fields: &AHashSet<String>,
) -> Result<GapRecalculation> {
    let mut params = ctx.params.clone();
    // The refresh only needs the date facet sections.
    params.remove("facet.field");

    let mut refreshed = AHashSet::new();
    for field in ctx.response.facets.dates.keys() {
        if !variable_fields.contains(field) {
            continue;
        }
        let Some((from, to)) = active_range(backend, ctx, field)? else {
            continue;
        };
        let (from_dt, to_dt) = match (parse_solr_date(&from), parse_solr_date(&to)) {
            (Ok(from_dt), Ok(to_dt)) => (from_dt, to_dt),
            _ => continue,
        };
        if from_dt >= to_dt {
            // Collapsed range: leave this facet on its original buckets.
            continue;
        }
        let total_days = (to_dt - from_dt).num_seconds() / 86_400;
        let Some(gap) = gap_for_span(total_days) else {
            continue;
        };

        let mut from = from;
        // A midnight lower bound would be re-counted into the first bucket
        // on every pass; shifting it back one second on each recalculation
        // would instead eat seconds filter after filter, so the shift is
        // expressed in date-math and only for exact midnights.
        if from.contains("00:00:00") {
            from.push_str("-1SECOND");
        }

        params.insert(format!("f.{field}.facet.date.start"), from);
        params.insert(format!("f.{field}.facet.date.end"), to);
        params.insert(format!("f.{field}.facet.date.gap"), gap.to_string());
        refreshed.insert(field.clone());
    }

    let mut date_facets = ctx.response.facets.dates.clone();
    if !refreshed.is_empty() {
        // One batched call regardless of how many fields were recalculated.
        let request = SearchRequest {
            query: ctx.query.clone(),
            filters: ctx.filters.clone(),
            params: params.clone(),
            limit: 0,
            start: 0,
            sort: None,
            timeout: None,
        };
        let response = backend.execute(&request)?;
        date_facets = response.facets.dates;
    }

    Ok(GapRecalculation {
        date_facets,
        refreshed,
        params,
    })
}

/// The tightest active range for a field: maximum `from`, minimum `to`
/// across all positive range filters naming it. Wildcard bounds resolve to
/// actual data extremes.
fn active_range<B: SearchBackend + ?Sized>(
    backend: &B,
    ctx: &QueryContext,
    field: &str,
) -> Result<Option<(String, String)>> {
    let mut froms: Vec<(i64, String)> = Vec::new();
    let mut tos: Vec<(i64, String)> = Vec::new();

    for filter in &ctx.filters {
        // Excluded ranges are left out of the calculation.
        if filter.starts_with('-') || !filter.contains(field) {
            continue;
        }
        let Some((filter_field, value)) = split_field_value(filter) else {
            continue;
        };
        if filter_field.trim_start_matches('-').trim() != field {
            continue;
        }
        let Some(bounds) = parse_range(value.trim_matches('"')) else {
            continue;
        };
        let from = if bounds.from.contains('*') {
            find_bound(backend, ctx, field, SortOrder::Asc)?
        } else {
            bounds.from
        };
        let to = if bounds.to.contains('*') {
            find_bound(backend, ctx, field, SortOrder::Desc)?
        } else {
            bounds.to
        };
        let (Ok(from_dt), Ok(to_dt)) = (parse_solr_date(&from), parse_solr_date(&to)) else {
            continue;
        };
        froms.push((from_dt.timestamp(), from));
        tos.push((to_dt.timestamp(), to));
    }

    let from = froms.into_iter().max_by_key(|(ts, _)| *ts);
    let to = tos.into_iter().min_by_key(|(ts, _)| *ts);
    match (from, to) {
        (Some((_, from)), Some((_, to))) => Ok(Some((from, to))),
        _ => Ok(None),
    }
}

/// Discover the effective bound behind a wildcard with a one-row sorted
/// query against the current query and filters.
fn find_bound<B: SearchBackend + ?Sized>(
    backend: &B,
    ctx: &QueryContext,
    field: &str,
    order: SortOrder,
) -> Result<String> {
    let mut params = ctx.params.clone();
    params.remove("facet.field");

    let request = SearchRequest {
        query: ctx.query.clone(),
        filters: ctx.filters.clone(),
        params,
        limit: 1,
        start: 0,
        sort: Some(Sort::new(field, order)),
        timeout: None,
    };
    let response = backend.execute(&request)?;
    response
        .documents
        .first()
        .and_then(|doc| doc.str_value(field))
        .map(str::to_string)
        .ok_or_else(|| {
            PalisadeError::backend(format!(
                "no documents to discover the {} bound of {field}",
                order.as_str()
            ))
        })
}
