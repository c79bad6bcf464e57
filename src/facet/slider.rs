//! Range slider series preparation for date histogram facets.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::backend::RangeFacet;
use crate::config::FieldSettings;
use crate::datemath::{days_between, format_php_date, parse_solr_date, slider_granularity};

/// One slider point: a bucket edge and its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderPoint {
    /// The raw bucket edge value.
    pub date: String,
    /// The formatted display label for this edge.
    pub label: String,
    /// Documents in the bucket starting at this edge; `None` marks the
    /// synthetic end point closing the last bucket.
    pub count: Option<u64>,
}

/// A slider-ready series for one date facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderSeries {
    /// The facet field.
    pub field: String,
    /// Ordered points, ending with the synthetic end marker.
    pub points: Vec<SliderPoint>,
    /// Human label for the bucket width, when the span falls on a known
    /// band.
    pub gap_label: Option<String>,
    /// PHP-style display format chosen from the bucket span.
    pub date_format: String,
    /// Configured slider color.
    pub color: String,
}

/// Build a slider series from a date facet.
///
/// When `keep_edges` is false (no recalculation happened for this field),
/// contiguous zero-count buckets are trimmed from both ends: they are noise
/// from the configured default range. When it is true the facet was just
/// recalculated from the active filters, so empty edges reflect genuine
/// exhaustion of the range and stay visible.
///
/// Returns `None` when fewer than two points remain; a slider needs a
/// range.
pub fn build(
    field: &str,
    facet: &RangeFacet,
    settings: &FieldSettings,
    keep_edges: bool,
) -> Option<SliderSeries> {
    let end_value = facet.end.clone()?;
    let mut points: Vec<(String, Option<u64>)> = facet
        .counts
        .iter()
        .map(|(edge, count)| (edge.clone(), Some(*count)))
        .collect();

    if keep_edges {
        points.push((end_value, None));
    } else {
        while points.first().is_some_and(|(_, count)| *count == Some(0)) {
            points.remove(0);
        }
        let mut trimmed_end = None;
        while points.last().is_some_and(|(_, count)| *count == Some(0)) {
            trimmed_end = points.pop().map(|(edge, _)| edge);
        }
        // The series closes at the first trimmed empty bucket, or at the
        // facet's declared end when nothing was trimmed.
        points.push((trimmed_end.unwrap_or(end_value), None));
    }

    if points.len() <= 1 {
        return None;
    }

    let from = parse_solr_date(&points[0].0).ok()?;
    let to = parse_solr_date(&points[1].0).ok()?;
    let (gap_label, date_format) = slider_granularity(days_between(&from, &to));

    let points = points
        .into_iter()
        .map(|(date, count)| {
            // Labels shift one second past the edge so midnight boundaries
            // display inside the bucket they open.
            let label = match parse_solr_date(&date) {
                Ok(dt) => format_php_date(&(dt + Duration::seconds(1)), date_format),
                Err(_) => date.clone(),
            };
            SliderPoint { date, label, count }
        })
        .collect();

    Some(SliderSeries {
        field: field.to_string(),
        points,
        gap_label: gap_label.map(str::to_string),
        date_format: date_format.to_string(),
        color: settings.slider_color.clone(),
    })
}
