//! Normalized bucket preparation from raw facet counts.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::backend::RangeFacet;
use crate::config::FieldSettings;
use crate::datemath::{format_php_date, parse_solr_date};
use crate::error::{PalisadeError, Result};
use crate::query::escape::{facet_escape, lesser_escape};
use crate::query::QueryContext;

/// One renderable facet bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// The raw backend value (or range lower edge).
    pub raw_value: String,
    /// Display label; defaults to the raw value unless date formatting,
    /// boolean replacement, or label substitution applied.
    pub label: String,
    /// Matching document count.
    pub count: u64,
    /// Filter-query fragment selecting this bucket.
    pub filter: String,
    /// Whether the current filters already include this fragment.
    pub active: bool,
}

/// Prepare discrete field facet buckets.
///
/// The filter fragment quotes the escaped value; the label applies the
/// field's date format when one is configured for a non-range date field.
pub fn prepare_field_buckets(
    field: &str,
    counts: &[(String, u64)],
    settings: &FieldSettings,
    ctx: &QueryContext,
) -> Vec<Bucket> {
    let date_format = settings
        .date_format
        .as_deref()
        .filter(|format| !format.is_empty());
    counts
        .iter()
        .map(|(value, count)| {
            let filter = format!("{}:\"{}\"", lesser_escape(field), facet_escape(value));
            let label = match date_format {
                Some(format) => match parse_solr_date(value) {
                    Ok(dt) => format_php_date(&dt, format),
                    Err(_) => value.clone(),
                },
                None => value.clone(),
            };
            Bucket {
                raw_value: value.clone(),
                label,
                count: *count,
                active: ctx.has_filter(&filter),
                filter,
            }
        })
        .collect()
}

/// Prepare date histogram buckets from cumulative edges.
///
/// Each edge's upper bound is the next edge in declared order, or the
/// facet's `end` metadata for the last one. Display labels shift both edges
/// one day forward; the backend's range edges are midnight-exclusive on the
/// display side and skipping the shift produces off-by-one-day labels.
pub fn prepare_date_buckets(
    field: &str,
    facet: &RangeFacet,
    settings: &FieldSettings,
    ctx: &QueryContext,
) -> Result<Vec<Bucket>> {
    let format = settings.display_date_format();
    let mut buckets = Vec::with_capacity(facet.counts.len());
    for (i, (edge, count)) in facet.counts.iter().enumerate() {
        let next = match facet.counts.get(i + 1) {
            Some((next_edge, _)) => next_edge.as_str(),
            None => facet.end.as_deref().ok_or_else(|| {
                PalisadeError::facet(format!("date facet for {field} has no end value"))
            })?,
        };
        let filter = format!("{field}:[{edge} TO {next}]");
        let label = match (parse_solr_date(edge), parse_solr_date(next)) {
            (Ok(from), Ok(to)) => {
                let day = Duration::days(1);
                format!(
                    "{} - {}",
                    format_php_date(&(from + day), format),
                    format_php_date(&(to + day), format)
                )
            }
            _ => format!("{edge} - {next}"),
        };
        buckets.push(Bucket {
            raw_value: edge.clone(),
            label,
            count: *count,
            active: ctx.has_filter(&filter),
            filter,
        });
    }
    Ok(buckets)
}

/// Apply configured boolean display replacements in place.
pub fn apply_boolean_replacements(buckets: &mut [Bucket], settings: &FieldSettings) {
    for bucket in buckets {
        let replacement = match bucket.label.as_str() {
            "true" => settings.boolean_replacements.true_text.as_deref(),
            "false" => settings.boolean_replacements.false_text.as_deref(),
            _ => None,
        };
        if let Some(text) = replacement.filter(|text| !text.is_empty()) {
            bucket.label = text.to_string();
        }
    }
}
