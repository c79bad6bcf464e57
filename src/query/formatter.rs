//! Human-readable formatting of raw filter and query strings.
//!
//! Breadcrumbs and "current query" displays show the user what they have
//! refined by, so raw backend syntax (`date_dt:[... TO ...]`,
//! `genre:("Fiction")`, compound boolean filters) is folded back into plain
//! values here. Building the add/remove filter parameter variants lives on
//! [`RefinementParams`](crate::query::RefinementParams).

use ahash::{AHashMap, AHashSet};
use chrono::Duration;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::FieldSettings;
use crate::datemath::{format_php_date, parse_solr_date};
use crate::facet::labels::LabelResolver;
use crate::query::escape::strip_slashes;
use crate::query::filter::{parse_range, split_field_value, split_outside_quotes};

lazy_static! {
    static ref BOOLEAN_SPLIT: Regex = Regex::new(r" (OR|AND) ").expect("static regex");
}

/// Identifier prefix stripped from displayed values.
const PID_PREFIX: &str = "info:fedora/";

/// A filter taken apart for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// The raw filter string as applied.
    pub raw: String,
    /// The field the filter applies to; empty for compound filters.
    pub field: String,
    /// The human-readable value. Negation is not embedded here; the caller
    /// renders it from `negated`.
    pub value: String,
    /// Whether the filter excludes rather than includes.
    pub negated: bool,
}

/// Formats raw filter strings into human-readable text.
///
/// Built once per rendering pass from the facet field settings; date and
/// range fields get their configured display format applied, fields with
/// label substitution enabled go through the optional [`LabelResolver`].
pub struct FilterFormatter<'a> {
    range_date_formats: AHashMap<String, String>,
    date_formats: AHashMap<String, String>,
    pid_fields: AHashSet<String>,
    labels: Option<&'a dyn LabelResolver>,
}

impl<'a> FilterFormatter<'a> {
    /// Build a formatter from the facet field settings.
    pub fn new(facet_settings: &[FieldSettings]) -> Self {
        let mut range_date_formats = AHashMap::new();
        let mut date_formats = AHashMap::new();
        let mut pid_fields = AHashSet::new();
        for settings in facet_settings {
            if settings.range_facet.enabled {
                range_date_formats.insert(
                    settings.field.clone(),
                    settings.display_date_format().to_string(),
                );
            } else if let Some(format) = settings.date_format.as_deref() {
                if !format.is_empty() {
                    date_formats.insert(settings.field.clone(), format.to_string());
                }
            }
            if settings.pid_to_label {
                pid_fields.insert(settings.field.clone());
            }
        }
        FilterFormatter {
            range_date_formats,
            date_formats,
            pid_fields,
            labels: None,
        }
    }

    /// Attach a label resolver for fields with label substitution enabled.
    pub fn with_labels(mut self, labels: &'a dyn LabelResolver) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Format a raw filter string for breadcrumb or current-query display.
    pub fn format(&self, filter: &str) -> String {
        let clauses: Vec<&str> = BOOLEAN_SPLIT.split(filter).collect();
        if clauses.len() > 1 {
            self.format_compound(filter, &clauses)
        } else {
            self.format_single(filter)
        }
    }

    /// Take a filter apart into a [`FilterDescriptor`].
    pub fn describe(&self, filter: &str) -> FilterDescriptor {
        let negated = filter.starts_with('-');
        let field = if BOOLEAN_SPLIT.is_match(filter) {
            String::new()
        } else {
            split_field_value(filter)
                .map(|(field, _)| field.trim_start_matches('-').to_string())
                .unwrap_or_default()
        };
        FilterDescriptor {
            raw: filter.to_string(),
            field,
            value: self.format(filter),
            negated,
        }
    }

    /// Compound filters keep their boolean operators, in original order,
    /// between the stripped clause values.
    fn format_compound(&self, filter: &str, clauses: &[&str]) -> String {
        let operators: Vec<&str> = BOOLEAN_SPLIT
            .captures_iter(filter)
            .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
            .collect();
        let mut out = String::new();
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(operators.get(i - 1).copied().unwrap_or("AND"));
                out.push(' ');
            }
            let value = split_field_value(clause).map(|(_, v)| v).unwrap_or(clause);
            out.push_str(&display_value(value));
        }
        strip_slashes(out.trim())
    }

    fn format_single(&self, filter: &str) -> String {
        let Some((field_raw, value_raw)) = split_field_value(filter) else {
            return strip_slashes(filter);
        };
        let field = field_raw.trim_start_matches('-');
        let value = value_raw.trim_matches('"');

        if let Some(format) = self.range_date_formats.get(field) {
            if let Some(bounds) = parse_range(value) {
                if let (Ok(from), Ok(to)) = (
                    parse_solr_date(&bounds.from),
                    parse_solr_date(&bounds.to),
                ) {
                    // Same boundary shift as bucket labels: the edges are
                    // exclusive on the display side.
                    let day = Duration::days(1);
                    return format!(
                        "{} - {}",
                        format_php_date(&(from + day), format),
                        format_php_date(&(to + day), format)
                    );
                }
            }
        }
        if let Some(format) = self.date_formats.get(field) {
            if let Ok(dt) = parse_solr_date(&strip_slashes(value)) {
                return format_php_date(&dt, format);
            }
        }

        let display = display_value(value);
        if self.pid_fields.contains(field) {
            if let Some(labels) = self.labels {
                if let Some(label) = labels.resolve(&display) {
                    return label;
                }
            }
        }
        strip_slashes(&display)
    }
}

/// Strip quoting, grouping parentheses, and the identifier prefix from a
/// clause value.
fn display_value(value: &str) -> String {
    value
        .replace(['"', '(', ')'], "")
        .replace(PID_PREFIX, "")
        .trim()
        .to_string()
}

/// Strip field names and grouping from a raw query string for breadcrumb
/// display, keeping only the searched values.
pub fn format_query_display(query: &str) -> String {
    let parts = split_outside_quotes(query);
    let values: Vec<String> = parts
        .iter()
        .map(|part| {
            let value = match split_field_value(part) {
                Some((_, value)) => value.trim(),
                None => part.trim(),
            };
            strip_slashes(&value.replace(['(', ')'], ""))
        })
        .collect();
    values.join(" ")
}

/// Substitute configured human-readable search-field labels into a query
/// string (`field:(` becomes `label:(`).
pub fn humanize_query(query: &str, labels: &[(String, String)]) -> String {
    let mut out = query.to_string();
    for (field, label) in labels {
        out = out.replace(&format!("{field}:("), &format!("{label}:("));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSettings;

    fn formatter_settings() -> Vec<FieldSettings> {
        vec![
            FieldSettings::new("genre"),
            FieldSettings::new("date_dt")
                .with_variable_gap()
                .with_date_format("Y"),
        ]
    }

    #[test]
    fn test_format_single_filter() {
        let settings = formatter_settings();
        let formatter = FilterFormatter::new(&settings);

        assert_eq!(formatter.format("genre:(\"Fiction\")"), "Fiction");
        // Negation stays with the caller.
        assert_eq!(formatter.format("-genre:(\"Fiction\")"), "Fiction");
    }

    #[test]
    fn test_format_compound_filter_preserves_operators() {
        let settings = formatter_settings();
        let formatter = FilterFormatter::new(&settings);

        assert_eq!(
            formatter.format("field1:(A) AND field2:(B)"),
            "A AND B"
        );
        assert_eq!(
            formatter.format("a:(x) OR b:(y) AND c:(z)"),
            "x OR y AND z"
        );
    }

    #[test]
    fn test_format_date_range_filter() {
        let settings = formatter_settings();
        let formatter = FilterFormatter::new(&settings);

        // Display edges shift one day past the stored bucket edges.
        assert_eq!(
            formatter.format("date_dt:[2019-12-31T00:00:00Z TO 2020-12-31T00:00:00Z]"),
            "2020 - 2021"
        );
    }

    #[test]
    fn test_describe() {
        let settings = formatter_settings();
        let formatter = FilterFormatter::new(&settings);

        let descriptor = formatter.describe("-genre:(\"Fiction\")");
        assert!(descriptor.negated);
        assert_eq!(descriptor.field, "genre");
        assert_eq!(descriptor.value, "Fiction");

        let descriptor = formatter.describe("a:(x) AND b:(y)");
        assert_eq!(descriptor.field, "");
        assert_eq!(descriptor.value, "x AND y");
    }

    #[test]
    fn test_format_query_display() {
        assert_eq!(
            format_query_display("dc.title:(cats) AND dc.creator:(finch)"),
            "cats AND finch"
        );
        assert_eq!(format_query_display("plain words"), "plain words");
    }

    #[test]
    fn test_humanize_query() {
        let labels = vec![("dc.title".to_string(), "Title".to_string())];
        assert_eq!(
            humanize_query("dc.title:(cats)", &labels),
            "Title:(cats)"
        );
    }
}
