//! Filter-query string parsing.
//!
//! Filters arrive as raw backend syntax (`field:"value"`,
//! `-date_dt:[2020-01-01T00:00:00Z TO NOW]`, compound boolean clauses) and
//! are taken apart here for display formatting and gap recalculation.

use serde::{Deserialize, Serialize};

use crate::error::{PalisadeError, Result};

/// A filter split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFilter {
    /// The field the filter applies to, without the negation prefix.
    pub field: String,
    /// The raw value part, quoting intact.
    pub value: String,
    /// Whether the filter excludes rather than includes.
    pub negated: bool,
}

/// The bounds of a `[from TO to]` range value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    /// Lower bound, possibly `*` or a date-math expression.
    pub from: String,
    /// Upper bound.
    pub to: String,
}

/// Split `field:value` on the first unescaped colon.
pub fn split_field_value(filter: &str) -> Option<(&str, &str)> {
    let bytes = filter.as_bytes();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b':' => return Some((&filter[..i], &filter[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Parse a single `field:value` filter, handling the negation prefix.
pub fn parse_filter(raw: &str) -> Result<ParsedFilter> {
    let negated = raw.starts_with('-');
    let (field, value) = split_field_value(raw)
        .ok_or_else(|| PalisadeError::query(format!("filter has no field part: {raw}")))?;
    Ok(ParsedFilter {
        field: field.trim_start_matches('-').trim().to_string(),
        value: value.to_string(),
        negated,
    })
}

/// Parse a `[from TO to]` range value. Quotes and brackets are trimmed.
pub fn parse_range(value: &str) -> Option<RangeBounds> {
    let inner = value.trim().trim_matches('"').trim_start_matches('[').trim_end_matches(']');
    let (from, to) = inner.split_once(" TO ")?;
    Some(RangeBounds {
        from: from.trim().to_string(),
        to: to.trim().to_string(),
    })
}

/// Split a query string on spaces that fall outside double quotes.
pub fn split_outside_quotes(query: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in query.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
