//! Date parsing, span arithmetic, and display formatting for facet buckets.
//!
//! Solr returns date bucket edges as ISO 8601 strings and accepts date-math
//! expressions (`NOW/YEAR-20YEARS`, `+1SECOND`) in range parameters. This
//! module parses the literal forms, maps elapsed spans to histogram gap
//! tokens, and renders dates through the PHP-style display formats the field
//! configuration store carries (`"Y"`, `"M j, Y"`, ...).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::{PalisadeError, Result};

/// Parse a Solr date value into a UTC datetime.
///
/// Accepts full RFC 3339 (`2020-01-01T00:00:00Z`), a datetime without zone
/// designator (treated as UTC), a bare date, and the literal `NOW`. Date-math
/// expressions are not evaluated here; they only ever travel back to the
/// backend verbatim.
pub fn parse_solr_date(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(PalisadeError::query(format!(
        "unparsable date value: {value}"
    )))
}

/// Whole days between two datetimes, truncated.
pub fn days_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    (*to - *from).num_seconds().abs() / 86_400
}

/// Map an elapsed span in days to a Solr date-math gap token.
///
/// The thresholds keep the resulting histogram at roughly 15 buckets no
/// matter how wide the active range is. Spans beyond a thousand-year gap
/// return `None` and the caller leaves the facet unrecalculated.
pub fn gap_for_span(total_days: i64) -> Option<&'static str> {
    if total_days <= 15 {
        Some("+1DAY")
    } else if total_days <= 105 {
        Some("+7DAYS")
    } else if total_days <= 450 {
        Some("+1MONTH")
    } else if total_days <= 5_475 {
        Some("+1YEAR")
    } else if total_days <= 10_950 {
        Some("+2YEARS")
    } else if total_days <= 18_250 {
        Some("+5YEARS")
    } else if total_days <= 54_750 {
        Some("+10YEARS")
    } else if total_days <= 547_500 {
        Some("+100YEARS")
    } else if total_days <= 5_475_000 {
        Some("+1000YEARS")
    } else {
        None
    }
}

/// Map the span of one slider bucket to a human gap label and display format.
///
/// Unlike [`gap_for_span`], these bands produce a label for the presentation
/// layer, not a backend token, and run at finer resolution. Spans that fall
/// between the bands keep the default year format with no label.
pub fn slider_granularity(total_days: i64) -> (Option<&'static str>, &'static str) {
    if total_days < 7 {
        (Some("days"), "M j, Y")
    } else if (7..=28).contains(&total_days) {
        (Some("weeks"), "M j, Y")
    } else if (28..=32).contains(&total_days) {
        (Some("months"), "M Y")
    } else if (360..=370).contains(&total_days) {
        (Some("years"), "Y")
    } else if (720..=740).contains(&total_days) {
        (Some("2 years"), "Y")
    } else if (1_800..=1_850).contains(&total_days) {
        (Some("5 years"), "Y")
    } else if (3_600..=3_700).contains(&total_days) {
        (Some("decades"), "Y")
    } else if (36_000..=37_000).contains(&total_days) {
        (Some("centuries"), "Y")
    } else if (360_000..=370_000).contains(&total_days) {
        (Some("millennia"), "Y")
    } else {
        (None, "Y")
    }
}

/// Render a datetime through a PHP `date()`-style format string.
///
/// Only the tokens the legacy admin screens offer are supported; unknown
/// characters pass through literally and a backslash escapes the next
/// character.
pub fn format_php_date(dt: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            'Y' => out.push_str(&format!("{:04}", dt.year())),
            'y' => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            'm' => out.push_str(&format!("{:02}", dt.month())),
            'n' => out.push_str(&dt.month().to_string()),
            'd' => out.push_str(&format!("{:02}", dt.day())),
            'j' => out.push_str(&dt.day().to_string()),
            'M' => out.push_str(&dt.format("%b").to_string()),
            'F' => out.push_str(&dt.format("%B").to_string()),
            'D' => out.push_str(&dt.format("%a").to_string()),
            'l' => out.push_str(&dt.format("%A").to_string()),
            'H' => out.push_str(&format!("{:02}", dt.hour())),
            'G' => out.push_str(&dt.hour().to_string()),
            'h' => out.push_str(&format!("{:02}", dt.hour12().1)),
            'g' => out.push_str(&dt.hour12().1.to_string()),
            'i' => out.push_str(&format!("{:02}", dt.minute())),
            's' => out.push_str(&format!("{:02}", dt.second())),
            'a' => out.push_str(if dt.hour12().0 { "pm" } else { "am" }),
            'A' => out.push_str(if dt.hour12().0 { "PM" } else { "AM" }),
            other => out.push(other),
        }
    }
    out
}
