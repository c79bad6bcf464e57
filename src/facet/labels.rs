//! Object-label substitution for identifier-valued buckets.
//!
//! Repository fields often facet on object identifiers (optionally prefixed
//! `info:fedora/`), which are meaningless to users. When a field enables
//! `pid_to_label`, every identifier-shaped bucket value is resolved to its
//! object label through one batched backend lookup; anything the index does
//! not know about can still resolve through an optional fallback
//! collaborator. Lookup failure is never fatal, buckets just keep their raw
//! values.

use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::backend::{SearchBackend, SearchRequest};
use crate::facet::bucket::Bucket;

lazy_static! {
    static ref PID_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9.-]+:(?:[A-Za-z0-9._~-]|%[0-9A-F]{2})+$").expect("static regex");
}

/// Identifier prefix tolerated on bucket values.
pub const PID_PREFIX: &str = "info:fedora/";

/// Backend field names used by the batch label lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLookup {
    /// Field holding the object identifier.
    pub pid_field: String,
    /// Field holding the object label.
    pub label_field: String,
}

impl Default for LabelLookup {
    fn default() -> Self {
        LabelLookup {
            pid_field: "PID".to_string(),
            label_field: "object_label".to_string(),
        }
    }
}

/// Resolves a single object identifier to a display label.
///
/// The batch backend lookup covers indexed objects; implementors of this
/// trait cover the rest (content models and other objects absent from the
/// index).
pub trait LabelResolver {
    /// The label for an identifier, if one can be found.
    fn resolve(&self, pid: &str) -> Option<String>;
}

/// Whether a value looks like a repository object identifier.
pub fn is_valid_pid(pid: &str) -> bool {
    pid.len() <= 64 && PID_REGEX.is_match(pid)
}

/// Strip the identifier prefix, if present.
pub fn strip_pid_prefix(value: &str) -> &str {
    value.strip_prefix(PID_PREFIX).unwrap_or(value)
}

/// Look up labels for all identifier-shaped values in one backend query.
///
/// Builds `pid_field:("a" OR "b" ...)` with faceting disabled and the field
/// list restricted to the identifier and label fields. Backend failure
/// degrades to an empty map.
pub fn batch_lookup<B: SearchBackend + ?Sized>(
    backend: &B,
    lookup: &LabelLookup,
    values: &[String],
) -> AHashMap<String, String> {
    let pids: Vec<&str> = values
        .iter()
        .map(|value| strip_pid_prefix(value))
        .filter(|pid| is_valid_pid(pid))
        .collect();
    if pids.is_empty() {
        return AHashMap::new();
    }

    let clause = pids
        .iter()
        .map(|pid| format!("\"{pid}\""))
        .collect::<Vec<_>>()
        .join(" OR ");
    let request = SearchRequest::new(format!("{}:({})", lookup.pid_field, clause))
        .with_param("facet", "false")
        .with_param(
            "fl",
            format!("{}, {}", lookup.pid_field, lookup.label_field),
        )
        .with_limit(pids.len());

    let mut labels = AHashMap::new();
    if let Ok(response) = backend.execute(&request) {
        for doc in &response.documents {
            if let (Some(pid), Some(label)) = (
                doc.str_value(&lookup.pid_field),
                doc.str_value(&lookup.label_field),
            ) {
                labels.insert(pid.to_string(), label.to_string());
            }
        }
    }
    labels
}

/// Replace bucket labels with resolved object labels.
///
/// Unresolved identifiers try the fallback resolver, then keep their raw
/// value.
pub fn apply_labels(
    buckets: &mut [Bucket],
    labels: &AHashMap<String, String>,
    fallback: Option<&dyn LabelResolver>,
) {
    for bucket in buckets {
        let pid = strip_pid_prefix(&bucket.raw_value);
        if !is_valid_pid(pid) {
            continue;
        }
        if let Some(label) = labels.get(pid) {
            bucket.label = label.clone();
        } else if let Some(label) = fallback.and_then(|resolver| resolver.resolve(pid)) {
            bucket.label = label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_pid() {
        assert!(is_valid_pid("islandora:root"));
        assert!(is_valid_pid("ns-1:obj.2"));
        assert!(!is_valid_pid("no namespace"));
        assert!(!is_valid_pid("missing-colon"));
        assert!(!is_valid_pid(&format!("ns:{}", "x".repeat(64))));
    }

    #[test]
    fn test_strip_pid_prefix() {
        assert_eq!(strip_pid_prefix("info:fedora/islandora:1"), "islandora:1");
        assert_eq!(strip_pid_prefix("islandora:1"), "islandora:1");
    }

    #[test]
    fn test_apply_labels_fallback_order() {
        struct Fallback;
        impl LabelResolver for Fallback {
            fn resolve(&self, pid: &str) -> Option<String> {
                (pid == "islandora:2").then(|| "From fallback".to_string())
            }
        }

        let mut buckets = vec![
            bucket("info:fedora/islandora:1"),
            bucket("islandora:2"),
            bucket("islandora:3"),
            bucket("not a pid"),
        ];
        let mut labels = AHashMap::new();
        labels.insert("islandora:1".to_string(), "From index".to_string());

        apply_labels(&mut buckets, &labels, Some(&Fallback));

        assert_eq!(buckets[0].label, "From index");
        assert_eq!(buckets[1].label, "From fallback");
        // Unresolved identifiers keep the raw value.
        assert_eq!(buckets[2].label, "islandora:3");
        assert_eq!(buckets[3].label, "not a pid");
    }

    fn bucket(value: &str) -> Bucket {
        Bucket {
            raw_value: value.to_string(),
            label: value.to_string(),
            count: 1,
            filter: String::new(),
            active: false,
        }
    }
}
