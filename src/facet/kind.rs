//! Facet shape classification.

use serde::{Deserialize, Serialize};

use crate::backend::FacetCounts;

/// The three shapes a field's raw facet results can take, depending on the
/// backend version and how faceting was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    /// Discrete value counts (`facet_fields`).
    Field,
    /// Legacy date histogram (`facet_dates`, Solr 1.4).
    LegacyDate,
    /// Date or numeric range histogram (`facet_ranges`, Solr 3.1).
    Range,
}

/// Classify a field by which raw-response section it appears in.
///
/// Priority order is `Field > LegacyDate > Range`, first match wins. A field
/// appearing in more than one section at once is not expected from real
/// backends; the priority order resolves it deterministically rather than
/// failing.
pub fn classify(field: &str, facets: &FacetCounts) -> Option<FacetKind> {
    if facets.fields.contains_key(field) {
        Some(FacetKind::Field)
    } else if facets.dates.contains_key(field) {
        Some(FacetKind::LegacyDate)
    } else if facets.ranges.contains_key(field) {
        Some(FacetKind::Range)
    } else {
        None
    }
}
