//! # Palisade
//!
//! Facet processing and query refinement for Solr-style search backends.
//!
//! Palisade sits between a search backend and a presentation layer: it takes
//! a raw faceted response and turns it into a normalized, render-ready
//! bucket model.
//!
//! ## Features
//!
//! - Discrete, legacy date, and range facet classification
//! - Date histogram bucket preparation with correct boundary labels
//! - Per-request variable gap recalculation from the active filters
//! - Range slider series preparation
//! - Human-readable filter and query formatting for breadcrumbs
//! - Object-label substitution for identifier-valued facets

pub mod backend;
pub mod config;
pub mod datemath;
pub mod error;
pub mod facet;
pub mod query;

pub mod prelude {
    //! Convenience re-exports for consumers.
    pub use crate::backend::{SearchBackend, SearchRequest, SearchResponse};
    pub use crate::config::{FieldConfigStore, FieldSettings, FieldType, StaticFieldConfig};
    pub use crate::error::{PalisadeError, Result};
    pub use crate::facet::{FacetPipeline, PreparedFacet};
    pub use crate::query::{FilterFormatter, QueryContext, RefinementParams};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
