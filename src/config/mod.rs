//! Per-field display configuration: settings model, store trait, and the
//! default-merging resolver.

pub mod resolver;
pub mod settings;

pub use resolver::{FieldConfigResolver, FieldConfigStore, StaticFieldConfig};
pub use settings::{
    BooleanReplacements, FieldSettings, FieldType, RangeFacetSettings, SortBy,
    DEFAULT_DATE_FORMAT, DEFAULT_DATEPICKER_RANGE, DEFAULT_SLIDER_COLOR,
};
