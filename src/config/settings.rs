//! Per-field settings as the configuration store holds them.

use serde::{Deserialize, Serialize};

/// Default display date format when a field has none configured.
pub const DEFAULT_DATE_FORMAT: &str = "Y";

/// Default range slider color.
pub const DEFAULT_SLIDER_COLOR: &str = "#edc240";

/// Default datepicker year range.
pub const DEFAULT_DATEPICKER_RANGE: &str = "-100:+3";

/// The field-type categories the configuration store is organized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Fields facet counts are requested for.
    FacetFields,
    /// Fields results can be sorted on.
    SortFields,
    /// Fields exposed for querying.
    SearchFields,
    /// Fields shown in result listings.
    ResultFields,
}

/// Facet bucket ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Order buckets by document count, descending.
    Count,
    /// Order buckets by value.
    Index,
}

/// Range facet options for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFacetSettings {
    /// Whether range faceting is requested for this field.
    pub enabled: bool,
    /// Recompute the histogram gap per request from the active filters.
    pub variable_gap: bool,
    /// Histogram start, in date-math or literal syntax.
    pub start: String,
    /// Histogram end.
    pub end: String,
    /// Fixed bucket width.
    pub gap: String,
}

impl Default for RangeFacetSettings {
    fn default() -> Self {
        RangeFacetSettings {
            enabled: false,
            variable_gap: false,
            start: "NOW/YEAR-20YEARS".to_string(),
            end: "NOW".to_string(),
            gap: "+1YEAR".to_string(),
        }
    }
}

/// Replacement display text for boolean facet values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanReplacements {
    /// Shown instead of the literal `true`.
    pub true_text: Option<String>,
    /// Shown instead of the literal `false`.
    pub false_text: Option<String>,
}

/// Display settings for one backend field.
///
/// Loaded once per facet-rendering pass and read-only during processing.
/// Permission enforcement itself is the consumer's concern; the role list is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSettings {
    /// Backend field name.
    pub field: String,
    /// Human-readable label. Defaults to the field name.
    pub label: String,
    /// Whether the field is enabled for display.
    pub enabled: bool,
    /// Roles allowed to see this field. Empty means everyone.
    pub permissions: Vec<String>,
    /// Facet bucket ordering.
    pub sort_by: SortBy,
    /// Range facet options.
    pub range_facet: RangeFacetSettings,
    /// Render date range facets as a slider.
    pub slider_enabled: bool,
    /// Slider color.
    pub slider_color: String,
    /// Offer a datepicker filter alongside the facet.
    pub datepicker_enabled: bool,
    /// Datepicker year range.
    pub datepicker_range: String,
    /// Boolean value display replacements.
    pub boolean_replacements: BooleanReplacements,
    /// Replace object-identifier bucket values with object labels.
    pub pid_to_label: bool,
    /// PHP-style display date format, when the field holds dates.
    pub date_format: Option<String>,
}

impl FieldSettings {
    /// Create settings with documented defaults for the given field.
    pub fn new<S: Into<String>>(field: S) -> Self {
        let field = field.into();
        FieldSettings {
            label: field.clone(),
            field,
            enabled: true,
            permissions: Vec::new(),
            sort_by: SortBy::Count,
            range_facet: RangeFacetSettings::default(),
            slider_enabled: false,
            slider_color: DEFAULT_SLIDER_COLOR.to_string(),
            datepicker_enabled: false,
            datepicker_range: DEFAULT_DATEPICKER_RANGE.to_string(),
            boolean_replacements: BooleanReplacements::default(),
            pid_to_label: false,
            date_format: None,
        }
    }

    /// Set the label.
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Set the display date format.
    pub fn with_date_format<S: Into<String>>(mut self, format: S) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Enable range faceting with variable gap recalculation.
    pub fn with_variable_gap(mut self) -> Self {
        self.range_facet.enabled = true;
        self.range_facet.variable_gap = true;
        self
    }

    /// Enable the range slider.
    pub fn with_slider(mut self) -> Self {
        self.slider_enabled = true;
        self
    }

    /// Enable object-label substitution for bucket values.
    pub fn with_pid_to_label(mut self) -> Self {
        self.pid_to_label = true;
        self
    }

    /// The display date format, falling back to the documented default.
    pub fn display_date_format(&self) -> &str {
        match self.date_format.as_deref() {
            Some(format) if !format.is_empty() => format,
            _ => DEFAULT_DATE_FORMAT,
        }
    }
}
