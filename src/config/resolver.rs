//! Field configuration store trait and the default-merging resolver.

use ahash::AHashSet;

use crate::config::settings::{FieldSettings, FieldType};

/// Read-only access to stored per-field configuration.
///
/// Where the legacy code scattered `isset(...) ? ... : default` checks, all
/// default-merging now happens in [`FieldConfigResolver`]: a store only
/// reports what it actually has.
pub trait FieldConfigStore {
    /// Stored settings for a field, if any.
    fn settings(&self, field_type: FieldType, field: &str) -> Option<FieldSettings>;

    /// All stored fields of a type, in configured display order.
    fn fields(&self, field_type: FieldType) -> Vec<FieldSettings>;
}

/// Resolves per-field settings, merging in documented defaults for unknown
/// fields. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct FieldConfigResolver<'a, S: FieldConfigStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: FieldConfigStore + ?Sized> FieldConfigResolver<'a, S> {
    /// Create a resolver over the given store.
    pub fn new(store: &'a S) -> Self {
        FieldConfigResolver { store }
    }

    /// Settings for a field, defaulted when the store has none.
    pub fn resolve(&self, field_type: FieldType, field: &str) -> FieldSettings {
        self.store
            .settings(field_type, field)
            .unwrap_or_else(|| FieldSettings::new(field))
    }

    /// Enabled facet fields, in configured display order.
    pub fn facet_fields(&self) -> Vec<FieldSettings> {
        self.store
            .fields(FieldType::FacetFields)
            .into_iter()
            .filter(|settings| settings.enabled)
            .collect()
    }

    /// Names of facet fields configured for variable gap recalculation.
    pub fn variable_gap_fields(&self) -> AHashSet<String> {
        self.facet_fields()
            .into_iter()
            .filter(|settings| settings.range_facet.enabled && settings.range_facet.variable_gap)
            .map(|settings| settings.field)
            .collect()
    }

    /// Field name to label pairs for a type, in configured order.
    pub fn labels(&self, field_type: FieldType) -> Vec<(String, String)> {
        self.store
            .fields(field_type)
            .into_iter()
            .map(|settings| (settings.field, settings.label))
            .collect()
    }
}

/// An in-memory configuration store, useful for tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct StaticFieldConfig {
    facet_fields: Vec<FieldSettings>,
    sort_fields: Vec<FieldSettings>,
    search_fields: Vec<FieldSettings>,
    result_fields: Vec<FieldSettings>,
}

impl StaticFieldConfig {
    /// Create an empty store.
    pub fn new() -> Self {
        StaticFieldConfig::default()
    }

    /// Add settings under a field type.
    pub fn add(mut self, field_type: FieldType, settings: FieldSettings) -> Self {
        self.bucket_mut(field_type).push(settings);
        self
    }

    fn bucket(&self, field_type: FieldType) -> &Vec<FieldSettings> {
        match field_type {
            FieldType::FacetFields => &self.facet_fields,
            FieldType::SortFields => &self.sort_fields,
            FieldType::SearchFields => &self.search_fields,
            FieldType::ResultFields => &self.result_fields,
        }
    }

    fn bucket_mut(&mut self, field_type: FieldType) -> &mut Vec<FieldSettings> {
        match field_type {
            FieldType::FacetFields => &mut self.facet_fields,
            FieldType::SortFields => &mut self.sort_fields,
            FieldType::SearchFields => &mut self.search_fields,
            FieldType::ResultFields => &mut self.result_fields,
        }
    }
}

impl FieldConfigStore for StaticFieldConfig {
    fn settings(&self, field_type: FieldType, field: &str) -> Option<FieldSettings> {
        self.bucket(field_type)
            .iter()
            .find(|settings| settings.field == field)
            .cloned()
    }

    fn fields(&self, field_type: FieldType) -> Vec<FieldSettings> {
        self.bucket(field_type).clone()
    }
}
