//! The facet processing pipeline.
//!
//! One [`FacetPipeline`] handles one request's facet-rendering pass:
//! classify each configured field's raw results, prepare normalized
//! buckets, recalculate variable date gaps (with at most one extra backend
//! round trip), and build slider series. All per-pass state lives on the
//! pipeline value; nothing is shared across requests.

pub mod bucket;
pub mod gap;
pub mod kind;
pub mod labels;
pub mod slider;

use serde::{Deserialize, Serialize};

use crate::backend::SearchBackend;
use crate::config::{FieldConfigResolver, FieldConfigStore, FieldSettings};
use crate::error::Result;
use crate::query::QueryContext;

pub use bucket::{apply_boolean_replacements, prepare_date_buckets, prepare_field_buckets, Bucket};
pub use gap::{recalculate, GapRecalculation};
pub use kind::{classify, FacetKind};
pub use labels::{LabelLookup, LabelResolver};
pub use slider::{SliderPoint, SliderSeries};

use ahash::AHashSet;

/// One fully prepared facet, ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedFacet {
    /// The backend field.
    pub field: String,
    /// Configured display label for the facet as a whole.
    pub label: String,
    /// The shape the raw results took.
    pub kind: FacetKind,
    /// Renderable buckets: minimum count met and not already active.
    pub buckets: Vec<Bucket>,
    /// When the soft limit split the buckets, the index where the hidden
    /// tail starts.
    pub soft_limit: Option<usize>,
    /// Slider series, for fields rendered as a slider.
    pub slider: Option<SliderSeries>,
    /// Datepicker year range, for fields with the datepicker enabled.
    pub datepicker_range: Option<String>,
}

impl PreparedFacet {
    /// Buckets shown before the "show more" toggle.
    pub fn visible_buckets(&self) -> &[Bucket] {
        match self.soft_limit {
            Some(limit) => &self.buckets[..limit],
            None => &self.buckets,
        }
    }

    /// Buckets hidden behind the "show more" toggle.
    pub fn hidden_buckets(&self) -> &[Bucket] {
        match self.soft_limit {
            Some(limit) => &self.buckets[limit..],
            None => &[],
        }
    }

    fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.slider.is_none() && self.datepicker_range.is_none()
    }
}

/// Per-request facet processing.
///
/// Construct one per facet-rendering pass; settings are loaded from the
/// configuration store once at processing time.
pub struct FacetPipeline<'a, B: SearchBackend + ?Sized, S: FieldConfigStore + ?Sized> {
    backend: &'a B,
    config: FieldConfigResolver<'a, S>,
    minimum_count: u64,
    soft_limit: Option<usize>,
    date_fields: AHashSet<String>,
    label_lookup: LabelLookup,
    label_fallback: Option<&'a dyn LabelResolver>,
}

impl<'a, B: SearchBackend + ?Sized, S: FieldConfigStore + ?Sized> FacetPipeline<'a, B, S> {
    /// Create a pipeline over a backend and configuration store.
    pub fn new(backend: &'a B, store: &'a S) -> Self {
        FacetPipeline {
            backend,
            config: FieldConfigResolver::new(store),
            minimum_count: 1,
            soft_limit: None,
            date_fields: AHashSet::new(),
            label_lookup: LabelLookup::default(),
            label_fallback: None,
        }
    }

    /// Set the minimum document count for a bucket to render.
    pub fn with_minimum_count(mut self, minimum_count: u64) -> Self {
        self.minimum_count = minimum_count;
        self
    }

    /// Set the soft limit splitting buckets into visible and hidden sets.
    pub fn with_soft_limit(mut self, soft_limit: usize) -> Self {
        self.soft_limit = Some(soft_limit);
        self
    }

    /// Declare which fields hold dates, distinguishing date ranges from
    /// numeric ranges within the range facet section.
    pub fn with_date_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.date_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the field names used by the batch label lookup.
    pub fn with_label_lookup(mut self, lookup: LabelLookup) -> Self {
        self.label_lookup = lookup;
        self
    }

    /// Attach a fallback resolver for identifiers absent from the index.
    pub fn with_label_fallback(mut self, fallback: &'a dyn LabelResolver) -> Self {
        self.label_fallback = Some(fallback);
        self
    }

    /// Process every configured facet field against the query context.
    ///
    /// Returns prepared facets in configured display order; fields with no
    /// raw results, or whose buckets all fall below the minimum count, are
    /// omitted. Backend errors from the variable-gap refresh propagate.
    pub fn process(&self, ctx: &QueryContext) -> Result<Vec<PreparedFacet>> {
        let facet_settings = self.config.facet_fields();
        let variable_fields = self.config.variable_gap_fields();
        let recalc = gap::recalculate(self.backend, ctx, &variable_fields)?;

        let mut prepared = Vec::with_capacity(facet_settings.len());
        for settings in &facet_settings {
            let field = settings.field.as_str();
            let Some(kind) = kind::classify(field, &ctx.response.facets) else {
                continue;
            };
            let facet = match kind {
                FacetKind::Field => self.prepare_field(field, settings, ctx),
                FacetKind::LegacyDate => {
                    let Some(raw) = recalc.date_facets.get(field) else {
                        continue;
                    };
                    self.prepare_date(field, settings, raw, &recalc, ctx)?
                }
                FacetKind::Range => {
                    if !self.date_fields.contains(field) {
                        // Numeric range facets have no renderable form yet.
                        continue;
                    }
                    let Some(raw) = ctx.response.facets.ranges.get(field) else {
                        continue;
                    };
                    self.prepare_date(field, settings, raw, &recalc, ctx)?
                }
            };
            if !facet.is_empty() {
                prepared.push(facet);
            }
        }
        Ok(prepared)
    }

    fn prepare_field(
        &self,
        field: &str,
        settings: &FieldSettings,
        ctx: &QueryContext,
    ) -> PreparedFacet {
        let counts = ctx
            .response
            .facets
            .fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut buckets = bucket::prepare_field_buckets(field, counts, settings, ctx);

        if settings.pid_to_label {
            let values: Vec<String> = buckets.iter().map(|b| b.raw_value.clone()).collect();
            let resolved = labels::batch_lookup(self.backend, &self.label_lookup, &values);
            labels::apply_labels(&mut buckets, &resolved, self.label_fallback);
        }
        bucket::apply_boolean_replacements(&mut buckets, settings);

        self.finish(field, settings, kind::FacetKind::Field, buckets, None, None)
    }

    fn prepare_date(
        &self,
        field: &str,
        settings: &FieldSettings,
        raw: &crate::backend::RangeFacet,
        recalc: &GapRecalculation,
        ctx: &QueryContext,
    ) -> Result<PreparedFacet> {
        let keep_edges = recalc.refreshed.contains(field);
        let kind = kind::classify(field, &ctx.response.facets).unwrap_or(FacetKind::LegacyDate);

        let (buckets, series) = if settings.slider_enabled {
            (Vec::new(), slider::build(field, raw, settings, keep_edges))
        } else {
            (
                bucket::prepare_date_buckets(field, raw, settings, ctx)?,
                None,
            )
        };
        let datepicker = settings
            .datepicker_enabled
            .then(|| settings.datepicker_range.clone());

        Ok(self.finish(field, settings, kind, buckets, series, datepicker))
    }

    /// Minimum-count and active-filter exclusion runs last so the hidden
    /// set behind the soft limit reflects the full eligible set.
    fn finish(
        &self,
        field: &str,
        settings: &FieldSettings,
        kind: FacetKind,
        buckets: Vec<Bucket>,
        slider: Option<SliderSeries>,
        datepicker_range: Option<String>,
    ) -> PreparedFacet {
        let buckets: Vec<Bucket> = buckets
            .into_iter()
            .filter(|bucket| bucket.count >= self.minimum_count && !bucket.active)
            .collect();
        let soft_limit = self
            .soft_limit
            .filter(|limit| buckets.len() > *limit)
            .map(|limit| limit.min(buckets.len()));

        PreparedFacet {
            field: field.to_string(),
            label: settings.label.clone(),
            kind,
            buckets,
            soft_limit,
            slider,
            datepicker_range,
        }
    }
}
