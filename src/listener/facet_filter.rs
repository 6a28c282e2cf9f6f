//! Hide or restrict facet values before they are displayed.
//!
//! Two rule sets, both keyed by facet field name:
//! - `hide`: listed values are removed.
//! - `show`: only listed values survive.
//!
//! `hide` always runs first, so `show` only sees what `hide` left behind. A
//! value hidden by one rule is never brought back by the other.

use crate::pipeline::ResultPostProcessor;
use crate::types::{BackendId, FieldFacets, FieldName, SearchCommand, SearchContext, SearchResult};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Facet values per field name.
pub type FacetRules = IndexMap<FieldName, HashSet<String>>;

/// Build [`FacetRules`] from `(field, values)` pairs.
pub fn facet_rules<I, F, V, S>(rules: I) -> FacetRules
where
    I: IntoIterator<Item = (F, V)>,
    F: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    rules
        .into_iter()
        .map(|(field, values)| (field.into(), values.into_iter().map(Into::into).collect()))
        .collect()
}

/// Removes configured facet values from `search` and `retrieve` results of
/// one backend.
///
/// Rules are fixed at construction. Fields named in neither rule set are left
/// alone, and a rule naming a field or value the result does not have is a
/// no-op rather than an error.
#[derive(Debug, Clone)]
pub struct FacetValueFilter {
    backend: BackendId,
    hide: FacetRules,
    show: FacetRules,
}

impl FacetValueFilter {
    pub fn new(backend: impl Into<BackendId>, hide: FacetRules, show: FacetRules) -> Self {
        FacetValueFilter {
            backend: backend.into(),
            hide,
            show,
        }
    }

    /// True if this filter is configured for `target`.
    pub fn applies_to(&self, target: &str) -> bool {
        self.backend == target
    }

    /// Filter the result's facets in place.
    ///
    /// Only `search` and `retrieve` results are touched; every other context
    /// passes through unchanged. Missing fields and values are ignored.
    pub fn apply(&self, result: &mut SearchResult, context: &SearchContext) {
        match context {
            SearchContext::Search | SearchContext::Retrieve => {
                self.process_hide_facet_value(result.field_facets_mut());
            }
            other => {
                tracing::trace!(context = %other, "facet value filter skipped");
            }
        }
    }

    fn process_hide_facet_value(&self, facets: &mut FieldFacets) {
        for (field, hidden) in &self.hide {
            if let Some(values) = facets.get_mut(field) {
                let removed = values.remove_keys(hidden);
                if removed > 0 {
                    tracing::debug!(field = %field, removed, "hid facet values");
                }
            }
        }

        for (field, shown) in &self.show {
            if let Some(values) = facets.get_mut(field) {
                let removed = values.retain_keys(|value| shown.contains(value));
                if removed > 0 {
                    tracing::debug!(field = %field, removed, "dropped facet values not in show list");
                }
            }
        }
    }
}

impl ResultPostProcessor for FacetValueFilter {
    fn name(&self) -> &str {
        "facet-value-filter"
    }

    fn process(&self, command: &mut SearchCommand) {
        if !self.applies_to(&command.target_backend) {
            return;
        }
        self.apply(&mut command.result, &command.context);
    }
}
