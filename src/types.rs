use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend identifier, a plain string like `"Solr"`.
pub type BackendId = String;
/// Facet field name, e.g. `"format"`.
pub type FieldName = String;

/// Value counts for a single facet field, in display order.
///
/// Listeners mutate an existing instance in place. Removing a key keeps the
/// relative order of everything that survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetFieldValues {
    values: IndexMap<String, u64>,
}

impl FacetFieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(value, count)` pairs, the shape backends return facet
    /// lists in. A repeated value keeps its first position and the last count.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let values = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self { values }
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.values.get(value).copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Remove every listed value that is present. Returns how many were removed.
    pub fn remove_keys<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for key in keys {
            // shift_remove keeps display order; swap_remove would not
            if self.values.shift_remove(key.as_ref()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Drop every value for which `keep` returns false. Returns how many were removed.
    pub fn retain_keys<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.values.len();
        self.values.retain(|k, _| keep(k.as_str()));
        before - self.values.len()
    }

    pub fn to_vec(&self) -> Vec<(String, u64)> {
        self.values.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

/// Facet value collections keyed by field name, in the order the backend
/// returned the fields.
pub type FieldFacets = IndexMap<FieldName, FacetFieldValues>;

/// The part of a backend response that listeners get to post-process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Total number of matching records (before pagination).
    #[serde(default)]
    pub total: u64,
    /// Facet counts keyed by field name.
    #[serde(default)]
    pub facets: FieldFacets,
}

impl SearchResult {
    pub fn with_facets(facets: FieldFacets) -> Self {
        SearchResult { total: 0, facets }
    }

    pub fn field_facets(&self) -> &FieldFacets {
        &self.facets
    }

    pub fn field_facets_mut(&mut self) -> &mut FieldFacets {
        &mut self.facets
    }
}

/// Which kind of search operation produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchContext {
    Search,
    Retrieve,
    RetrieveBatch,
    Similar,
    Browse,
    Other(String),
}

impl SearchContext {
    /// Parse the host's context tag. Unrecognised tags become [`SearchContext::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            "search" => SearchContext::Search,
            "retrieve" => SearchContext::Retrieve,
            "retrieveBatch" => SearchContext::RetrieveBatch,
            "similar" => SearchContext::Similar,
            "browse" => SearchContext::Browse,
            other => SearchContext::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SearchContext::Search => "search",
            SearchContext::Retrieve => "retrieve",
            SearchContext::RetrieveBatch => "retrieveBatch",
            SearchContext::Similar => "similar",
            SearchContext::Browse => "browse",
            SearchContext::Other(s) => s,
        }
    }
}

impl fmt::Display for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SearchContext {
    fn from(tag: &str) -> Self {
        SearchContext::parse(tag)
    }
}

/// A completed search operation on its way back to the caller.
#[derive(Debug, Clone)]
pub struct SearchCommand {
    pub target_backend: BackendId,
    pub context: SearchContext,
    pub result: SearchResult,
}

impl SearchCommand {
    pub fn new(
        target_backend: impl Into<BackendId>,
        context: impl Into<SearchContext>,
        result: SearchResult,
    ) -> Self {
        SearchCommand {
            target_backend: target_backend.into(),
            context: context.into(),
            result,
        }
    }
}
