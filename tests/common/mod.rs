use catalog_listeners::{FacetFieldValues, FieldFacets, SearchResult};

/// Result with a `format` facet (`Book`, `Unknown`, `Fake`) and a `language` facet.
pub fn sample_result() -> SearchResult {
    catalog_listeners::telemetry::init_tracing();
    let mut facets = FieldFacets::new();
    facets.insert(
        "format".to_string(),
        FacetFieldValues::from_pairs([("Book", 124), ("Unknown", 16), ("Fake", 3)]),
    );
    facets.insert(
        "language".to_string(),
        FacetFieldValues::from_pairs([("English", 120), ("German", 20), ("Latin", 3)]),
    );
    SearchResult {
        total: 143,
        facets,
    }
}

#[allow(dead_code)]
pub fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}
