use crate::error::{CatalogError, Result};
use crate::listener::{FacetRules, FacetValueFilter, ParserErrorListener};
use crate::pipeline::SearchPipeline;
use crate::translations::DEFAULT_VAR_NAME;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::sync::Arc;

pub const BACKEND_ENV_VAR: &str = "CATALOG_BACKEND";

fn default_backend() -> String {
    "Solr".to_string()
}

fn default_var_name() -> String {
    DEFAULT_VAR_NAME.to_string()
}

/// String form of a scalar rule value. Facet values are matched as strings,
/// so `2020` and `"2020"` name the same value.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Accepts a scalar or a list of scalars per field. Anything else is
/// skipped for that field only; the other rules still load.
fn deserialize_rules<'de, D>(deserializer: D) -> std::result::Result<FacetRules, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = indexmap::IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut rules = FacetRules::new();
    for (field, value) in raw {
        let values: Vec<String> = match &value {
            serde_json::Value::Array(items) => {
                let values: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
                if values.len() != items.len() {
                    tracing::warn!(field = %field, "ignoring non-scalar facet rule values");
                }
                values
            }
            other => match scalar_to_string(other) {
                Some(v) => vec![v],
                None => {
                    tracing::warn!(field = %field, "ignoring facet rule with unsupported value");
                    continue;
                }
            },
        };
        rules.insert(field, values.into_iter().collect());
    }
    Ok(rules)
}

/// Host configuration for the listeners, read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub hide_facet_value: FacetRules,
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub show_facet_value: FacetRules,
    #[serde(default = "default_var_name")]
    pub js_var_name: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            backend: default_backend(),
            hide_facet_value: FacetRules::new(),
            show_facet_value: FacetRules::new(),
            js_var_name: default_var_name(),
        }
    }
}

impl ListenerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ListenerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file. Fails if it is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path`, falling back to defaults if it is missing or invalid.
    /// `CATALOG_BACKEND` overrides the backend either way.
    pub fn load_or_default(path: &Path) -> Self {
        let mut config = if path.exists() {
            match Self::load(path) {
                Ok(config) => {
                    tracing::info!(
                        "Loaded listener config: backend={}, hide_fields={}, show_fields={}",
                        config.backend,
                        config.hide_facet_value.len(),
                        config.show_facet_value.len()
                    );
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            }
        } else {
            tracing::info!("No listener config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(backend) = std::env::var(BACKEND_ENV_VAR) {
            let backend = backend.trim();
            if !backend.is_empty() {
                tracing::info!("Backend overridden by {}: {}", BACKEND_ENV_VAR, backend);
                config.backend = backend.to_string();
            }
        }
        config
    }

    fn validate(&self) -> Result<()> {
        if self.backend.trim().is_empty() {
            return Err(CatalogError::Config("backend must not be empty".to_string()));
        }
        if self.js_var_name.trim().is_empty() {
            return Err(CatalogError::Config("jsVarName must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn facet_filter(&self) -> FacetValueFilter {
        FacetValueFilter::new(
            self.backend.clone(),
            self.hide_facet_value.clone(),
            self.show_facet_value.clone(),
        )
    }

    /// Pipeline with the facet filter and the parser error listener registered.
    pub fn build_pipeline(&self) -> SearchPipeline {
        let mut pipeline = SearchPipeline::new();
        pipeline.register_post_processor(Arc::new(self.facet_filter()));
        pipeline.register_error_listener(Arc::new(ParserErrorListener::new(self.backend.clone())));
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn scalar_and_list_values() {
        let config = ListenerConfig::from_json(
            r#"{"hideFacetValue": {"format": "Unknown", "language": ["xx", "yy"]}}"#,
        )
        .unwrap();
        assert_eq!(config.hide_facet_value["format"].len(), 1);
        assert!(config.hide_facet_value["format"].contains("Unknown"));
        assert_eq!(config.hide_facet_value["language"].len(), 2);
        assert!(config.show_facet_value.is_empty());
    }

    #[test]
    fn numeric_scalar_and_list_values() {
        let config = ListenerConfig::from_json(
            r#"{
                "hideFacetValue": {"publishDate": 2020, "format": "Unknown"},
                "showFacetValue": {"era": [2020, 2021.5, "1900"]}
            }"#,
        )
        .unwrap();
        assert!(config.hide_facet_value["publishDate"].contains("2020"));
        assert!(config.hide_facet_value["format"].contains("Unknown"));
        let era = &config.show_facet_value["era"];
        assert_eq!(era.len(), 3);
        assert!(era.contains("2020"));
        assert!(era.contains("2021.5"));
        assert!(era.contains("1900"));
    }

    #[test]
    fn unsupported_rule_value_only_drops_that_field() {
        let config = ListenerConfig::from_json(
            r#"{"hideFacetValue": {"odd": {"nested": 1}, "blank": null, "format": "Unknown",
                "mixed": ["a", ["b"], 3]}}"#,
        )
        .unwrap();
        assert!(!config.hide_facet_value.contains_key("odd"));
        assert!(!config.hide_facet_value.contains_key("blank"));
        assert!(config.hide_facet_value["format"].contains("Unknown"));
        assert_eq!(config.hide_facet_value["mixed"].len(), 2);
    }

    #[test]
    #[serial]
    fn numeric_rule_does_not_discard_other_rules() {
        std::env::remove_var(BACKEND_ENV_VAR);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listeners.json");
        std::fs::write(
            &path,
            r#"{"hideFacetValue": {"publishDate": 2020, "format": "Unknown"}}"#,
        )
        .unwrap();
        let pipeline = ListenerConfig::load_or_default(&path).build_pipeline();

        let mut facets = crate::types::FieldFacets::new();
        facets.insert(
            "format".to_string(),
            crate::types::FacetFieldValues::from_pairs([("Book", 1), ("Unknown", 2)]),
        );
        facets.insert(
            "publishDate".to_string(),
            crate::types::FacetFieldValues::from_pairs([("2021", 4), ("2020", 7)]),
        );
        let mut cmd = crate::types::SearchCommand::new(
            "Solr",
            "search",
            crate::types::SearchResult::with_facets(facets),
        );
        pipeline.on_post(&mut cmd);

        let facets = cmd.result.field_facets();
        assert_eq!(facets["format"].to_vec(), vec![("Book".to_string(), 1)]);
        assert_eq!(facets["publishDate"].to_vec(), vec![("2021".to_string(), 4)]);
    }

    #[test]
    fn defaults_when_fields_missing() {
        let config = ListenerConfig::from_json("{}").unwrap();
        assert_eq!(config.backend, "Solr");
        assert_eq!(config.js_var_name, DEFAULT_VAR_NAME);
        assert!(config.hide_facet_value.is_empty());
    }

    #[test]
    fn empty_backend_rejected() {
        let err = ListenerConfig::from_json(r#"{"backend": "  "}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = ListenerConfig::from_json(r#"{"hideFacetValue": 3}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn load_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let err = ListenerConfig::load(&tmp.path().join("listeners.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    #[serial]
    fn load_or_default_without_file() {
        std::env::remove_var(BACKEND_ENV_VAR);
        let tmp = TempDir::new().unwrap();
        let config = ListenerConfig::load_or_default(&tmp.path().join("listeners.json"));
        assert_eq!(config.backend, "Solr");
    }

    #[test]
    #[serial]
    fn load_or_default_reads_file() {
        std::env::remove_var(BACKEND_ENV_VAR);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listeners.json");
        std::fs::write(
            &path,
            r#"{"backend": "SolrAuth", "showFacetValue": {"format": ["Book"]}}"#,
        )
        .unwrap();
        let config = ListenerConfig::load_or_default(&path);
        assert_eq!(config.backend, "SolrAuth");
        assert!(config.show_facet_value["format"].contains("Book"));
    }

    #[test]
    #[serial]
    fn load_or_default_falls_back_on_bad_file() {
        std::env::remove_var(BACKEND_ENV_VAR);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listeners.json");
        std::fs::write(&path, "not json").unwrap();
        let config = ListenerConfig::load_or_default(&path);
        assert_eq!(config.backend, "Solr");
        assert!(config.hide_facet_value.is_empty());
    }

    #[test]
    #[serial]
    fn env_overrides_backend() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listeners.json");
        std::fs::write(&path, r#"{"backend": "Solr"}"#).unwrap();
        std::env::set_var(BACKEND_ENV_VAR, "Search2");
        let config = ListenerConfig::load_or_default(&path);
        std::env::remove_var(BACKEND_ENV_VAR);
        assert_eq!(config.backend, "Search2");
    }

    #[test]
    fn build_pipeline_registers_both_listeners() {
        let pipeline = ListenerConfig::default().build_pipeline();
        assert_eq!(pipeline.post_processor_count(), 1);
        assert_eq!(pipeline.error_listener_count(), 1);
    }
}
