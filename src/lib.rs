//! Listeners for a library catalog's search pipeline.
//!
//! - [`FacetValueFilter`] hides or restricts facet values in search results.
//! - [`ParserErrorListener`] tags backend errors caused by unparseable queries.
//! - [`JsTranslations`] renders translated strings for client-side scripts.
//!
//! The host owns a [`SearchPipeline`] and calls it after each backend round trip.

pub mod config;
pub mod error;
pub mod listener;
pub mod pipeline;
pub mod telemetry;
pub mod translations;
pub mod types;

pub use config::ListenerConfig;
pub use error::{CatalogError, Result};
pub use listener::{
    facet_rules, BackendError, ErrorEvent, FacetRules, FacetValueFilter, ParserErrorListener,
    TAG_PARSER_ERROR,
};
pub use pipeline::{ErrorListener, ResultPostProcessor, SearchPipeline};
pub use translations::{CatalogTranslator, JsTranslations, TranslationEntry, Translator};
pub use types::{
    BackendId, FacetFieldValues, FieldFacets, SearchCommand, SearchContext, SearchResult,
};
