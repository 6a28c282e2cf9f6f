//! Backend error listeners.
//!
//! A listener watches a set of backends. When one of them fails, the listener
//! may attach tags to the error so the caller can tell a malformed user query
//! apart from an outage.

use crate::pipeline::ErrorListener;
use crate::types::BackendId;
use http::StatusCode;
use std::collections::BTreeSet;
use thiserror::Error;

/// Tag attached to errors caused by a query the backend could not parse.
pub const TAG_PARSER_ERROR: &str = "catalog.search.parser_error";

const PARSER_ERROR_MARKERS: &[&str] = &["org.apache.solr.search.syntaxerror", "undefined field"];

/// An error response from a search backend.
#[derive(Error, Debug, Clone)]
#[error("backend returned {status}: {reason}")]
pub struct BackendError {
    pub status: StatusCode,
    pub reason: String,
    pub body: String,
    tags: BTreeSet<String>,
}

impl BackendError {
    pub fn new(status: StatusCode, reason: impl Into<String>, body: impl Into<String>) -> Self {
        BackendError {
            status,
            reason: reason.into(),
            body: body.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The `error.msg` field of a JSON error body, if there is one.
    pub fn body_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .pointer("/error/msg")
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }
}

/// A failed search operation.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub backend: BackendId,
    pub error: BackendError,
}

impl ErrorEvent {
    pub fn new(backend: impl Into<BackendId>, error: BackendError) -> Self {
        ErrorEvent {
            backend: backend.into(),
            error,
        }
    }
}

/// Backends a listener watches.
#[derive(Debug, Clone, Default)]
pub struct BackendSet {
    backends: BTreeSet<BackendId>,
}

impl BackendSet {
    pub fn add_backend(&mut self, backend: impl Into<BackendId>) {
        self.backends.insert(backend.into());
    }

    pub fn listens_for_backend(&self, backend: &str) -> bool {
        self.backends.contains(backend)
    }
}

/// Tags client errors whose message says the query could not be parsed.
#[derive(Debug, Clone)]
pub struct ParserErrorListener {
    backends: BackendSet,
}

impl ParserErrorListener {
    pub fn new(backend: impl Into<BackendId>) -> Self {
        let mut backends = BackendSet::default();
        backends.add_backend(backend);
        ParserErrorListener { backends }
    }

    pub fn add_backend(&mut self, backend: impl Into<BackendId>) {
        self.backends.add_backend(backend);
    }

    pub fn listens_for_backend(&self, backend: &str) -> bool {
        self.backends.listens_for_backend(backend)
    }

    fn is_parser_error(error: &BackendError) -> bool {
        if !error.status.is_client_error() {
            return false;
        }
        let mentions_marker = |text: &str| {
            let lower = text.to_ascii_lowercase();
            PARSER_ERROR_MARKERS.iter().any(|m| lower.contains(m))
        };
        mentions_marker(&error.reason) || error.body_message().is_some_and(|m| mentions_marker(&m))
    }
}

impl ErrorListener for ParserErrorListener {
    fn name(&self) -> &str {
        "parser-error-listener"
    }

    fn on_search_error(&self, event: &mut ErrorEvent) {
        if !self.listens_for_backend(&event.backend) {
            return;
        }
        if Self::is_parser_error(&event.error) {
            tracing::info!(
                backend = %event.backend,
                status = %event.error.status,
                "tagging backend error as query parser error"
            );
            event.error.add_tag(TAG_PARSER_ERROR);
        }
    }
}
