//! Ordered listener registry invoked by the search service.
//!
//! Listeners are registered once at startup. After the backend response is
//! assembled the host calls [`SearchPipeline::on_post`]; when the backend
//! fails it calls [`SearchPipeline::on_error`]. Both run every registered
//! listener synchronously, in registration order.

use crate::listener::ErrorEvent;
use crate::types::SearchCommand;
use std::sync::Arc;

/// Post-processes a completed search before the response is rendered.
pub trait ResultPostProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn process(&self, command: &mut SearchCommand);
}

/// Inspects (and may tag) a backend error before it reaches the caller.
pub trait ErrorListener: Send + Sync {
    fn name(&self) -> &str;

    fn on_search_error(&self, event: &mut ErrorEvent);
}

/// Listeners the search service runs after every backend round trip.
#[derive(Default, Clone)]
pub struct SearchPipeline {
    post_processors: Vec<Arc<dyn ResultPostProcessor>>,
    error_listeners: Vec<Arc<dyn ErrorListener>>,
}

impl SearchPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_post_processor(&mut self, processor: Arc<dyn ResultPostProcessor>) {
        tracing::debug!(listener = processor.name(), "registered post processor");
        self.post_processors.push(processor);
    }

    pub fn register_error_listener(&mut self, listener: Arc<dyn ErrorListener>) {
        tracing::debug!(listener = listener.name(), "registered error listener");
        self.error_listeners.push(listener);
    }

    pub fn post_processor_count(&self) -> usize {
        self.post_processors.len()
    }

    pub fn error_listener_count(&self) -> usize {
        self.error_listeners.len()
    }

    /// Run every post processor over `command`. Returns the command for chaining.
    pub fn on_post<'a>(&self, command: &'a mut SearchCommand) -> &'a mut SearchCommand {
        for processor in &self.post_processors {
            tracing::trace!(
                listener = processor.name(),
                backend = %command.target_backend,
                context = %command.context,
                "post"
            );
            processor.process(command);
        }
        command
    }

    /// Run every error listener over `event`. Returns the event for chaining.
    pub fn on_error<'a>(&self, event: &'a mut ErrorEvent) -> &'a mut ErrorEvent {
        for listener in &self.error_listeners {
            tracing::trace!(listener = listener.name(), backend = %event.backend, "error");
            listener.on_search_error(event);
        }
        event
    }
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let post: Vec<&str> = self.post_processors.iter().map(|p| p.name()).collect();
        let err: Vec<&str> = self.error_listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("SearchPipeline")
            .field("post_processors", &post)
            .field("error_listeners", &err)
            .finish()
    }
}
