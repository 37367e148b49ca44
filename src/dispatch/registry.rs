//! Handler registry — name → handler mapping with overwrite semantics.

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::Handler;

/// Registry of named command handlers.
///
/// Registration happens during initialization; lookups are read-only
/// snapshots. Registering a name twice replaces the earlier handler —
/// last registration wins, with a logged warning. This is intentional
/// hot-reload-friendly behavior, not an error.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a handler under its own name, replacing any prior entry.
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::warn!(command = %name, "replacing registered handler");
        }
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    /// List registered command names.
    pub fn commands(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }

    /// List registered commands with their descriptions.
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.handlers
            .values()
            .map(|h| (h.name(), h.description()))
            .collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
