//! HandlerRegistry - command name to handler mapping

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::RequestHandler;

/// At most one handler per command name; registering again replaces the previous one
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn RequestHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `command`
    ///
    /// Returns true when an existing handler was replaced.
    pub fn register(&self, command: impl Into<String>, handler: Arc<dyn RequestHandler>) -> bool {
        let command = command.into();
        debug!(%command, "HandlerRegistry::register: called");
        let mut handlers = self.handlers.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let replaced = handlers.insert(command.clone(), handler).is_some();
        if replaced {
            info!(%command, "Replaced previously registered handler");
        }
        replaced
    }

    /// Handler registered for `command`, if any
    pub fn resolve(&self, command: &str) -> Option<Arc<dyn RequestHandler>> {
        let handlers = self.handlers.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.get(command).cloned()
    }

    pub fn contains(&self, command: &str) -> bool {
        let handlers = self.handlers.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.contains_key(command)
    }

    /// Registered command names, sorted
    pub fn commands(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
