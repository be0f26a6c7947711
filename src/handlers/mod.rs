//! Action handlers and the registry that routes action names to them.
//!
//! Handlers implement [`ActionHandler`] and are collected by a
//! [`HandlerRegistryBuilder`]. Building the registry checks every action name
//! and alias for uniqueness; after that the registry is read-only and can be
//! shared across concurrent dispatches without locking.

pub mod example;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::BridgeError;
use crate::model::IntegrationRequest;
use crate::variables::VariableStore;

/// One connector capability, selected by action name.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Primary action name, e.g. `"example-action"`.
    fn action(&self) -> &str;

    /// Additional action names routed to this handler.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    fn description(&self) -> &str {
        ""
    }

    /// Run the domain logic and return a freshly built outbound store.
    /// An empty inbound store is valid input.
    async fn execute(&self, request: &IntegrationRequest) -> Result<VariableStore>;
}

/// Emit one debug entry per inbound variable.
pub fn trace_inbound(request: &IntegrationRequest) {
    for (name, value) in request.inbound_variables.entries() {
        debug!(
            correlation_id = request.correlation_id.as_deref().unwrap_or_default(),
            variable = name,
            value = %value,
            "inbound variable"
        );
    }
}

/// Collects handlers before the bridge starts serving.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: Vec<Arc<dyn ActionHandler>>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-loaded with the built-in example actions.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(Arc::new(example::ExampleActionHandler))
            .register(Arc::new(example::ExampleConnectorHandler))
    }

    pub fn register(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Freeze the registry. Fails with `Configuration` on an empty or
    /// duplicated action name.
    pub fn build(self) -> Result<HandlerRegistry, BridgeError> {
        let mut by_action: HashMap<String, Arc<dyn ActionHandler>> = HashMap::new();

        for handler in self.handlers {
            let triggers = std::iter::once(handler.action()).chain(handler.aliases().iter().copied());
            for action in triggers {
                if action.trim().is_empty() {
                    return Err(BridgeError::configuration(
                        "handler registered with an empty action name",
                    ));
                }
                if by_action.contains_key(action) {
                    return Err(BridgeError::configuration(format!(
                        "action '{action}' is registered by more than one handler"
                    )));
                }
                by_action.insert(action.to_string(), Arc::clone(&handler));
            }
        }

        Ok(HandlerRegistry { by_action })
    }
}

/// Immutable action name → handler map.
pub struct HandlerRegistry {
    by_action: HashMap<String, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    pub fn get(&self, action: &str) -> Option<Arc<dyn ActionHandler>> {
        self.by_action.get(action).cloned()
    }

    /// Like [`get`](Self::get) but reports a miss as `UnknownAction`.
    pub fn resolve(&self, action: &str) -> Result<Arc<dyn ActionHandler>, BridgeError> {
        self.get(action).ok_or_else(|| BridgeError::UnknownAction {
            action: action.to_string(),
        })
    }

    /// Every routable action name and alias, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.by_action.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }

    /// One aligned line per action name: `name  description`.
    pub fn help_text(&self) -> String {
        let actions = self.actions();
        let width = actions.iter().map(|a| a.len()).max().unwrap_or(10);

        let mut out = String::new();
        for action in actions {
            let description = self
                .by_action
                .get(action)
                .map(|h| h.description())
                .unwrap_or_default();
            out.push_str(&format!("  {action:<width$}  {description}\n"));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.by_action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }
}
