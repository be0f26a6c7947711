//! Broadcast of terminal dispatch outcomes.
//!
//! The dispatcher emits one [`DispatchEvent`] per request via
//! [`EventBus::emit`]; monitors subscribe via [`EventBus::subscribe`].
//! Built on [`tokio::sync::broadcast`] so multiple listeners can react
//! independently.

use tokio::sync::broadcast;

use crate::consts::DEFAULT_EVENT_CAPACITY;

/// How a single request left the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// The result was built and handed to the sender.
    Completed {
        correlation_id: String,
        action: String,
    },
    /// The request terminated without a result.
    Failed {
        correlation_id: Option<String>,
        action: String,
        kind: &'static str,
        message: String,
    },
}

impl DispatchEvent {
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Completed { correlation_id, .. } => Some(correlation_id),
            Self::Failed { correlation_id, .. } => correlation_id.as_deref(),
        }
    }
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DispatchEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: DispatchEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to future events (past ones are not replayed).
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(id: &str) -> DispatchEvent {
        DispatchEvent::Completed {
            correlation_id: id.to_string(),
            action: "example-action".to_string(),
        }
    }

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(completed("abc-1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.correlation_id(), Some("abc-1"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(completed("x"));

        assert_eq!(rx1.recv().await.unwrap(), completed("x"));
        assert_eq!(rx2.recv().await.unwrap(), completed("x"));
    }

    #[test]
    fn emit_without_subscribers_returns_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.emit(completed("x")), 0);
    }

    #[test]
    fn failed_event_may_lack_correlation() {
        let event = DispatchEvent::Failed {
            correlation_id: None,
            action: "a".to_string(),
            kind: "malformed_request",
            message: "correlationId is missing".to_string(),
        };
        assert_eq!(event.correlation_id(), None);
    }
}
