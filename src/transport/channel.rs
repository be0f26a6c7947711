use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use super::ResultSender;
use crate::model::IntegrationResult;

/// Hands results to an in-process consumer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelResultSender {
    tx: mpsc::UnboundedSender<IntegrationResult>,
}

impl ChannelResultSender {
    /// Create a sender and the receiver the consumer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IntegrationResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResultSender for ChannelResultSender {
    fn send(&self, result: IntegrationResult) -> Result<()> {
        self.tx
            .send(result)
            .map_err(|e| anyhow!("result channel closed, dropped result for '{}'", e.0.correlation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConnectorOrigin;
    use crate::variables::VariableStore;

    fn result(id: &str) -> IntegrationResult {
        IntegrationResult {
            correlation_id: id.to_string(),
            process_instance_id: None,
            process_definition_id: None,
            activity_element_id: None,
            business_key: None,
            target_service: None,
            connector: ConnectorOrigin {
                service_name: "svc".to_string(),
                service_version: None,
                action_name: "a".to_string(),
                properties: Default::default(),
            },
            outbound_variables: VariableStore::new(),
        }
    }

    #[tokio::test]
    async fn delivers_to_receiver() {
        let (sender, mut rx) = ChannelResultSender::new();
        sender.send(result("abc-1")).unwrap();
        assert_eq!(rx.recv().await.unwrap().correlation_id, "abc-1");
    }

    #[test]
    fn closed_receiver_is_an_error() {
        let (sender, rx) = ChannelResultSender::new();
        drop(rx);
        let err = sender.send(result("gone")).unwrap_err();
        assert!(err.to_string().contains("gone"), "got: {err}");
    }
}
