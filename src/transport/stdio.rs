//! JSON-lines transport: one request per input line, one result per output line.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::channel::ChannelResultSender;
use super::{InboundMessage, ResultSender};
use crate::model::{IntegrationRequest, IntegrationResult};

/// A [`ResultSender`] that writes one JSON result per line to any writer.
///
/// `send` only queues the result; a background task owned by the returned
/// handle does the writing and finishes once every sender clone is dropped.
#[derive(Debug, Clone)]
pub struct JsonLinesSender {
    queue: ChannelResultSender,
}

impl JsonLinesSender {
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<Result<usize>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (queue, rx) = ChannelResultSender::new();
        let handle = tokio::spawn(write_results(rx, writer));
        (Self { queue }, handle)
    }
}

impl ResultSender for JsonLinesSender {
    fn send(&self, result: IntegrationResult) -> Result<()> {
        self.queue.send(result)
    }
}

/// Decode each non-blank line and forward it. Lines that fail to decode are
/// forwarded as `MalformedRequest` so the dispatcher reports them.
/// Returns the number of messages forwarded.
pub async fn read_requests<R>(reader: R, tx: mpsc::Sender<InboundMessage>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await.context("failed to read request line")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if tx.send(IntegrationRequest::from_json(line)).await.is_err() {
            warn!("inbound channel closed, stopping reader");
            break;
        }
        forwarded += 1;
    }

    debug!(forwarded, "request stream ended");
    Ok(forwarded)
}

/// Write every result as a JSON line until the channel closes.
/// Returns the number of results written.
pub async fn write_results<W>(
    mut rx: mpsc::UnboundedReceiver<IntegrationResult>,
    mut writer: W,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    while let Some(result) = rx.recv().await {
        let mut line = result
            .to_json()
            .with_context(|| format!("failed to encode result '{}'", result.correlation_id))?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("failed to write result")?;
        writer.flush().await.context("failed to flush results")?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::model::ConnectorOrigin;
    use crate::variables::VariableStore;

    fn sample(id: &str) -> IntegrationResult {
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
            outbound_variables: VariableStore::new().with("k", "v"),
        }
    }

    #[tokio::test]
    async fn reader_decodes_lines_and_skips_blanks() {
        let input = b"{\"correlationId\":\"a\",\"actionName\":\"x\"}\n\n  \nnot json\n";
        let (tx, mut rx) = mpsc::channel(8);

        let forwarded = read_requests(&input[..], tx).await.unwrap();
        assert_eq!(forwarded, 2);

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.correlation_id.as_deref(), Some("a"));

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, Err(BridgeError::MalformedRequest { .. })));

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn json_lines_sender_writes_through_task() {
        let (write_half, mut read_half) = tokio::io::duplex(4096);
        let (sender, handle) = JsonLinesSender::spawn(write_half);

        sender.send(sample("j1")).unwrap();
        sender.send(sample("j2")).unwrap();
        drop(sender);

        assert_eq!(handle.await.unwrap().unwrap(), 2);

        let mut text = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut read_half, &mut text)
            .await
            .unwrap();
        let ids: Vec<String> = text
            .lines()
            .map(|l| serde_json::from_str::<IntegrationResult>(l).unwrap().correlation_id)
            .collect();
        assert_eq!(ids, vec!["j1", "j2"]);
    }

    #[tokio::test]
    async fn writer_emits_one_line_per_result() {
        let (tx, rx) = mpsc::unbounded_channel();
        for id in ["r1", "r2"] {
            tx.send(sample(id)).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let written = write_results(rx, &mut out).await.unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: IntegrationResult = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.correlation_id, "r2");
    }
}
