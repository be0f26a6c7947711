use anyhow::{Result, anyhow, bail};
use std::sync::Mutex;

use super::ResultSender;
use crate::model::IntegrationResult;

/// A sender for tests. Records every result it accepts, or rejects all of
/// them when built with [`RecordingSender::failing`].
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<IntegrationResult>>,
    reject: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// Results accepted so far, in send order.
    pub fn sent(&self) -> Vec<IntegrationResult> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

impl ResultSender for RecordingSender {
    fn send(&self, result: IntegrationResult) -> Result<()> {
        if self.reject {
            bail!("RecordingSender: rejecting '{}'", result.correlation_id);
        }
        self.sent
            .lock()
            .map_err(|_| anyhow!("RecordingSender: lock poisoned"))?
            .push(result);
        Ok(())
    }
}
