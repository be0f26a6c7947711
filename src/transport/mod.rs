//! Boundary between the bridge and the message transport.
//!
//! Inbound, the transport delivers decoded [`IntegrationRequest`]s (or the
//! decode error) as [`InboundMessage`]s. Outbound, results are handed to a
//! [`ResultSender`], which owns delivery from then on.

pub mod channel;
pub mod mock;
pub mod stdio;

use anyhow::Result;

use crate::model::{IntegrationRequest, IntegrationResult};

/// One message from the inbound channel.
pub type InboundMessage = crate::error::Result<IntegrationRequest>;

/// Accepts built results for delivery to the engine.
///
/// `send` is fire-and-forget: returning `Ok` means the sender took the
/// result, not that the engine acknowledged it.
pub trait ResultSender: Send + Sync {
    fn send(&self, result: IntegrationResult) -> Result<()>;
}
