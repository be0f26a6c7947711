//! Protocol error taxonomy.
//!
//! Per-message variants terminate a single request. [`BridgeError::Configuration`]
//! is only produced while assembling the bridge and keeps it from serving.

/// Errors produced while routing a request and building its result.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The request lacks mandatory correlation metadata or could not be decoded.
    #[error("malformed integration request: {reason}")]
    MalformedRequest { reason: String },

    /// No registered handler serves the requested action.
    #[error("no handler registered for action '{action}'")]
    UnknownAction { action: String },

    /// A handler's domain logic failed. The correlation token is carried as received.
    #[error("action '{action}' failed for correlation '{correlation_id}': {reason}")]
    HandlerExecution {
        action: String,
        correlation_id: String,
        reason: String,
    },

    /// The result sender refused a built result.
    #[error("failed to hand off result for correlation '{correlation_id}': {reason}")]
    Delivery {
        correlation_id: String,
        reason: String,
    },

    /// Duplicate action registration or unusable connector identity.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BridgeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Short machine-friendly label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "malformed_request",
            Self::UnknownAction { .. } => "unknown_action",
            Self::HandlerExecution { .. } => "handler_execution",
            Self::Delivery { .. } => "delivery",
            Self::Configuration(_) => "configuration",
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
