//! Connector identity and properties.
//!
//! Assembled once by the bootstrap code and shared read-only as
//! `Arc<ConnectorConfig>`. There is no mutation API after construction.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::model::ConnectorOrigin;

/// Read-only connector identity consulted when stamping results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    service_name: String,
    #[serde(default)]
    service_version: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl ConnectorConfig {
    /// A config with only a service name. Fails on an empty name.
    pub fn new(service_name: impl Into<String>) -> Result<Self> {
        Self {
            service_name: service_name.into(),
            service_version: None,
            properties: Map::new(),
        }
        .validated()
    }

    /// Replace the service name, e.g. when a flag overrides a config file.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Result<Self> {
        self.service_name = service_name.into();
        self.validated()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Load from a JSON document:
    /// `{"serviceName": "...", "serviceVersion": "...", "properties": {...}}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| BridgeError::configuration(format!("invalid connector config: {e}")))?;
        config.validated()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::configuration(format!(
                "cannot read connector config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    fn validated(self) -> Result<Self> {
        if self.service_name.trim().is_empty() {
            return Err(BridgeError::configuration("service name must not be empty"));
        }
        Ok(self)
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Origin stamp for a result produced by `action_name`.
    pub fn origin(&self, action_name: &str) -> ConnectorOrigin {
        ConnectorOrigin {
            service_name: self.service_name.clone(),
            service_version: self.service_version.clone(),
            action_name: action_name.to_string(),
            properties: self.properties.clone(),
        }
    }
}
