//! Wire model for integration requests coming from the process engine and
//! the correlated results sent back to it. Field names are camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};
use crate::variables::VariableStore;

/// One unit of delegated work issued by a waiting process activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRequest {
    /// Opaque token the engine uses to resume the waiting activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_key: Option<String>,
    /// Engine service that issued the request; replies are addressed to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_service: Option<String>,
    pub action_name: String,
    #[serde(default, alias = "inBoundVariables")]
    pub inbound_variables: VariableStore,
}

impl IntegrationRequest {
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            ..Self::default()
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_process_instance_id(mut self, id: impl Into<String>) -> Self {
        self.process_instance_id = Some(id.into());
        self
    }

    pub fn with_variables(mut self, variables: VariableStore) -> Self {
        self.inbound_variables = variables;
        self
    }

    /// Decode a request received from the inbound channel.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| BridgeError::malformed(e.to_string()))
    }

    /// The correlation token, or `MalformedRequest` if it is absent or empty.
    pub fn correlation_token(&self) -> Result<&str> {
        match self.correlation_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            Some(_) => Err(BridgeError::malformed("correlationId is empty")),
            None => Err(BridgeError::malformed("correlationId is missing")),
        }
    }

    /// Process instance id for log fields; empty when not supplied.
    pub fn process_instance(&self) -> &str {
        self.process_instance_id.as_deref().unwrap_or_default()
    }
}

/// Which connector produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorOrigin {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
    pub action_name: String,
    /// Connector properties from the config, stamped verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

/// Correlated output handed to the result sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResult {
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_service: Option<String>,
    pub connector: ConnectorOrigin,
    #[serde(default)]
    pub outbound_variables: VariableStore,
}

impl IntegrationResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_minimal_request() {
        let req = IntegrationRequest::from_json(
            r#"{"correlationId":"abc-1","processInstanceId":"pi-42","actionName":"example-action","inboundVariables":{"x":5}}"#,
        )
        .unwrap();

        assert_eq!(req.correlation_token().unwrap(), "abc-1");
        assert_eq!(req.process_instance(), "pi-42");
        assert_eq!(req.action_name, "example-action");
        assert_eq!(req.inbound_variables.get("x"), Some(&json!(5)));
    }

    #[test]
    fn missing_variables_decode_as_empty_store() {
        let req =
            IntegrationRequest::from_json(r#"{"correlationId":"c","actionName":"a"}"#).unwrap();
        assert!(req.inbound_variables.is_empty());
        assert_eq!(req.process_instance(), "");
    }

    #[test]
    fn accepts_legacy_variable_field_name() {
        let req = IntegrationRequest::from_json(
            r#"{"correlationId":"c","actionName":"a","inBoundVariables":{"k":"v"}}"#,
        )
        .unwrap();
        assert_eq!(req.inbound_variables.get("k"), Some(&json!("v")));
    }

    #[test]
    fn missing_action_is_malformed() {
        let err = IntegrationRequest::from_json(r#"{"correlationId":"c"}"#).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedRequest { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = IntegrationRequest::from_json("not json").unwrap_err();
        assert!(matches!(err, BridgeError::MalformedRequest { .. }));
    }

    #[test]
    fn correlation_token_rejects_absent_and_empty() {
        let absent = IntegrationRequest::new("a");
        assert!(absent.correlation_token().is_err());

        let empty = IntegrationRequest::new("a").with_correlation_id("");
        let err = empty.correlation_token().unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {err}");
    }

    #[test]
    fn result_omits_absent_fields() {
        let result = IntegrationResult {
            correlation_id: "c".to_string(),
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
        };

        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "correlationId": "c",
                "connector": {"serviceName": "svc", "actionName": "a"},
                "outboundVariables": {}
            })
        );
    }
}
