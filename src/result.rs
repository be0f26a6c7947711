//! Builds the correlated result for a handled request.
//!
//! The builder is pure: the same request, variables and config always yield
//! an equal [`IntegrationResult`]. Outbound variables are attached as given;
//! whether their names match the process definition is checked downstream.

use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::model::{IntegrationRequest, IntegrationResult};
use crate::variables::VariableStore;

/// Fluent result construction: `ResultBuilder::result_for(&req, &cfg).with_outbound_variables(v).build()`.
pub struct ResultBuilder<'a> {
    request: &'a IntegrationRequest,
    config: &'a ConnectorConfig,
    outbound: VariableStore,
}

impl<'a> ResultBuilder<'a> {
    pub fn result_for(request: &'a IntegrationRequest, config: &'a ConnectorConfig) -> Self {
        Self {
            request,
            config,
            outbound: VariableStore::new(),
        }
    }

    pub fn with_outbound_variables(mut self, variables: VariableStore) -> Self {
        self.outbound = variables;
        self
    }

    /// Fails with `MalformedRequest` when the correlation token is absent or empty.
    pub fn build(self) -> Result<IntegrationResult> {
        let correlation_id = self.request.correlation_token()?.to_string();

        Ok(IntegrationResult {
            correlation_id,
            process_instance_id: self.request.process_instance_id.clone(),
            process_definition_id: self.request.process_definition_id.clone(),
            activity_element_id: self.request.activity_element_id.clone(),
            business_key: self.request.business_key.clone(),
            target_service: self.request.origin_service.clone(),
            connector: self.config.origin(&self.request.action_name),
            outbound_variables: self.outbound,
        })
    }
}

/// Function form of [`ResultBuilder`].
pub fn build_result(
    request: &IntegrationRequest,
    outbound: VariableStore,
    config: &ConnectorConfig,
) -> Result<IntegrationResult> {
    ResultBuilder::result_for(request, config)
        .with_outbound_variables(outbound)
        .build()
}
