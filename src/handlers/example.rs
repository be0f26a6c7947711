use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{ActionHandler, trace_inbound};
use crate::consts::{EXAMPLE_ACTION, EXAMPLE_CONNECTOR_ACTION};
use crate::model::IntegrationRequest;
use crate::variables::VariableStore;

/// Echoes inbound variables to the log and answers with two fixed outputs:
/// one the process maps onto a variable and one it does not.
pub struct ExampleActionHandler;

#[async_trait]
impl ActionHandler for ExampleActionHandler {
    fn action(&self) -> &str {
        EXAMPLE_ACTION
    }

    fn description(&self) -> &str {
        "log inbound variables and return a matching and a non-matching output"
    }

    async fn execute(&self, request: &IntegrationRequest) -> Result<VariableStore> {
        info!(
            process_instance_id = request.process_instance(),
            variables = request.inbound_variables.len(),
            "example action called"
        );
        trace_inbound(request);

        Ok(VariableStore::new()
            .with("output-variable-name-1", "output-variable-name-1")
            .with("output-no-match", "output-no-match"))
    }
}

/// Reports which process instance called it through the `var1` output.
pub struct ExampleConnectorHandler;

#[async_trait]
impl ActionHandler for ExampleConnectorHandler {
    fn action(&self) -> &str {
        EXAMPLE_CONNECTOR_ACTION
    }

    fn description(&self) -> &str {
        "return var1 naming the calling process instance"
    }

    async fn execute(&self, request: &IntegrationRequest) -> Result<VariableStore> {
        let var1 = format!(
            "ExampleConnector was called for instance {}",
            request.process_instance()
        );
        info!(process_instance_id = request.process_instance(), "example connector called");

        Ok(VariableStore::new().with("var1", var1))
    }
}
