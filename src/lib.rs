//! Connector execution bridge.
//!
//! Receives integration requests issued by waiting process activities, runs
//! the matching action handler, and sends back a result carrying the
//! request's correlation token so the engine can resume the activity.

pub mod config;
pub mod consts;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod result;
pub mod transport;
pub mod variables;

pub use config::ConnectorConfig;
pub use dispatcher::{DispatchConfig, DispatchState, Dispatcher, ServeSummary};
pub use error::{BridgeError, Result};
pub use handlers::{ActionHandler, HandlerRegistry, HandlerRegistryBuilder};
pub use model::{ConnectorOrigin, IntegrationRequest, IntegrationResult};
pub use result::{ResultBuilder, build_result};
pub use transport::ResultSender;
pub use variables::VariableStore;
