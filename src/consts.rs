//! Project-wide constants.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Action served by [`ExampleActionHandler`](crate::handlers::example::ExampleActionHandler).
pub const EXAMPLE_ACTION: &str = "example-action";

/// Action served by [`ExampleConnectorHandler`](crate::handlers::example::ExampleConnectorHandler).
pub const EXAMPLE_CONNECTOR_ACTION: &str = "example-connector";

/// Environment fallback for the connector service name.
pub const SERVICE_NAME_ENV: &str = "CONNECTOR_SERVICE_NAME";

/// Log level used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Buffered dispatch events per subscriber before the slowest one lags.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Inbound requests buffered between the transport reader and the dispatcher.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1024;

/// Requests a serving dispatcher runs concurrently before it stops pulling
/// from the inbound channel.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;
