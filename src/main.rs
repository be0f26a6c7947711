use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use connector_bridge::consts::{
    DEFAULT_INBOUND_CAPACITY, DEFAULT_LOG_LEVEL, DEFAULT_MAX_IN_FLIGHT, SERVICE_NAME_ENV, VERSION,
};
use connector_bridge::transport::stdio::{self, JsonLinesSender};
use connector_bridge::{
    BridgeError, ConnectorConfig, DispatchConfig, Dispatcher, HandlerRegistryBuilder, logging,
};

#[derive(Parser)]
#[command(
    name = "connector-bridge",
    version,
    about = "Runs connector actions for process-engine integration requests."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Connector service name stamped on every result; overrides the config file
    #[arg(short, long, env = SERVICE_NAME_ENV)]
    service_name: Option<String>,

    /// Connector service version stamped on every result
    #[arg(long)]
    service_version: Option<String>,

    /// JSON file with serviceName, serviceVersion and connector properties
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request handler timeout in seconds (unbounded when omitted)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Requests handled concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    max_in_flight: usize,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// List the actions this connector serves
    Actions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let registry = Arc::new(HandlerRegistryBuilder::with_builtins().build()?);

    if let Some(Command::Actions) = cli.command {
        print!("{}", registry.help_text());
        return Ok(());
    }

    let config = Arc::new(load_config(&cli)?);
    let settings = DispatchConfig {
        handler_timeout: cli.timeout.map(Duration::from_secs),
        max_in_flight: cli.max_in_flight,
    };

    let (sender, writer) = JsonLinesSender::spawn(tokio::io::stdout());
    let dispatcher =
        Dispatcher::new(registry, Arc::clone(&config), Arc::new(sender)).with_settings(settings);

    let (tx, rx) = mpsc::channel(DEFAULT_INBOUND_CAPACITY);
    let reader = tokio::spawn(stdio::read_requests(BufReader::new(tokio::io::stdin()), tx));

    info!(
        service_name = config.service_name(),
        version = VERSION,
        "reading requests from stdin"
    );

    let interrupted = tokio::select! {
        summary = dispatcher.serve(rx) => {
            info!(completed = summary.completed, failed = summary.failed, "done");
            false
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, in-flight requests abandoned");
            true
        }
    };

    if interrupted {
        reader.abort();
    } else {
        match reader.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(error = %format!("{e:#}"), "request reader failed"),
            Err(e) => error!(error = %e, "request reader aborted"),
        }
    }

    // The writer finishes once the last sender handle is gone.
    drop(dispatcher);
    writer.await??;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConnectorConfig, BridgeError> {
    let mut config = match (&cli.config, &cli.service_name) {
        (Some(path), Some(name)) => {
            ConnectorConfig::from_json_file(path)?.with_service_name(name.as_str())?
        }
        (Some(path), None) => ConnectorConfig::from_json_file(path)?,
        (None, Some(name)) => ConnectorConfig::new(name.as_str())?,
        (None, None) => {
            return Err(BridgeError::configuration(format!(
                "a service name is required (--service-name, {SERVICE_NAME_ENV} or --config)"
            )));
        }
    };
    if let Some(version) = &cli.service_version {
        config = config.with_version(version.as_str());
    }
    Ok(config)
}
