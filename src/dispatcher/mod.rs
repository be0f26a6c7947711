//! Routes integration requests to action handlers and forwards the
//! correlated results to the result sender.
//!
//! Each request moves `Received → Routed → Completed`, or ends in `Failed`.
//! Requests share nothing but the read-only registry and connector config, so
//! results may leave in a different order than requests arrived; the
//! correlation token is what ties them back together.

use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::ConnectorConfig;
use crate::consts::DEFAULT_MAX_IN_FLIGHT;
use crate::error::{BridgeError, Result};
use crate::events::{DispatchEvent, EventBus};
use crate::handlers::{ActionHandler, HandlerRegistry};
use crate::model::{IntegrationRequest, IntegrationResult};
use crate::result::build_result;
use crate::transport::{InboundMessage, ResultSender};
use crate::variables::VariableStore;

/// Lifecycle of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Routed,
    Completed,
    Failed,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Received => "received",
            Self::Routed => "routed",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Upper bound on a single handler invocation. `None` waits indefinitely.
    pub handler_timeout: Option<Duration>,
    /// Requests [`Dispatcher::serve`] runs at once; further messages wait in
    /// the inbound channel. Treated as at least 1.
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout: None,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Tally returned by [`Dispatcher::serve`] once the inbound channel closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub completed: usize,
    pub failed: usize,
}

/// Wires a handler registry, connector config and result sender together.
/// Cloning is cheap; clones share the same registry, config and sender.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    config: Arc<ConnectorConfig>,
    sender: Arc<dyn ResultSender>,
    events: EventBus,
    settings: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        config: Arc<ConnectorConfig>,
        sender: Arc<dyn ResultSender>,
    ) -> Self {
        Self {
            registry,
            config,
            sender,
            events: EventBus::default(),
            settings: DispatchConfig::default(),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_settings(mut self, settings: DispatchConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Handle one request to a terminal state. On success the returned result
    /// is the one already handed to the sender.
    pub async fn dispatch(&self, request: IntegrationRequest) -> Result<IntegrationResult> {
        let outcome = self.process(&request).await;
        self.report(&request, &outcome);
        outcome
    }

    /// Dispatch a batch concurrently. Outcomes are returned in input order,
    /// but results reach the sender as soon as each handler finishes.
    pub async fn dispatch_all(
        &self,
        requests: Vec<IntegrationRequest>,
    ) -> Vec<Result<IntegrationResult>> {
        join_all(requests.into_iter().map(|request| self.dispatch(request))).await
    }

    /// Dispatch on its own task.
    pub fn spawn(&self, request: IntegrationRequest) -> JoinHandle<Result<IntegrationResult>> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(request).await })
    }

    /// Serve the inbound channel until it closes, one task per message.
    /// In-flight requests are drained before returning.
    pub async fn serve(&self, mut inbound: mpsc::Receiver<InboundMessage>) -> ServeSummary {
        let mut summary = ServeSummary::default();
        let mut in_flight: JoinSet<bool> = JoinSet::new();
        let limit = self.settings.max_in_flight.clamp(1, Semaphore::MAX_PERMITS);
        let permits = Arc::new(Semaphore::new(limit));

        info!(
            service_name = self.config.service_name(),
            actions = ?self.registry.actions(),
            max_in_flight = limit,
            "dispatcher serving"
        );

        loop {
            tokio::select! {
                message = inbound.recv() => match message {
                    Some(Ok(request)) => {
                        // The semaphore is never closed, so this only waits.
                        let permit = Arc::clone(&permits).acquire_owned().await.ok();
                        let dispatcher = self.clone();
                        in_flight.spawn(async move {
                            let completed = dispatcher.dispatch(request).await.is_ok();
                            drop(permit);
                            completed
                        });
                    }
                    Some(Err(err)) => {
                        self.reject(err);
                        summary.failed += 1;
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    self.tally(&mut summary, joined);
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            self.tally(&mut summary, joined);
        }

        info!(
            completed = summary.completed,
            failed = summary.failed,
            "inbound channel closed"
        );
        summary
    }

    /// Report a message the transport could not decode into a request.
    pub fn reject(&self, err: BridgeError) {
        warn!(state = %DispatchState::Failed, kind = err.kind(), error = %err, "undecodable request");
        self.events.emit(DispatchEvent::Failed {
            correlation_id: None,
            action: String::new(),
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    async fn process(&self, request: &IntegrationRequest) -> Result<IntegrationResult> {
        let correlation_id = request.correlation_token()?;
        debug!(
            state = %DispatchState::Received,
            correlation_id,
            process_instance_id = request.process_instance(),
            action = %request.action_name,
            "request received"
        );

        let handler = self.registry.resolve(&request.action_name)?;
        debug!(
            state = %DispatchState::Routed,
            correlation_id,
            action = handler.action(),
            "request routed"
        );

        let outbound = self.run_handler(handler.as_ref(), request, correlation_id).await?;
        let result = build_result(request, outbound, &self.config)?;

        self.sender
            .send(result.clone())
            .map_err(|e| BridgeError::Delivery {
                correlation_id: correlation_id.to_string(),
                reason: format!("{e:#}"),
            })?;

        Ok(result)
    }

    async fn run_handler(
        &self,
        handler: &dyn ActionHandler,
        request: &IntegrationRequest,
        correlation_id: &str,
    ) -> Result<VariableStore> {
        let execution = AssertUnwindSafe(handler.execute(request))
            .catch_unwind()
            .map(|caught| match caught {
                Ok(outcome) => outcome,
                Err(payload) => Err(anyhow::anyhow!(
                    "handler panicked: {}",
                    panic_message(&*payload)
                )),
            });
        let outcome = match self.settings.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(outcome) => outcome,
                Err(_) => Err(anyhow::anyhow!("timed out after {limit:?}")),
            },
            None => execution.await,
        };

        outcome.map_err(|e| BridgeError::HandlerExecution {
            action: request.action_name.clone(),
            correlation_id: correlation_id.to_string(),
            reason: format!("{e:#}"),
        })
    }

    fn report(&self, request: &IntegrationRequest, outcome: &Result<IntegrationResult>) {
        match outcome {
            Ok(result) => {
                info!(
                    state = %DispatchState::Completed,
                    correlation_id = %result.correlation_id,
                    process_instance_id = request.process_instance(),
                    action = %request.action_name,
                    outbound = result.outbound_variables.len(),
                    "result handed to sender"
                );
                self.events.emit(DispatchEvent::Completed {
                    correlation_id: result.correlation_id.clone(),
                    action: request.action_name.clone(),
                });
            }
            Err(err) => {
                error!(
                    state = %DispatchState::Failed,
                    correlation_id = request.correlation_id.as_deref().unwrap_or_default(),
                    process_instance_id = request.process_instance(),
                    action = %request.action_name,
                    kind = err.kind(),
                    error = %err,
                    "request failed"
                );
                self.events.emit(DispatchEvent::Failed {
                    correlation_id: request.correlation_id.clone().filter(|id| !id.is_empty()),
                    action: request.action_name.clone(),
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        }
    }
}

impl Dispatcher {
    fn tally(
        &self,
        summary: &mut ServeSummary,
        joined: std::result::Result<bool, tokio::task::JoinError>,
    ) {
        match joined {
            Ok(true) => summary.completed += 1,
            Ok(false) => summary.failed += 1,
            Err(err) => {
                error!(state = %DispatchState::Failed, error = %err, "dispatch task aborted");
                self.events.emit(DispatchEvent::Failed {
                    correlation_id: None,
                    action: String::new(),
                    kind: "task_aborted",
                    message: err.to_string(),
                });
                summary.failed += 1;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
