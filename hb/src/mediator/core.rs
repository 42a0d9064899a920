//! Mediator - correlates requests and responses over one channel

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Semaphore, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::MediatorConfig;
use super::error::MediatorError;
use super::metrics::{Counters, MediatorMetrics};
use super::pending::{InsertError, PendingGuard, PendingTable, Resolution};
use crate::channel::{Channel, ChannelError};
use crate::commands::Command;
use crate::correlation::CorrelationIdGenerator;
use crate::handlers::{CommandHandler, HandlerRegistry, RequestHandler, Typed};
use crate::message::{CorrelationId, Message, MessageType};

/// Ids drawn before giving up on a pending-id collision
const MAX_ID_ATTEMPTS: usize = 8;

struct Inner {
    config: MediatorConfig,
    channel: Box<dyn Channel>,
    ids: CorrelationIdGenerator,
    handlers: HandlerRegistry,
    pending: PendingTable,
    permits: Semaphore,
    reports: broadcast::Sender<MediatorError>,
    counters: Counters,
}

/// One side of the bridge
///
/// Sends requests and awaits their correlated responses, and answers incoming
/// requests with registered handlers. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

impl Mediator {
    /// Create a mediator sending on `channel`
    ///
    /// Nothing is received until [`run`](Self::run) or [`spawn`](Self::spawn)
    /// is given the channel's inbound stream.
    pub fn new(channel: impl Channel + 'static, config: MediatorConfig) -> Self {
        Self::with_id_generator(channel, config, CorrelationIdGenerator::new())
    }

    /// Create a mediator with a custom correlation id generator
    pub fn with_id_generator(channel: impl Channel + 'static, config: MediatorConfig, ids: CorrelationIdGenerator) -> Self {
        debug!(?config, "Mediator::new: called");
        let (reports, _) = broadcast::channel(config.report_buffer.max(1));
        Self {
            inner: Arc::new(Inner {
                permits: Semaphore::new(config.max_concurrent_handlers.max(1)),
                pending: PendingTable::new(config.abandoned_capacity),
                config,
                channel: Box::new(channel),
                ids,
                handlers: HandlerRegistry::new(),
                reports,
                counters: Counters::default(),
            }),
        }
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.inner.config
    }

    /// Register `handler` for `command`, replacing any previous one
    pub fn add_handler(&self, command: impl Into<String>, handler: impl RequestHandler + 'static) -> &Self {
        self.inner.handlers.register(command, Arc::new(handler));
        self
    }

    /// Register a typed handler for command `C`
    pub fn add_command<C: Command>(&self, handler: impl CommandHandler<C> + 'static) -> &Self {
        self.add_handler(C::NAME, Typed::<C, _>::new(handler))
    }

    /// Commands this side answers
    pub fn commands(&self) -> Vec<String> {
        self.inner.handlers.commands()
    }

    /// Send `body` as a `command` request and wait for the peer's response
    ///
    /// There is no timeout: if the peer has no handler, or its handler fails,
    /// this never completes. Use [`request_within`](Self::request_within) to
    /// bound the wait.
    pub async fn request<Req, Res>(&self, command: &str, body: &Req) -> Result<Res, MediatorError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.exchange(command, body, None).await
    }

    /// [`request`](Self::request) bounded by `timeout`
    ///
    /// On timeout the pending entry is abandoned; a response arriving later is
    /// ignored.
    pub async fn request_within<Req, Res>(&self, command: &str, body: &Req, timeout: Duration) -> Result<Res, MediatorError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.exchange(command, body, Some(timeout)).await
    }

    /// [`request_within`](Self::request_within) using the configured timeout
    pub async fn request_with_default_timeout<Req, Res>(&self, command: &str, body: &Req) -> Result<Res, MediatorError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.exchange(command, body, Some(self.inner.config.request_timeout()))
            .await
    }

    /// Typed request for command `C`
    pub async fn send<C: Command>(&self, request: &C::Request) -> Result<C::Response, MediatorError> {
        self.request(C::NAME, request).await
    }

    /// Typed request for command `C` bounded by `timeout`
    pub async fn send_within<C: Command>(
        &self,
        request: &C::Request,
        timeout: Duration,
    ) -> Result<C::Response, MediatorError> {
        self.request_within(C::NAME, request, timeout).await
    }

    async fn exchange<Req, Res>(
        &self,
        command: &str,
        body: &Req,
        timeout: Option<Duration>,
    ) -> Result<Res, MediatorError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        debug!(%command, ?timeout, "Mediator::request: called");
        if self.is_closed() {
            return Err(ChannelError::Closed.into());
        }

        let body = serde_json::to_value(body).map_err(|e| MediatorError::Codec {
            command: command.to_string(),
            message: e.to_string(),
        })?;

        let deadline = timeout.map(|t| Instant::now() + t);
        let (tx, rx) = oneshot::channel();
        let correlation_id = self.allocate(tx)?;
        // Dropping this future at any await below abandons the entry
        let _guard = PendingGuard::new(&self.inner.pending, correlation_id);

        let message = Message::request(command, correlation_id, body);
        match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.inner.channel.send(message)).await {
                Ok(sent) => sent?,
                Err(_) => return Err(self.timed_out(command, correlation_id, timeout)),
            },
            None => self.inner.channel.send(message).await?,
        }
        Counters::incr(&self.inner.counters.requests_sent);
        debug!(%command, correlation_id, "Mediator::request: waiting for response");

        let received = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, rx).await {
                Ok(received) => received,
                Err(_) => return Err(self.timed_out(command, correlation_id, timeout)),
            },
            None => rx.await,
        };

        let response = received.map_err(|_| MediatorError::ResponseMissing {
            command: command.to_string(),
            correlation_id,
        })?;
        debug!(%command, correlation_id, "Mediator::request: resolved");

        serde_json::from_value(response).map_err(|e| MediatorError::Codec {
            command: command.to_string(),
            message: e.to_string(),
        })
    }

    fn allocate(&self, mut waiter: oneshot::Sender<Value>) -> Result<CorrelationId, MediatorError> {
        let mut correlation_id = 0;
        for _ in 0..MAX_ID_ATTEMPTS {
            correlation_id = self.inner.ids.next();
            match self.inner.pending.insert(correlation_id, waiter) {
                Ok(()) => return Ok(correlation_id),
                Err(InsertError::Duplicate(returned)) => {
                    warn!(correlation_id, "Correlation id already pending, drawing another");
                    waiter = returned;
                }
                Err(InsertError::Closed) => return Err(ChannelError::Closed.into()),
            }
        }
        Err(MediatorError::DuplicateCorrelationId { correlation_id })
    }

    fn timed_out(&self, command: &str, correlation_id: CorrelationId, timeout: Option<Duration>) -> MediatorError {
        Counters::incr(&self.inner.counters.timeouts);
        let timeout_ms = timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
        warn!(%command, correlation_id, timeout_ms, "Request timed out");
        MediatorError::Timeout {
            command: command.to_string(),
            correlation_id,
            timeout_ms,
        }
    }

    /// Dispatch one inbound message
    ///
    /// Requests are handed to their handler on a separate task, so this never
    /// waits on handler work; it must be called within a tokio runtime.
    /// Errors concern only this message. [`run`](Self::run) reports them; direct
    /// callers get them back.
    pub fn on_message(&self, message: Message) -> Result<(), MediatorError> {
        debug!(
            message_type = %message.message_type(),
            command = %message.command(),
            correlation_id = message.correlation_id(),
            "Mediator::on_message: called"
        );
        match message.message_type() {
            MessageType::Request => self.dispatch_request(message),
            MessageType::Response => self.resolve_response(message),
            MessageType::Unrecognized(message_type) => {
                Counters::incr(&self.inner.counters.unrecognized_messages);
                Err(MediatorError::UnrecognizedMessageType {
                    message_type: message_type.clone(),
                    correlation_id: message.correlation_id(),
                })
            }
        }
    }

    fn dispatch_request(&self, message: Message) -> Result<(), MediatorError> {
        let Some(handler) = self.inner.handlers.resolve(message.command()) else {
            Counters::incr(&self.inner.counters.missing_handlers);
            return Err(MediatorError::NoHandlerRegistered {
                command: message.command().to_string(),
                correlation_id: message.correlation_id(),
            });
        };

        let mediator = self.clone();
        tokio::spawn(async move {
            mediator.handle_request(handler, message).await;
        });
        Ok(())
    }

    async fn handle_request(&self, handler: Arc<dyn RequestHandler>, mut request: Message) {
        let Ok(_permit) = self.inner.permits.acquire().await else {
            return;
        };

        debug!(command = %request.command(), correlation_id = request.correlation_id(), "Mediator: invoking handler");
        let body = std::mem::take(&mut request.body);
        match handler.handle(body).await {
            Ok(response) => {
                Counters::incr(&self.inner.counters.requests_handled);
                if let Err(e) = self.inner.channel.send(request.reply(response)).await {
                    self.report(e.into());
                }
            }
            Err(e) => {
                Counters::incr(&self.inner.counters.handler_failures);
                self.report(MediatorError::HandlerFailure {
                    command: request.headers.command,
                    correlation_id: request.headers.correlation_id,
                    message: format!("{:#}", e),
                });
            }
        }
    }

    fn resolve_response(&self, message: Message) -> Result<(), MediatorError> {
        let Message { headers, body } = message;
        match self.inner.pending.resolve(headers.correlation_id, body) {
            Resolution::Delivered => {
                Counters::incr(&self.inner.counters.responses_received);
                Ok(())
            }
            Resolution::Late => {
                Counters::incr(&self.inner.counters.late_responses);
                debug!(
                    command = %headers.command,
                    correlation_id = headers.correlation_id,
                    "Ignoring response for abandoned request"
                );
                Ok(())
            }
            Resolution::Unknown => {
                Counters::incr(&self.inner.counters.unknown_correlation_ids);
                Err(MediatorError::UnknownCorrelationId {
                    command: headers.command,
                    correlation_id: headers.correlation_id,
                })
            }
        }
    }

    fn report(&self, error: MediatorError) {
        match &error {
            MediatorError::HandlerFailure { .. } | MediatorError::Channel(_) => {
                error!(kind = error.kind(), "{}", error)
            }
            _ => warn!(kind = error.kind(), "{}", error),
        }
        // No subscribers is fine
        let _ = self.inner.reports.send(error);
    }

    /// Subscribe to errors raised in the receive context
    pub fn reports(&self) -> broadcast::Receiver<MediatorError> {
        self.inner.reports.subscribe()
    }

    /// Drain `inbound` until it ends
    ///
    /// When the stream ends, requests still waiting fail with `ResponseMissing`
    /// and new requests are refused. Closing and releasing happen under one
    /// lock, so a request allocating concurrently is either released or refused.
    pub async fn run(self, mut inbound: mpsc::Receiver<Message>) {
        info!("Mediator receive loop started");

        while let Some(message) = inbound.recv().await {
            if let Err(e) = self.on_message(message) {
                self.report(e);
            }
        }

        let released = self.inner.pending.release_all();
        info!(released, "Mediator receive loop stopped");
    }

    /// Run the receive loop on its own task
    pub fn spawn(&self, inbound: mpsc::Receiver<Message>) -> JoinHandle<()> {
        tokio::spawn(self.clone().run(inbound))
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.pending.is_closed()
    }

    pub fn metrics(&self) -> MediatorMetrics {
        self.inner
            .counters
            .snapshot(self.inner.pending.len(), self.inner.handlers.len())
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("commands", &self.commands())
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
