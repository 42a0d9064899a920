//! Handler trait definitions

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use eyre::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::commands::Command;

/// Produces a response body from a request body for one command
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle a request body
    ///
    /// An `Err` is reported on the receiving side; no response is sent.
    async fn handle(&self, body: Value) -> Result<Value>;
}

/// Handler built from an async closure
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`RequestHandler`]
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    async fn handle(&self, body: Value) -> Result<Value> {
        (self.f)(body).await
    }
}

/// Handler over the typed request/response of a [`Command`]
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, request: C::Request) -> Result<C::Response>;
}

/// Adapts a [`CommandHandler`] to the untyped [`RequestHandler`] contract
pub struct Typed<C, H> {
    handler: H,
    _command: PhantomData<fn() -> C>,
}

impl<C, H> Typed<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _command: PhantomData,
        }
    }
}

#[async_trait]
impl<C, H> RequestHandler for Typed<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle(&self, body: Value) -> Result<Value> {
        debug!(command = C::NAME, "Typed::handle: decoding request");
        let request: C::Request =
            serde_json::from_value(body).wrap_err_with(|| format!("Invalid {} request body", C::NAME))?;
        let response = self.handler.handle(request).await?;
        serde_json::to_value(response).wrap_err_with(|| format!("Failed to encode {} response", C::NAME))
    }
}
