//! The `Courier` facade.
//!
//! Wires a plugin registry and a sender together and exposes the full
//! build → dispatch → response-pipeline cycle. The registry and sender are
//! explicit dependencies; nothing is resolved from ambient state.

use crate::build;
use crate::connector::Connector;
use crate::error::CourierError;
use crate::pending::PendingRequest;
use crate::plugins::PluginRegistry;
use crate::request::{HasResponse, Request};
use crate::response::Response;
use crate::sender::{ReqwestSender, Sender};
use std::sync::Arc;

/// API-client facade: a plugin registry plus a transport sender.
#[derive(Clone)]
pub struct Courier {
    registry: PluginRegistry,
    sender: Arc<dyn Sender>,
}

impl Courier {
    /// A courier with an empty registry and the default reqwest sender.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CourierBuilder {
        CourierBuilder::default()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Assemble a pending request without dispatching it, for callers that
    /// own the dispatch step themselves.
    pub fn build_pending_request(
        &self,
        connector: &dyn Connector,
        request: &dyn Request,
    ) -> Result<PendingRequest, CourierError> {
        build::build_pending_request(&self.registry, connector, request)
    }

    /// Full cycle: build, dispatch unless an early response was set, then run
    /// the response pipeline over the result.
    pub async fn send(
        &self,
        connector: &dyn Connector,
        request: &dyn Request,
    ) -> Result<Response, CourierError> {
        let mut pending = self.build_pending_request(connector, request)?;

        let response = match pending.take_early_response() {
            Some(early) => {
                tracing::debug!(
                    target: "courier::build",
                    request_id = %pending.request_id(),
                    status = early.status(),
                    "early response set, skipping dispatch"
                );
                early
            }
            None => self.sender.dispatch(&pending).await?,
        };

        pending.execute_response_pipeline(response)
    }

    /// `send` plus typed decoding via the request's response selector.
    pub async fn send_and_parse<R>(
        &self,
        connector: &dyn Connector,
        request: &R,
    ) -> Result<R::Output, CourierError>
    where
        R: Request + HasResponse,
    {
        let response = self.send(connector, request).await?;
        R::map_response(&response)
    }
}

impl Default for Courier {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Courier`].
#[derive(Default)]
pub struct CourierBuilder {
    registry: PluginRegistry,
    sender: Option<Arc<dyn Sender>>,
}

impl CourierBuilder {
    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a single plugin handler.
    pub fn plugin(mut self, tag: &'static str, plugin: Arc<dyn crate::plugins::Plugin>) -> Self {
        self.registry.register(tag, plugin);
        self
    }

    pub fn sender(mut self, sender: Arc<dyn Sender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn build(self) -> Courier {
        Courier {
            registry: self.registry,
            sender: self
                .sender
                .unwrap_or_else(|| Arc::new(ReqwestSender::new())),
        }
    }
}
