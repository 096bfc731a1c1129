//! Connector declarations.
//!
//! A connector is the reusable base configuration of one API: base URL,
//! default headers/query/config/body data, declared middleware, body-encoding
//! capabilities, plugin capability tags, and an optional authenticator or
//! mock client. Connectors are read-only templates; a single instance may
//! serve many concurrent pending-request builds.

use crate::auth::Authenticator;
use crate::bag::PropertyBag;
use crate::body::DataType;
use crate::error::CourierError;
use crate::middleware::{PipelineSpec, RequestPipe, ResponsePipe};
use crate::mock::MockClient;
use crate::pending::PendingRequest;
use serde_json::Value;
use std::sync::Arc;

/// Declared default properties of a connector or request, merged by the
/// assembler (connector first, request second).
#[derive(Clone, Default)]
pub struct RequestProperties {
    pub headers: PropertyBag<String>,
    pub query: PropertyBag<String>,
    pub config: PropertyBag<Value>,
    pub data: PropertyBag<Value>,
    pub raw_body: Option<Vec<u8>>,
    pub middleware: PipelineSpec,
}

impl RequestProperties {
    pub fn new() -> Self {
        Self {
            headers: PropertyBag::headers(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value.into());
        self
    }

    pub fn query_param(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.query.set(name, value.into());
        self
    }

    pub fn config(mut self, name: impl AsRef<str>, value: Value) -> Self {
        self.config.set(name, value);
        self
    }

    /// Structured body field (JSON/form/multipart bodies).
    pub fn data(mut self, name: impl AsRef<str>, value: Value) -> Self {
        self.data.set(name, value);
        self
    }

    /// Raw body bytes (mixed/XML bodies).
    pub fn raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    pub fn request_pipe(mut self, pipe: Arc<dyn RequestPipe>) -> Self {
        self.middleware = self.middleware.with_request_pipe(pipe);
        self
    }

    pub fn response_pipe(mut self, pipe: Arc<dyn ResponsePipe>) -> Self {
        self.middleware = self.middleware.with_response_pipe(pipe);
        self
    }
}

/// Reusable API base configuration.
pub trait Connector: Send + Sync {
    /// Base URL every request endpoint resolves against.
    fn base_url(&self) -> String;

    /// Default properties merged under every request's own properties.
    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new()
    }

    /// Declared body-encoding capabilities, in declaration order.
    fn body_capabilities(&self) -> &[DataType] {
        &[]
    }

    /// Declared plugin capability tags, in declaration order. Each tag must
    /// have a handler in the `PluginRegistry` handed to the assembler.
    fn capabilities(&self) -> &[&'static str] {
        &[]
    }

    /// Connector-level authenticator; overridden by a request-level one.
    fn authenticator(&self) -> Option<Arc<dyn Authenticator>> {
        None
    }

    /// Connector-level mock client; overridden by a request-level one.
    fn mock_client(&self) -> Option<Arc<dyn MockClient>> {
        None
    }

    /// Boot hook, run before plugin boot and before the request's own hook.
    fn boot(&self, _pending: &mut PendingRequest) -> Result<(), CourierError> {
        Ok(())
    }
}
