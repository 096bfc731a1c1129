//! Request declarations.
//!
//! A request describes a single endpoint, merged on top of its connector. Its
//! declarations are symmetric to the connector's; on collision the request
//! wins. `HasResponse` lets a request select a typed response decoding.

use crate::auth::Authenticator;
use crate::body::DataType;
use crate::connector::RequestProperties;
use crate::error::CourierError;
use crate::mock::MockClient;
use crate::pending::PendingRequest;
use crate::response::Response;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Single-endpoint descriptor.
pub trait Request: Send + Sync {
    fn method(&self) -> Method;

    /// Endpoint path resolved against the connector's base URL. Absolute
    /// URLs (`http://` / `https://`) bypass the base URL entirely.
    fn endpoint(&self) -> String;

    /// Properties merged over the connector's defaults.
    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new()
    }

    /// Declared body-encoding capabilities, in declaration order. A request
    /// declaration takes precedence over the connector's; conflicting
    /// declarations fail assembly.
    fn body_capabilities(&self) -> &[DataType] {
        &[]
    }

    /// Declared plugin capability tags, booted after the connector's.
    fn capabilities(&self) -> &[&'static str] {
        &[]
    }

    /// Request-level authenticator; overrides the connector's.
    fn authenticator(&self) -> Option<Arc<dyn Authenticator>> {
        None
    }

    /// Request-level mock client; overrides the connector's.
    fn mock_client(&self) -> Option<Arc<dyn MockClient>> {
        None
    }

    /// Boot hook, run after the connector's hook, before plugin boot.
    fn boot(&self, _pending: &mut PendingRequest) -> Result<(), CourierError> {
        Ok(())
    }
}

/// Response-type selector for requests with a known body shape.
pub trait HasResponse {
    type Output: DeserializeOwned;

    /// Map the final response into the typed output. Default: decode the
    /// body as JSON.
    fn map_response(response: &Response) -> Result<Self::Output, CourierError> {
        response.json()
    }
}
