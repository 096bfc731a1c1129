//! The pending-request assembler.
//!
//! One deterministic construction sequence, each step performed exactly once:
//! URL resolution, property merge, data-type resolution and body merge,
//! authentication, connector/request boot hooks, plugin boot, default
//! middleware registration (mock pipe first), declared-middleware merge
//! (connector before request), request-pipeline execution. Any failure
//! aborts the build; no partially built request escapes.

use crate::body::{self, DataType};
use crate::connector::{Connector, RequestProperties};
use crate::error::CourierError;
use crate::middleware::PipeOrder;
use crate::mock::MockPipe;
use crate::pending::PendingRequest;
use crate::plugins::{self, PluginRegistry};
use crate::request::Request;
use std::sync::Arc;

/// Build a fully resolved, ready-to-send pending request from a
/// (connector, request) pair.
///
/// The returned request either has an early response set (check
/// [`PendingRequest::has_early_response`]) or is ready for a sender's
/// dispatch; either way the caller finishes by passing the response through
/// [`PendingRequest::execute_response_pipeline`].
pub fn build_pending_request(
    registry: &PluginRegistry,
    connector: &dyn Connector,
    request: &dyn Request,
) -> Result<PendingRequest, CourierError> {
    let connector_props = connector.request_properties();
    let request_props = request.request_properties();

    let url = resolve_url(&connector.base_url(), &request.endpoint());
    let mut pending = PendingRequest::new(request.method(), url);

    tracing::debug!(
        target: "courier::build",
        request_id = %pending.request_id(),
        method = %pending.method(),
        url = %pending.url(),
        "assembling pending request"
    );

    // 1. Merge property bags, connector first so the request wins.
    pending
        .headers_mut()
        .merge([Some(&connector_props.headers), Some(&request_props.headers)]);
    pending
        .query_mut()
        .merge([Some(&connector_props.query), Some(&request_props.query)]);
    pending
        .config_mut()
        .merge([Some(&connector_props.config), Some(&request_props.config)]);

    // 2. Resolve the body encoding and merge body data accordingly.
    let data_type = resolve_data_type(connector, request)?;
    apply_body(&mut pending, data_type, &connector_props, &request_props)?;

    // 3. Authenticate: request-level authenticator wins.
    if let Some(authenticator) = request
        .authenticator()
        .or_else(|| connector.authenticator())
    {
        authenticator.apply(&mut pending)?;
    }

    // 4. Boot hooks: connector, then request, then plugins.
    connector.boot(&mut pending)?;
    request.boot(&mut pending)?;
    plugins::boot_all(registry, &mut pending, connector, request)?;

    // 5. Default middleware. The mock pipe always runs first.
    if let Some(mock) = request.mock_client().or_else(|| connector.mock_client()) {
        pending.set_mock_client(mock.clone());
        pending
            .middleware_mut()
            .add_request_pipe(Arc::new(MockPipe::new(mock)), PipeOrder::Prepend);
    }

    // 6. Declared middleware, connector's before the request's.
    pending.middleware_mut().merge(&connector_props.middleware);
    pending.middleware_mut().merge(&request_props.middleware);

    // 7. Run the request pipeline. Pipes all run even after an early
    //    response is set; the dispatcher checks the slot afterwards.
    pending.run_request_pipeline()?;

    Ok(pending)
}

/// Resolve the effective body encoding from request and connector
/// declarations. The request is inspected first; a connector declaration that
/// conflicts with the request's fails the build.
pub fn resolve_data_type(
    connector: &dyn Connector,
    request: &dyn Request,
) -> Result<Option<DataType>, CourierError> {
    let request_type = body::first_declared(request.body_capabilities());
    let connector_type = body::first_declared(connector.body_capabilities());

    match (connector_type, request_type) {
        (Some(c), Some(r)) if c != r => Err(CourierError::IncompatibleDataType {
            connector: c,
            request: r,
        }),
        _ => Ok(request_type.or(connector_type)),
    }
}

fn apply_body(
    pending: &mut PendingRequest,
    data_type: Option<DataType>,
    connector_props: &RequestProperties,
    request_props: &RequestProperties,
) -> Result<(), CourierError> {
    let has_fields = !connector_props.data.is_empty() || !request_props.data.is_empty();
    let has_raw = connector_props.raw_body.is_some() || request_props.raw_body.is_some();

    let Some(data_type) = data_type else {
        if has_fields || has_raw {
            return Err(CourierError::UndeclaredDataType);
        }
        return Ok(());
    };

    pending.body_mut().set_data_type(data_type)?;

    if data_type.supports_merging() {
        if has_raw {
            return Err(CourierError::ConfigurationError(format!(
                "raw body declared but resolved data type {data_type} carries body fields"
            )));
        }
        pending.body_mut().merge_fields(&connector_props.data);
        pending.body_mut().merge_fields(&request_props.data);
    } else {
        if has_fields {
            return Err(CourierError::ConfigurationError(format!(
                "body fields declared but resolved data type {data_type} carries a raw body"
            )));
        }
        // Raw bodies never merge: the request's body replaces the
        // connector's wholesale.
        if let Some(raw) = request_props
            .raw_body
            .as_ref()
            .or(connector_props.raw_body.as_ref())
        {
            pending.body_mut().set_raw(raw.clone())?;
        }
    }
    Ok(())
}

/// Join a request endpoint onto the connector's base URL. Absolute endpoints
/// pass through untouched.
fn resolve_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    if endpoint.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
