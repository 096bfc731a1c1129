//! Transport senders.
//!
//! The sender boundary is the only asynchronous point of the framework:
//! assembly is always synchronous and eager, dispatch awaits the transport.
//! HTTP-level error statuses still come back as a `Response` (carrying the
//! status text as transport-error context); only connectivity failures are
//! returned as errors.

use crate::body::DataType;
use crate::error::CourierError;
use crate::pending::PendingRequest;
use crate::response::{RawResponse, Response};
use async_trait::async_trait;
use std::time::Duration;

/// Pluggable transport. Implementations must convert HTTP error responses
/// into a `Response`-shaped value and only error on connectivity failures.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn dispatch(&self, pending: &PendingRequest) -> Result<Response, CourierError>;
}

/// Sender backed by a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_request(
        &self,
        pending: &PendingRequest,
    ) -> Result<reqwest::RequestBuilder, CourierError> {
        let mut rb = self
            .client
            .request(pending.method().clone(), pending.url());

        for (name, value) in pending.headers().iter() {
            rb = rb.header(name, value);
        }

        if !pending.query().is_empty() {
            let pairs: Vec<(&str, &String)> = pending.query().iter().collect();
            rb = rb.query(&pairs);
        }

        // Per-request timeout from merged config, in seconds.
        if let Some(timeout) = pending.config().get("timeout").and_then(|v| v.as_u64()) {
            rb = rb.timeout(Duration::from_secs(timeout));
        }

        rb = match pending.body().data_type() {
            None => rb,
            Some(DataType::Json) => {
                let map: serde_json::Map<String, serde_json::Value> = pending
                    .body()
                    .fields()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                rb.json(&serde_json::Value::Object(map))
            }
            Some(DataType::Form) => {
                let pairs: Vec<(String, String)> = pending
                    .body()
                    .fields()
                    .iter()
                    .map(|(k, v)| (k.to_string(), form_value(v)))
                    .collect();
                rb.form(&pairs)
            }
            Some(DataType::Multipart) => {
                let mut form = reqwest::multipart::Form::new();
                for (k, v) in pending.body().fields().iter() {
                    form = form.text(k.to_string(), form_value(v));
                }
                rb.multipart(form)
            }
            Some(raw_type @ (DataType::Mixed | DataType::Xml)) => {
                let body = pending.body().raw().unwrap_or_default().to_vec();
                if !pending.headers().contains("content-type") {
                    if let Some(content_type) = raw_type.default_content_type() {
                        rb = rb.header("content-type", content_type);
                    }
                }
                rb.body(body)
            }
        };

        Ok(rb)
    }
}

/// Render a body field for urlencoded/multipart forms: plain strings go
/// verbatim, everything else as compact JSON.
fn form_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Sender for ReqwestSender {
    async fn dispatch(&self, pending: &PendingRequest) -> Result<Response, CourierError> {
        let rb = self.build_request(pending)?;

        tracing::debug!(
            target: "courier::http",
            request_id = %pending.request_id(),
            method = %pending.method(),
            url = %pending.url_with_query(),
            "dispatching"
        );

        let resp = rb
            .send()
            .await
            .map_err(|e| CourierError::HttpError(e.to_string()))?;

        let status = resp.status();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|value| (k.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = resp
            .bytes()
            .await
            .map_err(|e| CourierError::HttpError(e.to_string()))?
            .to_vec();

        let transport_error = if status.is_client_error() || status.is_server_error() {
            Some(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("HTTP error")
            ))
        } else {
            None
        };

        tracing::debug!(
            target: "courier::http",
            request_id = %pending.request_id(),
            status = status.as_u16(),
            "response received"
        );

        Ok(Response::build(
            pending,
            RawResponse::new(status.as_u16(), headers, body),
            transport_error,
        ))
    }
}
