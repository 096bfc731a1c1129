//! Response types.
//!
//! `RawResponse` is the transport-shaped value a sender or mock client hands
//! back; `Response` wraps it together with a snapshot of the originating
//! request and, for HTTP-level failures, the transport error text.

use crate::bag::PropertyBag;
use crate::error::CourierError;
use crate::pending::PendingRequest;
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Raw status/headers/body as produced by the transport or a mock client.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

/// Lightweight snapshot of the pending request a response originated from.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Final response object flowing through the response pipeline.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: PropertyBag<String>,
    body: Vec<u8>,
    request: RequestSnapshot,
    transport_error: Option<String>,
    received_at: chrono::DateTime<chrono::Utc>,
}

impl Response {
    /// Build a response from the transport shape, keeping a back-reference to
    /// the originating pending request.
    pub fn build(
        pending: &PendingRequest,
        raw: RawResponse,
        transport_error: Option<String>,
    ) -> Self {
        let mut headers = PropertyBag::headers();
        for (name, value) in raw.headers {
            headers.set(name, value);
        }
        Self {
            status: raw.status,
            headers,
            body: raw.body,
            request: pending.snapshot(),
            transport_error,
            received_at: chrono::Utc::now(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response header lookup (case-insensitive).
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    pub fn headers(&self) -> &PropertyBag<String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut PropertyBag<String> {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CourierError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The request this response answered.
    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }

    /// Transport error text for HTTP-level failures, when the sender could
    /// still produce a response-shaped value.
    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    pub fn received_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.received_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending() -> PendingRequest {
        PendingRequest::new(Method::GET, "https://api.example.com/x".to_string())
    }

    #[test]
    fn json_decodes_body() {
        let raw = RawResponse::new(
            200,
            vec![("Content-Type".into(), "application/json".into())],
            b"{\"ok\":true}".to_vec(),
        );
        let resp = Response::build(&pending(), raw, None);
        assert!(resp.is_success());
        assert_eq!(resp.header("content-type").unwrap(), "application/json");
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn error_status_keeps_transport_error_context() {
        let raw = RawResponse::new(503, vec![], b"unavailable".to_vec());
        let resp = Response::build(&pending(), raw, Some("503 Service Unavailable".into()));
        assert!(!resp.is_success());
        assert_eq!(resp.transport_error().unwrap(), "503 Service Unavailable");
        assert_eq!(resp.text(), "unavailable");
    }
}
