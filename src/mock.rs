//! Request mocking and interception.
//!
//! A `MockClient` supplies recorded responses without touching the network.
//! When one is attached (request-level configuration wins over
//! connector-level), the assembler installs `MockPipe` as the first request
//! pipe; on a match it sets the early response, which makes the dispatcher
//! skip the real exchange.

use crate::error::CourierError;
use crate::middleware::RequestPipe;
use crate::pending::PendingRequest;
use crate::response::{RawResponse, Response};
use std::sync::Arc;

/// What the mock pipe does when no recorded response matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedBehavior {
    /// Fail the request with `MockMissing`.
    #[default]
    Error,
    /// Let the request continue to the real sender.
    Passthrough,
}

/// Source of recorded responses. The matching strategy belongs to the
/// implementation; the pipe only decides when a lookup happens.
pub trait MockClient: Send + Sync {
    fn find_match(&self, pending: &PendingRequest) -> Option<MockResponse>;

    fn is_empty(&self) -> bool;

    fn unmatched(&self) -> UnmatchedBehavior {
        UnmatchedBehavior::Error
    }
}

/// A recorded response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// 200 response with a JSON body.
    pub fn ok_json(body: serde_json::Value) -> Self {
        Self::new(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string().into_bytes())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub(crate) fn into_raw(self) -> RawResponse {
        RawResponse::new(self.status, self.headers, self.body)
    }
}

/// Mock client matching on exact `(method, url-without-query)`.
#[derive(Default)]
pub struct StaticMockClient {
    routes: Vec<(String, String, MockResponse)>,
    unmatched: UnmatchedBehavior,
}

impl StaticMockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response for `method url`.
    pub fn expect(
        mut self,
        method: reqwest::Method,
        url: impl Into<String>,
        response: MockResponse,
    ) -> Self {
        self.routes.push((method.to_string(), url.into(), response));
        self
    }

    pub fn on_unmatched(mut self, behavior: UnmatchedBehavior) -> Self {
        self.unmatched = behavior;
        self
    }
}

impl MockClient for StaticMockClient {
    fn find_match(&self, pending: &PendingRequest) -> Option<MockResponse> {
        self.routes
            .iter()
            .find(|(method, url, _)| method == pending.method().as_str() && url == pending.url())
            .map(|(_, _, response)| response.clone())
    }

    fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn unmatched(&self) -> UnmatchedBehavior {
        self.unmatched
    }
}

/// Request pipe that substitutes a recorded response for the network call.
pub struct MockPipe {
    client: Arc<dyn MockClient>,
}

impl MockPipe {
    pub fn new(client: Arc<dyn MockClient>) -> Self {
        Self { client }
    }
}

impl RequestPipe for MockPipe {
    fn name(&self) -> &str {
        "mock"
    }

    fn handle(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        match self.client.find_match(pending) {
            Some(recorded) => {
                tracing::debug!(
                    target: "courier::mock",
                    request_id = %pending.request_id(),
                    method = %pending.method(),
                    url = %pending.url(),
                    status = recorded.status(),
                    "substituting recorded response"
                );
                let response = Response::build(pending, recorded.into_raw(), None);
                pending.set_early_response(response);
                Ok(())
            }
            None => match self.client.unmatched() {
                UnmatchedBehavior::Passthrough => Ok(()),
                UnmatchedBehavior::Error => Err(CourierError::MockMissing {
                    method: pending.method().to_string(),
                    url: pending.url().to_string(),
                }),
            },
        }
    }
}
