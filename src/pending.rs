//! The pending request aggregate.
//!
//! A `PendingRequest` is built exactly once per dispatch attempt from a
//! (connector, request) pair. It is mutated only during assembly and by
//! request pipes while the request pipeline runs; once dispatch begins it is
//! treated as immutable, and it is never reused across requests.

use crate::bag::PropertyBag;
use crate::body::DataBag;
use crate::error::CourierError;
use crate::middleware::MiddlewarePipeline;
use crate::mock::MockClient;
use crate::response::{RequestSnapshot, Response};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Fully merged, pre-dispatch request aggregate.
pub struct PendingRequest {
    request_id: Uuid,
    method: Method,
    url: String,
    headers: PropertyBag<String>,
    query: PropertyBag<String>,
    config: PropertyBag<Value>,
    body: DataBag,
    middleware: MiddlewarePipeline,
    mock_client: Option<Arc<dyn MockClient>>,
    early_response: Option<Response>,
}

impl PendingRequest {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            url,
            headers: PropertyBag::headers(),
            query: PropertyBag::new(),
            config: PropertyBag::new(),
            body: DataBag::new(),
            middleware: MiddlewarePipeline::new(),
            mock_client: None,
            early_response: None,
        }
    }

    /// Unique id for log correlation.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resolved URL without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: String) {
        self.url = url;
    }

    /// Resolved URL with the encoded query string appended.
    pub fn url_with_query(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let encoded: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, encoded.join("&"))
    }

    pub fn headers(&self) -> &PropertyBag<String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut PropertyBag<String> {
        &mut self.headers
    }

    pub fn query(&self) -> &PropertyBag<String> {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut PropertyBag<String> {
        &mut self.query
    }

    pub fn config(&self) -> &PropertyBag<Value> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PropertyBag<Value> {
        &mut self.config
    }

    pub fn body(&self) -> &DataBag {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut DataBag {
        &mut self.body
    }

    pub fn middleware(&self) -> &MiddlewarePipeline {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut MiddlewarePipeline {
        &mut self.middleware
    }

    pub fn mock_client(&self) -> Option<&Arc<dyn MockClient>> {
        self.mock_client.as_ref()
    }

    pub(crate) fn set_mock_client(&mut self, client: Arc<dyn MockClient>) {
        self.mock_client = Some(client);
    }

    /// Substitute a response before real dispatch. Remaining request pipes
    /// still run; the dispatcher checks this slot after the pipeline.
    pub fn set_early_response(&mut self, response: Response) {
        self.early_response = Some(response);
    }

    pub fn has_early_response(&self) -> bool {
        self.early_response.is_some()
    }

    pub fn take_early_response(&mut self) -> Option<Response> {
        self.early_response.take()
    }

    /// Snapshot for the response back-reference.
    pub(crate) fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            method: self.method.clone(),
            url: self.url_with_query(),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    /// Run the request pipeline against this request. The pipeline is taken
    /// out for the duration so pipes can mutate the request freely; pipes
    /// registered mid-flight are kept for later but do not run in this pass.
    pub(crate) fn run_request_pipeline(&mut self) -> Result<(), CourierError> {
        let pipeline = std::mem::take(&mut self.middleware);
        let result = pipeline.execute_request_pipeline(self);
        let added = std::mem::replace(&mut self.middleware, pipeline);
        self.middleware.absorb(added);
        result
    }

    /// Thread a response through this request's response pipeline. Called by
    /// the dispatching caller after the exchange (or for an early response).
    pub fn execute_response_pipeline(&self, response: Response) -> Result<Response, CourierError> {
        self.middleware.execute_response_pipeline(response)
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("data_type", &self.body.data_type())
            .field("request_pipes", &self.middleware.request_pipe_count())
            .field("response_pipes", &self.middleware.response_pipe_count())
            .field("has_early_response", &self.early_response.is_some())
            .finish()
    }
}
