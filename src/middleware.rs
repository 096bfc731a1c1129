//! Middleware pipeline.
//!
//! Two independent ordered chains: request pipes transform the pending
//! request before dispatch, response pipes transform the response after it.
//! Pipes run in registration order; default pipes (the mock pipe) are
//! prepended at pipeline-build time so they always run first.
//!
//! A request pipe may set an early response on the pending request. That does
//! NOT stop the remaining request pipes; the assembler checks the slot only
//! after the whole pipeline has run, then skips network dispatch.

use crate::error::CourierError;
use crate::pending::PendingRequest;
use crate::response::Response;
use std::sync::Arc;

/// A single request-transforming middleware step.
pub trait RequestPipe: Send + Sync {
    /// Name used in logs and `MiddlewarePipe` errors.
    fn name(&self) -> &str {
        "request_pipe"
    }

    fn handle(&self, pending: &mut PendingRequest) -> Result<(), CourierError>;
}

/// A single response-transforming middleware step. May mutate or replace the
/// response it receives.
pub trait ResponsePipe: Send + Sync {
    fn name(&self) -> &str {
        "response_pipe"
    }

    fn handle(&self, response: Response) -> Result<Response, CourierError>;
}

impl<F> RequestPipe for F
where
    F: Fn(&mut PendingRequest) -> Result<(), CourierError> + Send + Sync,
{
    fn handle(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        self(pending)
    }
}

impl<F> ResponsePipe for F
where
    F: Fn(Response) -> Result<Response, CourierError> + Send + Sync,
{
    fn handle(&self, response: Response) -> Result<Response, CourierError> {
        self(response)
    }
}

/// Where a pipe is inserted relative to already-registered pipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipeOrder {
    #[default]
    Append,
    Prepend,
}

/// Declarative middleware list carried by connector/request properties.
/// Merged into the pipeline at assembly time, preserving relative order.
#[derive(Clone, Default)]
pub struct PipelineSpec {
    request: Vec<Arc<dyn RequestPipe>>,
    response: Vec<Arc<dyn ResponsePipe>>,
}

impl PipelineSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_pipe(mut self, pipe: Arc<dyn RequestPipe>) -> Self {
        self.request.push(pipe);
        self
    }

    pub fn with_response_pipe(mut self, pipe: Arc<dyn ResponsePipe>) -> Self {
        self.response.push(pipe);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }
}

/// Ordered request and response pipe chains of one pending request.
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    request_pipes: Vec<Arc<dyn RequestPipe>>,
    response_pipes: Vec<Arc<dyn ResponsePipe>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request_pipe(&mut self, pipe: Arc<dyn RequestPipe>, order: PipeOrder) {
        match order {
            PipeOrder::Append => self.request_pipes.push(pipe),
            PipeOrder::Prepend => self.request_pipes.insert(0, pipe),
        }
    }

    pub fn add_response_pipe(&mut self, pipe: Arc<dyn ResponsePipe>, order: PipeOrder) {
        match order {
            PipeOrder::Append => self.response_pipes.push(pipe),
            PipeOrder::Prepend => self.response_pipes.insert(0, pipe),
        }
    }

    /// Copy pipes from a declarative spec, appending in declaration order.
    pub fn merge(&mut self, spec: &PipelineSpec) {
        self.request_pipes.extend(spec.request.iter().cloned());
        self.response_pipes.extend(spec.response.iter().cloned());
    }

    /// Append every pipe of `other` after this pipeline's own pipes.
    pub(crate) fn absorb(&mut self, other: MiddlewarePipeline) {
        self.request_pipes.extend(other.request_pipes);
        self.response_pipes.extend(other.response_pipes);
    }

    pub fn request_pipe_count(&self) -> usize {
        self.request_pipes.len()
    }

    pub fn response_pipe_count(&self) -> usize {
        self.response_pipes.len()
    }

    /// Run every request pipe in order against `pending`. A failing pipe
    /// aborts the remainder of the chain; an early response does not.
    pub(crate) fn execute_request_pipeline(
        &self,
        pending: &mut PendingRequest,
    ) -> Result<(), CourierError> {
        for pipe in &self.request_pipes {
            tracing::trace!(target: "courier::pipeline", pipe = pipe.name(), "running request pipe");
            pipe.handle(pending)
                .map_err(|e| CourierError::pipe(pipe.name(), e))?;
        }
        Ok(())
    }

    /// Thread `response` through every response pipe in order.
    pub(crate) fn execute_response_pipeline(
        &self,
        mut response: Response,
    ) -> Result<Response, CourierError> {
        for pipe in &self.response_pipes {
            tracing::trace!(target: "courier::pipeline", pipe = pipe.name(), "running response pipe");
            response = pipe
                .handle(response)
                .map_err(|e| CourierError::pipe(pipe.name(), e))?;
        }
        Ok(response)
    }
}

/// Request pipe that logs method and URL at debug level (no bodies, no
/// credential values).
#[derive(Clone, Default)]
pub struct LoggingRequestPipe;

impl RequestPipe for LoggingRequestPipe {
    fn name(&self) -> &str {
        "logging"
    }

    fn handle(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        tracing::debug!(
            target: "courier::pipeline",
            request_id = %pending.request_id(),
            method = %pending.method(),
            url = %pending.url(),
            "sending request"
        );
        Ok(())
    }
}

/// Response pipe that logs the status code at debug level.
#[derive(Clone, Default)]
pub struct LoggingResponsePipe;

impl ResponsePipe for LoggingResponsePipe {
    fn name(&self) -> &str {
        "logging"
    }

    fn handle(&self, response: Response) -> Result<Response, CourierError> {
        tracing::debug!(
            target: "courier::pipeline",
            status = response.status(),
            url = %response.request().url,
            "response received"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use std::sync::Mutex;

    fn pending() -> PendingRequest {
        PendingRequest::new(Method::GET, "https://api.example.com/x".to_string())
    }

    struct TagPipe {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RequestPipe for TagPipe {
        fn name(&self) -> &str {
            self.tag
        }

        fn handle(&self, _pending: &mut PendingRequest) -> Result<(), CourierError> {
            self.log.lock().unwrap().push(self.tag);
            Ok(())
        }
    }

    #[test]
    fn pipes_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        for tag in ["p1", "p2", "p3"] {
            pipeline.add_request_pipe(
                Arc::new(TagPipe { tag, log: log.clone() }),
                PipeOrder::Append,
            );
        }
        pipeline.execute_request_pipeline(&mut pending()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn prepend_runs_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add_request_pipe(
            Arc::new(TagPipe { tag: "late", log: log.clone() }),
            PipeOrder::Append,
        );
        pipeline.add_request_pipe(
            Arc::new(TagPipe { tag: "first", log: log.clone() }),
            PipeOrder::Prepend,
        );
        pipeline.execute_request_pipeline(&mut pending()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "late"]);
    }

    #[test]
    fn merged_spec_preserves_relative_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let spec = PipelineSpec::new()
            .with_request_pipe(Arc::new(TagPipe { tag: "q1", log: log.clone() }))
            .with_request_pipe(Arc::new(TagPipe { tag: "q2", log: log.clone() }));

        let mut pipeline = MiddlewarePipeline::new();
        pipeline.merge(&spec);
        pipeline.add_request_pipe(
            Arc::new(TagPipe { tag: "p1", log: log.clone() }),
            PipeOrder::Append,
        );
        pipeline.execute_request_pipeline(&mut pending()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["q1", "q2", "p1"]);
    }

    #[test]
    fn failing_pipe_aborts_remaining_pipes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add_request_pipe(
            Arc::new(TagPipe { tag: "ok", log: log.clone() }),
            PipeOrder::Append,
        );
        pipeline.add_request_pipe(
            Arc::new(|_p: &mut PendingRequest| -> Result<(), CourierError> {
                Err(CourierError::InvalidParameter("boom".into()))
            }),
            PipeOrder::Append,
        );
        pipeline.add_request_pipe(
            Arc::new(TagPipe { tag: "never", log: log.clone() }),
            PipeOrder::Append,
        );

        let err = pipeline.execute_request_pipeline(&mut pending()).unwrap_err();
        assert!(matches!(err, CourierError::MiddlewarePipe { .. }));
        assert_eq!(*log.lock().unwrap(), vec!["ok"]);
    }

    #[test]
    fn response_pipes_transform_in_order() {
        use crate::response::RawResponse;

        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add_response_pipe(
            Arc::new(|mut r: Response| -> Result<Response, CourierError> {
                r.headers_mut().set("x-seen", "a".to_string());
                Ok(r)
            }),
            PipeOrder::Append,
        );
        pipeline.add_response_pipe(
            Arc::new(|mut r: Response| -> Result<Response, CourierError> {
                let prev = r.header("x-seen").unwrap_or_default();
                r.headers_mut().set("x-seen", format!("{prev}b"));
                Ok(r)
            }),
            PipeOrder::Append,
        );

        let response = Response::build(&pending(), RawResponse::new(200, vec![], Vec::new()), None);
        let out = pipeline.execute_response_pipeline(response).unwrap();
        assert_eq!(out.header("x-seen").unwrap(), "ab");
    }
}
