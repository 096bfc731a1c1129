//! Error Handling Module
//!
//! One crate-wide error enum covering request assembly, plugin boot,
//! middleware execution, mocking, and transport failures. Assembly errors are
//! fatal and surface immediately; nothing is swallowed or retried internally.

use crate::body::DataType;
use thiserror::Error;

/// Errors produced while assembling or dispatching a request.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Connector and request declare conflicting body-encoding capabilities.
    #[error("incompatible data types: connector declares {connector}, request declares {request}")]
    IncompatibleDataType {
        connector: DataType,
        request: DataType,
    },

    /// Body data is present but no body-encoding capability was declared.
    #[error("request body data present but no data type declared by connector or request")]
    UndeclaredDataType,

    /// A declared capability tag has no plugin registered for it.
    #[error("no plugin registered for capability tag '{tag}' declared by {owner}")]
    BootIntrospection { owner: &'static str, tag: String },

    /// A request or response pipe failed; remaining pipes in that pipeline
    /// were aborted.
    #[error("middleware pipe '{pipe}' failed: {source}")]
    MiddlewarePipe {
        pipe: String,
        #[source]
        source: Box<CourierError>,
    },

    /// The mock client found no recorded response and is configured to fail
    /// on unmatched requests.
    #[error("no mock response matched {method} {url}")]
    MockMissing { method: String, url: String },

    /// Credential material could not be applied to the pending request.
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// Invalid connector/request declaration (bad header name, raw body under
    /// a field-merging data type, and similar).
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// A caller-supplied value was rejected.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Connectivity-level transport failure. HTTP error statuses are not
    /// errors; they come back as a `Response`.
    #[error("HTTP transport error: {0}")]
    HttpError(String),

    /// Response body could not be decoded as the requested type.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CourierError {
    /// Wrap a pipe failure, recording which pipe aborted the pipeline.
    pub(crate) fn pipe(name: &str, source: CourierError) -> Self {
        CourierError::MiddlewarePipe {
            pipe: name.to_string(),
            source: Box::new(source),
        }
    }
}
