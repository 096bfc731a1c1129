//! courier
//!
//! A declarative HTTP API-client construction framework. Describe an API once
//! as a [`Connector`] (base URL, default headers/config/middleware) and each
//! endpoint as a [`Request`]; courier merges their properties, resolves the
//! body encoding, applies authentication, boots plugins, runs the middleware
//! pipeline, and dispatches through a pluggable [`Sender`] — with first-class
//! request mocking via early responses.
#![deny(unsafe_code)]

pub mod auth;
pub mod bag;
pub mod body;
pub mod build;
pub mod client;
pub mod connector;
pub mod error;
pub mod middleware;
pub mod mock;
pub mod pending;
pub mod plugins;
pub mod request;
pub mod response;
pub mod sender;

pub use auth::{
    Authenticator, BasicAuthenticator, BearerTokenAuthenticator, HeaderAuthenticator,
    QueryAuthenticator,
};
pub use bag::PropertyBag;
pub use body::{DataBag, DataType};
pub use build::build_pending_request;
pub use client::{Courier, CourierBuilder};
pub use connector::{Connector, RequestProperties};
pub use error::CourierError;
pub use middleware::{
    MiddlewarePipeline, PipeOrder, PipelineSpec, RequestPipe, ResponsePipe,
};
pub use mock::{MockClient, MockPipe, MockResponse, StaticMockClient, UnmatchedBehavior};
pub use pending::PendingRequest;
pub use plugins::{BootOwner, Plugin, PluginRegistry};
pub use request::{HasResponse, Request};
pub use response::{RawResponse, RequestSnapshot, Response};
pub use sender::{ReqwestSender, Sender};

/// HTTP method vocabulary, re-exported from reqwest.
pub use reqwest::Method;
