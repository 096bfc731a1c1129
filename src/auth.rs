//! Authentication strategies.
//!
//! An `Authenticator` mutates a pending request to inject credentials. It
//! runs after property merge (so it can read merged config) and before boot
//! hooks and middleware, so plugins and pipes observe the final auth state.
//! Credential material is held as `SecretString` and only exposed at the
//! moment it is written into the request.

use crate::error::CourierError;
use crate::pending::PendingRequest;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};

/// Strategy that injects credentials into a pending request.
pub trait Authenticator: Send + Sync {
    fn apply(&self, pending: &mut PendingRequest) -> Result<(), CourierError>;
}

/// `Authorization: Bearer <token>`.
pub struct BearerTokenAuthenticator {
    token: SecretString,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().into(),
        }
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn apply(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        pending.headers_mut().set(
            "authorization",
            format!("Bearer {}", self.token.expose_secret()),
        );
        Ok(())
    }
}

/// `Authorization: Basic <base64(user:password)>`.
pub struct BasicAuthenticator {
    username: String,
    password: SecretString,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into().into(),
        }
    }
}

impl Authenticator for BasicAuthenticator {
    fn apply(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        let credentials = format!("{}:{}", self.username, self.password.expose_secret());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        pending
            .headers_mut()
            .set("authorization", format!("Basic {encoded}"));
        Ok(())
    }
}

/// Custom credential header (e.g. `x-api-key` style APIs).
pub struct HeaderAuthenticator {
    name: String,
    value: SecretString,
}

impl HeaderAuthenticator {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into().into(),
        }
    }
}

impl Authenticator for HeaderAuthenticator {
    fn apply(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        if self.name.trim().is_empty() {
            return Err(CourierError::AuthenticationError(
                "credential header name must not be empty".into(),
            ));
        }
        pending
            .headers_mut()
            .set(&self.name, self.value.expose_secret().to_string());
        Ok(())
    }
}

/// Credential passed as a query parameter (e.g. `?api_key=...`).
pub struct QueryAuthenticator {
    parameter: String,
    value: SecretString,
}

impl QueryAuthenticator {
    pub fn new(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into().into(),
        }
    }
}

impl Authenticator for QueryAuthenticator {
    fn apply(&self, pending: &mut PendingRequest) -> Result<(), CourierError> {
        pending
            .query_mut()
            .set(&self.parameter, self.value.expose_secret().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn pending() -> PendingRequest {
        PendingRequest::new(Method::GET, "https://api.example.com/items".to_string())
    }

    #[test]
    fn bearer_sets_authorization_header() {
        let mut p = pending();
        BearerTokenAuthenticator::new("sk-123").apply(&mut p).unwrap();
        assert_eq!(p.headers().get("Authorization").unwrap(), "Bearer sk-123");
    }

    #[test]
    fn basic_encodes_credentials() {
        let mut p = pending();
        BasicAuthenticator::new("user", "pass").apply(&mut p).unwrap();
        // base64("user:pass")
        assert_eq!(
            p.headers().get("authorization").unwrap(),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn query_authenticator_writes_query_bag() {
        let mut p = pending();
        QueryAuthenticator::new("api_key", "abc").apply(&mut p).unwrap();
        assert_eq!(p.query().get("api_key").unwrap(), "abc");
    }

    #[test]
    fn empty_header_name_is_rejected() {
        let mut p = pending();
        let err = HeaderAuthenticator::new("  ", "v").apply(&mut p).unwrap_err();
        assert!(matches!(err, CourierError::AuthenticationError(_)));
    }
}
