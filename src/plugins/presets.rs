//! Stock plugins for common cross-cutting concerns.

use super::{BootOwner, Plugin};
use crate::error::CourierError;
use crate::pending::PendingRequest;
use std::time::Duration;

/// Capability tag for [`AcceptsJson`].
pub const ACCEPTS_JSON: &str = "accepts_json";

/// Capability tag for [`WithUserAgent`].
pub const USER_AGENT: &str = "user_agent";

/// Capability tag for [`RequestTimeout`].
pub const REQUEST_TIMEOUT: &str = "request_timeout";

/// Sets `Accept: application/json` unless a value is already present.
#[derive(Default)]
pub struct AcceptsJson;

impl Plugin for AcceptsJson {
    fn boot(
        &self,
        pending: &mut PendingRequest,
        _owner: BootOwner<'_>,
    ) -> Result<(), CourierError> {
        if !pending.headers().contains("accept") {
            pending
                .headers_mut()
                .set("accept", "application/json".to_string());
        }
        Ok(())
    }
}

/// Sets a `user-agent` header.
pub struct WithUserAgent(pub String);

impl Plugin for WithUserAgent {
    fn boot(
        &self,
        pending: &mut PendingRequest,
        _owner: BootOwner<'_>,
    ) -> Result<(), CourierError> {
        pending.headers_mut().set("user-agent", self.0.clone());
        Ok(())
    }
}

/// Writes a `timeout` config entry (seconds), honored by the reqwest sender.
pub struct RequestTimeout(pub Duration);

impl Plugin for RequestTimeout {
    fn boot(
        &self,
        pending: &mut PendingRequest,
        _owner: BootOwner<'_>,
    ) -> Result<(), CourierError> {
        pending
            .config_mut()
            .set("timeout", serde_json::json!(self.0.as_secs()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use reqwest::Method;

    struct Dummy;
    impl Connector for Dummy {
        fn base_url(&self) -> String {
            "https://api.example.com".into()
        }
    }

    #[test]
    fn accepts_json_respects_existing_header() {
        let conn = Dummy;
        let mut p = PendingRequest::new(Method::GET, "https://api.example.com/x".into());
        p.headers_mut().set("Accept", "text/csv".to_string());
        AcceptsJson
            .boot(&mut p, BootOwner::Connector(&conn))
            .unwrap();
        assert_eq!(p.headers().get("accept").unwrap(), "text/csv");

        let mut fresh = PendingRequest::new(Method::GET, "https://api.example.com/x".into());
        AcceptsJson
            .boot(&mut fresh, BootOwner::Connector(&conn))
            .unwrap();
        assert_eq!(fresh.headers().get("accept").unwrap(), "application/json");
    }

    #[test]
    fn timeout_plugin_writes_config() {
        let conn = Dummy;
        let mut p = PendingRequest::new(Method::GET, "https://api.example.com/x".into());
        RequestTimeout(Duration::from_secs(30))
            .boot(&mut p, BootOwner::Connector(&conn))
            .unwrap();
        assert_eq!(p.config().get("timeout").unwrap(), &serde_json::json!(30));
    }
}
