//! Plugin boot engine.
//!
//! Cross-cutting request-building behavior is packaged as plugins keyed by
//! capability tags. Connectors and requests declare an ordered tag list; the
//! assembler is handed a `PluginRegistry` (explicit dependency, never ambient
//! state) and boots each declared tag's handler exactly once per owner:
//! connector tags first, then request tags, in declaration order. A declared
//! tag with no registered handler fails fast.

pub mod presets;

use crate::connector::Connector;
use crate::error::CourierError;
use crate::pending::PendingRequest;
use crate::request::Request;
use indexmap::IndexMap;
use std::sync::Arc;

/// The instance a plugin is booting on behalf of.
pub enum BootOwner<'a> {
    Connector(&'a dyn Connector),
    Request(&'a dyn Request),
}

impl BootOwner<'_> {
    fn kind(&self) -> &'static str {
        match self {
            BootOwner::Connector(_) => "connector",
            BootOwner::Request(_) => "request",
        }
    }
}

/// A composable unit of request-building behavior with a boot hook.
///
/// Boot hooks may mutate any part of the pending request: headers, query,
/// config, body, or the middleware pipeline itself.
pub trait Plugin: Send + Sync {
    fn boot(&self, pending: &mut PendingRequest, owner: BootOwner<'_>)
        -> Result<(), CourierError>;
}

/// Tag-to-handler registry, passed into the assembler.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    handlers: IndexMap<&'static str, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a capability tag, replacing any previous one.
    pub fn register(&mut self, tag: &'static str, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.handlers.insert(tag, plugin);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn Plugin>> {
        self.handlers.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Boot every capability tag declared by the connector, then by the request.
///
/// Within one owner, tags boot in declaration order and duplicates boot only
/// once. Ordering is deterministic for a given pair of types; tests may
/// assert exact call order.
pub fn boot_all(
    registry: &PluginRegistry,
    pending: &mut PendingRequest,
    connector: &dyn Connector,
    request: &dyn Request,
) -> Result<(), CourierError> {
    boot_owner(
        registry,
        pending,
        connector.capabilities(),
        BootOwner::Connector(connector),
    )?;
    boot_owner(
        registry,
        pending,
        request.capabilities(),
        BootOwner::Request(request),
    )
}

fn boot_owner(
    registry: &PluginRegistry,
    pending: &mut PendingRequest,
    tags: &[&'static str],
    owner: BootOwner<'_>,
) -> Result<(), CourierError> {
    let mut booted: Vec<&str> = Vec::with_capacity(tags.len());
    for tag in tags {
        if booted.contains(tag) {
            continue;
        }
        let plugin = registry
            .get(tag)
            .ok_or_else(|| CourierError::BootIntrospection {
                owner: owner.kind(),
                tag: tag.to_string(),
            })?;
        tracing::trace!(
            target: "courier::build",
            request_id = %pending.request_id(),
            owner = owner.kind(),
            tag,
            "booting plugin"
        );
        plugin.boot(pending, borrow_owner(&owner))?;
        booted.push(*tag);
    }
    Ok(())
}

fn borrow_owner<'a>(owner: &BootOwner<'a>) -> BootOwner<'a> {
    match owner {
        BootOwner::Connector(c) => BootOwner::Connector(*c),
        BootOwner::Request(r) => BootOwner::Request(*r),
    }
}
