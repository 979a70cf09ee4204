use crate::model::NamespaceScope;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CatalogLoaded {
        count: usize,
    },
    CatalogFailed {
        message: String,
    },
    NamespacesLoaded {
        count: usize,
    },
    NamespacesFallback {
        reason: String,
    },
    Selected {
        kind: Option<String>,
        generation: u64,
    },
    ScopeChanged {
        scope: NamespaceScope,
    },
    ObjectsLoaded {
        kind: String,
        scope: NamespaceScope,
        count: usize,
    },
    ObjectsPayloadMalformed {
        kind: String,
        reason: String,
    },
    ObjectsFailed {
        kind: String,
        message: String,
    },
    ResourceNamespacesLoaded {
        kind: String,
        count: usize,
    },
    ResourceNamespacesFailed {
        kind: String,
        reason: String,
    },
    StaleResponseDiscarded {
        kind: String,
        issued: u64,
        current: u64,
    },
}

/// Receives every state transition and failure the store goes through.
pub trait EventSink {
    fn record(&self, event: &StoreEvent);
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &StoreEvent) {
        match event {
            StoreEvent::CatalogLoaded { count } => info!(count, "resource catalog loaded"),
            StoreEvent::CatalogFailed { message } => {
                warn!(%message, "resource catalog load failed")
            }
            StoreEvent::NamespacesLoaded { count } => debug!(count, "namespaces loaded"),
            StoreEvent::NamespacesFallback { reason } => {
                warn!(%reason, "namespace list unavailable, using fallback namespaces")
            }
            StoreEvent::Selected { kind, generation } => {
                debug!(kind = kind.as_deref().unwrap_or("-"), generation, "selection changed")
            }
            StoreEvent::ScopeChanged { scope } => debug!(%scope, "namespace scope changed"),
            StoreEvent::ObjectsLoaded { kind, scope, count } => {
                debug!(%kind, %scope, count, "objects loaded")
            }
            StoreEvent::ObjectsPayloadMalformed { kind, reason } => {
                warn!(%kind, %reason, "objects payload malformed, showing none")
            }
            StoreEvent::ObjectsFailed { kind, message } => {
                warn!(%kind, %message, "objects load failed")
            }
            StoreEvent::ResourceNamespacesLoaded { kind, count } => {
                debug!(%kind, count, "resource namespaces loaded")
            }
            StoreEvent::ResourceNamespacesFailed { kind, reason } => {
                debug!(%kind, %reason, "resource namespaces unavailable")
            }
            StoreEvent::StaleResponseDiscarded {
                kind,
                issued,
                current,
            } => debug!(%kind, issued, current, "discarded response for previous selection"),
        }
    }
}
