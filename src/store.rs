//! Intents that mutate [`CatalogState`]. Each fetch is split into `begin_*`,
//! `send` and `finish_*` so a caller can keep dispatching while it is in flight.

use crate::error::{FetchError, TransportError};
use crate::events::{EventSink, StoreEvent, TracingSink};
use crate::model::{NamespaceScope, ResourceKind, ResourceObject};
use crate::state::{CatalogState, ErrorSource};
use crate::transport::{
    CATALOG_PATH, NAMESPACES_PATH, Transport, objects_path, resource_namespaces_path,
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shown in the namespace picker when the cluster namespace list is unavailable.
pub const DEFAULT_FALLBACK_NAMESPACES: [&str; 3] = ["default", "kube-system", "kube-public"];

type FetchResult = Result<Value, TransportError>;

#[derive(Debug, Clone)]
struct Request {
    path: String,
    namespace: Option<String>,
}

impl Request {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
        }
    }

    async fn send<T: Transport>(&self, transport: &T) -> FetchResult {
        match self.namespace.as_deref() {
            Some(namespace) => {
                transport
                    .get_json(&self.path, &[("namespace", namespace)])
                    .await
            }
            None => transport.get_json(&self.path, &[]).await,
        }
    }
}

#[derive(Debug, Clone)]
#[must_use = "pass the ticket to `finish_load_catalog` or `loading` stays set"]
pub struct CatalogFetch {
    request: Request,
}

impl CatalogFetch {
    pub async fn send<T: Transport>(&self, transport: &T) -> FetchResult {
        self.request.send(transport).await
    }
}

#[derive(Debug, Clone)]
#[must_use = "pass the ticket to `finish_load_namespaces` or `loading` stays set"]
pub struct NamespacesFetch {
    request: Request,
}

impl NamespacesFetch {
    pub async fn send<T: Transport>(&self, transport: &T) -> FetchResult {
        self.request.send(transport).await
    }
}

#[derive(Debug, Clone)]
#[must_use = "pass the ticket to `finish_load_objects` or `loading` stays set"]
pub struct ObjectsFetch {
    request: Request,
    kind: ResourceKind,
    scope: NamespaceScope,
    generation: u64,
}

impl ObjectsFetch {
    pub async fn send<T: Transport>(&self, transport: &T) -> FetchResult {
        self.request.send(transport).await
    }
}

#[derive(Debug, Clone)]
pub struct ResourceNamespacesFetch {
    request: Request,
    kind: ResourceKind,
    generation: u64,
}

impl ResourceNamespacesFetch {
    pub async fn send<T: Transport>(&self, transport: &T) -> FetchResult {
        self.request.send(transport).await
    }
}

pub struct CatalogStore<T> {
    transport: T,
    sink: Box<dyn EventSink>,
    fallback_namespaces: Vec<String>,
    state: CatalogState,
}

impl<T: Transport> CatalogStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sink: Box::new(TracingSink),
            fallback_namespaces: DEFAULT_FALLBACK_NAMESPACES
                .iter()
                .map(|namespace| namespace.to_string())
                .collect(),
            state: CatalogState::default(),
        }
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the fallback namespace set; an empty list keeps the current one.
    pub fn with_fallback_namespaces(mut self, namespaces: Vec<String>) -> Self {
        if !namespaces.is_empty() {
            self.fallback_namespaces = namespaces;
        }
        self
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn load_catalog(&mut self) {
        let fetch = self.begin_load_catalog();
        let result = fetch.send(&self.transport).await;
        self.finish_load_catalog(fetch, result);
    }

    pub fn begin_load_catalog(&mut self) -> CatalogFetch {
        self.state.begin_blocking();
        CatalogFetch {
            request: Request::new(CATALOG_PATH),
        }
    }

    pub fn finish_load_catalog(&mut self, _fetch: CatalogFetch, result: FetchResult) {
        self.state.end_blocking();
        match decode_list::<ResourceKind>(result, "an array of resource kinds", false) {
            Ok(resources) => {
                self.state.replace_resources(resources);
                self.state.catalog_refreshed_at = Some(Local::now());
                self.state.clear_error_from(ErrorSource::Catalog);
                self.emit(StoreEvent::CatalogLoaded {
                    count: self.state.resources.len(),
                });
            }
            Err(error) => {
                let message = format!("Failed to load resource catalog: {}", error.user_message());
                self.state.set_error(ErrorSource::Catalog, message.clone());
                self.emit(StoreEvent::CatalogFailed { message });
            }
        }
    }

    pub async fn load_namespaces(&mut self) {
        let fetch = self.begin_load_namespaces();
        let result = fetch.send(&self.transport).await;
        self.finish_load_namespaces(fetch, result);
    }

    pub fn begin_load_namespaces(&mut self) -> NamespacesFetch {
        self.state.begin_blocking();
        NamespacesFetch {
            request: Request::new(NAMESPACES_PATH),
        }
    }

    pub fn finish_load_namespaces(&mut self, _fetch: NamespacesFetch, result: FetchResult) {
        self.state.end_blocking();
        match decode_list::<String>(result, "an array of namespace names", true) {
            Ok(namespaces) => {
                self.state.namespaces = namespaces;
                self.emit(StoreEvent::NamespacesLoaded {
                    count: self.state.namespaces.len(),
                });
            }
            Err(error) => {
                self.state.namespaces = self.fallback_namespaces.clone();
                self.emit(StoreEvent::NamespacesFallback {
                    reason: error.to_string(),
                });
            }
        }
    }

    pub async fn refresh(&mut self) {
        let catalog = self.begin_load_catalog();
        let namespaces = self.begin_load_namespaces();
        let (catalog_result, namespaces_result) = futures::join!(
            catalog.send(&self.transport),
            namespaces.send(&self.transport)
        );
        self.finish_load_catalog(catalog, catalog_result);
        self.finish_load_namespaces(namespaces, namespaces_result);
    }

    /// Drops everything derived from the previous selection; issues no fetch.
    pub fn select(&mut self, kind: ResourceKind) {
        self.apply_selection(Some(kind));
    }

    pub fn clear_selection(&mut self) {
        self.apply_selection(None);
    }

    fn apply_selection(&mut self, kind: Option<ResourceKind>) {
        self.state.generation += 1;
        self.state.selected = kind;
        self.state.objects.clear();
        self.state.resource_namespaces.clear();
        self.state.scope = NamespaceScope::All;
        self.state.clear_error_from(ErrorSource::Objects);
        self.emit(StoreEvent::Selected {
            kind: self.state.selected.as_ref().map(ToString::to_string),
            generation: self.state.generation,
        });
    }

    pub fn set_scope(&mut self, scope: NamespaceScope) {
        if self.state.scope == scope {
            return;
        }
        self.state.scope = scope;
        self.emit(StoreEvent::ScopeChanged {
            scope: self.state.scope.clone(),
        });
    }

    pub async fn set_scope_and_reload(&mut self, scope: NamespaceScope) {
        self.set_scope(scope);
        self.load_objects().await;
    }

    /// Selects `kind`, then fetches its objects and namespaces concurrently.
    pub async fn select_and_load(&mut self, kind: ResourceKind) {
        self.select(kind);
        let objects = self.begin_load_objects();
        let namespaces = self.begin_load_resource_namespaces();
        let transport = &self.transport;
        let (objects_result, namespaces_result) = futures::join!(
            async {
                match objects.as_ref() {
                    Some(fetch) => Some(fetch.send(transport).await),
                    None => None,
                }
            },
            async {
                match namespaces.as_ref() {
                    Some(fetch) => Some(fetch.send(transport).await),
                    None => None,
                }
            }
        );
        if let (Some(fetch), Some(result)) = (objects, objects_result) {
            self.finish_load_objects(fetch, result);
        }
        if let (Some(fetch), Some(result)) = (namespaces, namespaces_result) {
            self.finish_load_resource_namespaces(fetch, result);
        }
    }

    pub async fn load_objects(&mut self) {
        let Some(fetch) = self.begin_load_objects() else {
            return;
        };
        let result = fetch.send(&self.transport).await;
        self.finish_load_objects(fetch, result);
    }

    pub fn begin_load_objects(&mut self) -> Option<ObjectsFetch> {
        let kind = self.state.selected.clone()?;
        let scope = self.state.scope.clone();
        self.state.begin_blocking();
        Some(ObjectsFetch {
            request: Request {
                path: objects_path(&kind),
                namespace: scope.namespace().map(str::to_string),
            },
            kind,
            scope,
            generation: self.state.generation,
        })
    }

    pub fn finish_load_objects(&mut self, fetch: ObjectsFetch, result: FetchResult) {
        self.state.end_blocking();
        if fetch.generation != self.state.generation || fetch.scope != self.state.scope {
            self.emit(StoreEvent::StaleResponseDiscarded {
                kind: fetch.kind.to_string(),
                issued: fetch.generation,
                current: self.state.generation,
            });
            return;
        }

        match decode_list::<ResourceObject>(result, "an array of objects", false) {
            Ok(objects) => {
                self.state.objects = objects;
                self.state.clear_error_from(ErrorSource::Objects);
                self.emit(StoreEvent::ObjectsLoaded {
                    kind: fetch.kind.to_string(),
                    scope: fetch.scope,
                    count: self.state.objects.len(),
                });
            }
            Err(error) if error.is_malformed() => {
                self.state.objects.clear();
                self.state.clear_error_from(ErrorSource::Objects);
                self.emit(StoreEvent::ObjectsPayloadMalformed {
                    kind: fetch.kind.to_string(),
                    reason: error.to_string(),
                });
            }
            Err(error) => {
                self.state.objects.clear();
                let message = format!(
                    "Failed to load {} objects: {}",
                    fetch.kind.name,
                    error.user_message()
                );
                self.state.set_error(ErrorSource::Objects, message.clone());
                self.emit(StoreEvent::ObjectsFailed {
                    kind: fetch.kind.to_string(),
                    message,
                });
            }
        }
    }

    /// Fetches the namespaces that hold objects of the selected kind. Failures are silent.
    pub async fn load_resource_namespaces(&mut self) {
        let Some(fetch) = self.begin_load_resource_namespaces() else {
            return;
        };
        let result = fetch.send(&self.transport).await;
        self.finish_load_resource_namespaces(fetch, result);
    }

    pub fn begin_load_resource_namespaces(&mut self) -> Option<ResourceNamespacesFetch> {
        let kind = self.state.selected.clone()?;
        Some(ResourceNamespacesFetch {
            request: Request::new(resource_namespaces_path(&kind)),
            kind,
            generation: self.state.generation,
        })
    }

    pub fn finish_load_resource_namespaces(
        &mut self,
        fetch: ResourceNamespacesFetch,
        result: FetchResult,
    ) {
        if fetch.generation != self.state.generation {
            self.emit(StoreEvent::StaleResponseDiscarded {
                kind: fetch.kind.to_string(),
                issued: fetch.generation,
                current: self.state.generation,
            });
            return;
        }

        match decode_list::<String>(result, "an array of namespace names", true) {
            Ok(namespaces) => {
                self.state.resource_namespaces = namespaces;
                self.emit(StoreEvent::ResourceNamespacesLoaded {
                    kind: fetch.kind.to_string(),
                    count: self.state.resource_namespaces.len(),
                });
            }
            Err(error) => {
                self.state.resource_namespaces.clear();
                self.emit(StoreEvent::ResourceNamespacesFailed {
                    kind: fetch.kind.to_string(),
                    reason: error.to_string(),
                });
            }
        }
    }

    fn emit(&self, event: StoreEvent) {
        self.sink.record(&event);
    }
}

fn decode_list<D: DeserializeOwned>(
    result: FetchResult,
    expected: &'static str,
    null_is_empty: bool,
) -> Result<Vec<D>, FetchError> {
    match result? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<D>, _>>()
            .map_err(|_| FetchError::malformed(expected)),
        Value::Null if null_is_empty => Ok(Vec::new()),
        _ => Err(FetchError::malformed(expected)),
    }
}
