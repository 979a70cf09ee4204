//! Resource catalog and object browsing state for a crds-objects backend.
//!
//! [`CatalogStore`] owns the browsing state and is the only way to change it.
//! A view layer constructs one store, dispatches intents into it and reads the
//! derived views from [`CatalogState`].

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod state;
pub mod store;
pub mod transport;

pub use error::{FetchError, TransportError};
pub use events::{EventSink, StoreEvent, TracingSink};
pub use model::{NamespaceScope, ObjectSummary, ResourceKind, ResourceObject};
pub use state::CatalogState;
pub use store::{CatalogStore, DEFAULT_FALLBACK_NAMESPACES};
pub use transport::{HttpTransport, Transport};
