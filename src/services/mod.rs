//! Business logic services.
//!
//! Services validate caller input, stamp temporal metadata, build queries
//! and hand them to the injected [`DocumentStore`]. They hold no state of
//! their own beyond a shared store handle and a clock.

mod documents;
mod graph;
mod schema;
mod temporal;

pub use documents::DocumentService;
pub use graph::{DEFAULT_RELATIONSHIP_TYPE, GraphService};
pub use schema::SchemaService;
pub use temporal::TemporalService;

use crate::models::temporal::{VALID_FROM, VALID_UNTIL, normalize_timestamp};
use crate::models::{Clock, Document, SystemClock};
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Hands out services sharing one store and one clock.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tempograph::{InMemoryStore, ManualClock, ServiceContainer};
///
/// let clock = Arc::new(ManualClock::at("2024-01-01T00:00:00Z")?);
/// let services = ServiceContainer::new(Arc::new(InMemoryStore::new())).with_clock(clock);
/// let stamped = services.documents().add_temporal_metadata(Default::default(), false);
/// assert_eq!(stamped["created_at"], "2024-01-01T00:00:00.000000Z");
/// # Ok::<(), tempograph::Error>(())
/// ```
pub struct ServiceContainer<S: DocumentStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> Clone for ServiceContainer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: DocumentStore> ServiceContainer<S> {
    /// Creates a container over `store` using the wall clock.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for stamping.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Document CRUD and collection management.
    #[must_use]
    pub fn documents(&self) -> DocumentService<S> {
        DocumentService::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    /// Edge creation and traversal.
    #[must_use]
    pub fn graph(&self) -> GraphService<S> {
        GraphService::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    /// Point-in-time, range and time-series queries.
    #[must_use]
    pub fn temporal(&self) -> TemporalService<S> {
        TemporalService::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    /// Index management.
    #[must_use]
    pub fn schema(&self) -> SchemaService<S> {
        SchemaService::new(Arc::clone(&self.store))
    }
}

/// Checks caller-supplied validity bounds before a document is first stored
/// and rewrites them in canonical form.
///
/// `valid_from` must be a timestamp; `valid_until` must be a timestamp or
/// `null`.
pub(crate) fn normalize_supplied_validity(document: &mut Document) -> Result<()> {
    match document.get_mut(VALID_FROM) {
        None => {},
        Some(Value::String(ts)) => *ts = normalize_timestamp(VALID_FROM, ts)?,
        Some(other) => {
            return Err(Error::Validation(format!(
                "{VALID_FROM} must be a timestamp string, got {other}"
            )));
        },
    }
    match document.get_mut(VALID_UNTIL) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(ts)) => {
            *ts = normalize_timestamp(VALID_UNTIL, ts)?;
            Ok(())
        },
        Some(other) => Err(Error::Validation(format!(
            "{VALID_UNTIL} must be a timestamp string or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_supplied_validity() {
        assert!(normalize_supplied_validity(&mut Document::new()).is_ok());

        let mut supplied = doc(json!({ "valid_from": "2024-01-01", "valid_until": null }));
        normalize_supplied_validity(&mut supplied).unwrap();
        assert_eq!(supplied[VALID_FROM], "2024-01-01T00:00:00.000000Z");
        assert!(supplied[VALID_UNTIL].is_null());

        let mut offset = doc(json!({ "valid_until": "2024-01-15T12:30:00+02:00" }));
        normalize_supplied_validity(&mut offset).unwrap();
        assert_eq!(offset[VALID_UNTIL], "2024-01-15T10:30:00.000000Z");

        for bad in [
            json!({ "valid_from": "tomorrow" }),
            json!({ "valid_from": 5 }),
            json!({ "valid_until": false }),
        ] {
            assert!(normalize_supplied_validity(&mut doc(bad)).is_err());
        }
    }
}
