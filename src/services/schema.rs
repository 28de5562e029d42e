//! Index management.

use crate::models::{IndexSpec, IndexType, TemporalIndexes};
use crate::observability::timed;
use crate::query::Identifier;
use crate::storage::DocumentStore;
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Creates and lists collection indexes.
pub struct SchemaService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> SchemaService<S> {
    /// Creates a schema service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates an index and returns the store's descriptor for it.
    ///
    /// `unique` is ignored for geo and fulltext indexes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for a bad
    /// collection name or empty field list.
    #[instrument(skip(self), fields(operation = "schema.create_index"))]
    pub fn create_index(
        &self,
        collection: &str,
        fields: Vec<String>,
        index_type: IndexType,
        unique: bool,
    ) -> Result<Value> {
        timed("schema.create_index", || {
            let collection = Identifier::parse(collection)?;
            let spec = IndexSpec::new(index_type, fields, unique)?;
            self.store.add_index(&collection, &spec)
        })
    }

    /// Lists the indexes of a collection, primary index included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the collection
    /// is missing.
    #[instrument(skip(self), fields(operation = "schema.list_indexes"))]
    pub fn list_indexes(&self, collection: &str) -> Result<Vec<Value>> {
        timed("schema.list_indexes", || {
            let collection = Identifier::parse(collection)?;
            self.store.indexes(&collection)
        })
    }

    /// Ensures the persistent indexes temporal queries rely on: `created_at`,
    /// `updated_at` and the compound `(valid_from, valid_until)`.
    ///
    /// Safe to repeat; existing indexes are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the collection
    /// is missing.
    #[instrument(skip(self), fields(operation = "schema.create_temporal_indexes"))]
    pub fn create_temporal_indexes(&self, collection: &str) -> Result<TemporalIndexes> {
        timed("schema.create_temporal_indexes", || {
            let name = Identifier::parse(collection)?;
            let [created, updated, validity] = IndexSpec::temporal_bundle();

            let indexes = TemporalIndexes {
                created_at: self.store.add_index(&name, &created.1)?,
                updated_at: self.store.add_index(&name, &updated.1)?,
                validity_period: self.store.add_index(&name, &validity.1)?,
            };
            info!(collection = name.as_str(), "temporal indexes ensured");
            Ok(indexes)
        })
    }
}
