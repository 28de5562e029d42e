//! Document service.
//!
//! Basic document operations. Writes go through the temporal stamper so
//! every stored record carries consistent metadata.

use super::normalize_supplied_validity;
use crate::models::temporal::{CREATED_AT, UPDATED_AT, VALID_FROM, VALID_UNTIL};
use crate::models::{
    Clock, CollectionInfo, CollectionType, Document, StampMode, WriteResult, stamp,
    stamp_update_after, validate_document_key,
};
use crate::observability::timed;
use crate::query::{Identifier, QueryBuilder};
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fields an ordinary update may not touch.
const PROTECTED_FIELDS: [&str; 3] = [CREATED_AT, VALID_FROM, VALID_UNTIL];

/// Document CRUD and collection management.
pub struct DocumentService<S: DocumentStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> DocumentService<S> {
    /// Creates a document service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Runs caller-written AQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the query.
    #[instrument(skip(self, text, bind_vars), fields(operation = "documents.query"))]
    pub fn query(&self, text: &str, bind_vars: Map<String, Value>) -> Result<Vec<Value>> {
        timed("documents.query", || {
            let query = QueryBuilder::raw(text, bind_vars);
            debug!(query = %query.text, "running caller query");
            self.store.execute(&query)
        })
    }

    /// Inserts a document stamped as a creation.
    ///
    /// Caller-supplied `valid_from`/`valid_until` are kept, in canonical
    /// form; `created_at` and `updated_at` are always set from the clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad collection name or validity
    /// bound, [`Error::NotFound`] if the collection is missing.
    #[instrument(skip(self, document), fields(operation = "documents.insert"))]
    pub fn insert(&self, collection: &str, mut document: Document) -> Result<WriteResult> {
        timed("documents.insert", || {
            let collection = Identifier::parse(collection)?;
            normalize_supplied_validity(&mut document)?;
            stamp(&mut document, StampMode::Create, self.clock.as_ref());
            self.store.insert(&collection, &document)
        })
    }

    /// Merges `patch` into a document and moves `updated_at` strictly past
    /// its stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the patch names `created_at`,
    /// `valid_from` or `valid_until` (use
    /// [`TemporalService::set_validity_period`](crate::services::TemporalService::set_validity_period)),
    /// and [`Error::NotFound`] if the document is missing.
    #[instrument(skip(self, patch), fields(operation = "documents.update"))]
    pub fn update(&self, collection: &str, key: &str, mut patch: Document) -> Result<WriteResult> {
        timed("documents.update", || {
            let collection = Identifier::parse(collection)?;
            validate_document_key(key)?;
            if let Some(field) = PROTECTED_FIELDS.iter().find(|f| patch.contains_key(**f)) {
                return Err(Error::Validation(format!(
                    "{field} cannot be changed by an ordinary update"
                )));
            }
            let current = self.store.get(&collection, key)?;
            stamp_update_after(&mut patch, current.get(UPDATED_AT), self.clock.as_ref());
            self.store.update(&collection, key, &patch)
        })
    }

    /// Deletes a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document is missing.
    #[instrument(skip(self), fields(operation = "documents.remove"))]
    pub fn remove(&self, collection: &str, key: &str) -> Result<WriteResult> {
        timed("documents.remove", || {
            let collection = Identifier::parse(collection)?;
            validate_document_key(key)?;
            self.store.remove(&collection, key)
        })
    }

    /// Fetches a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document is missing.
    #[instrument(skip(self), fields(operation = "documents.get"))]
    pub fn get(&self, collection: &str, key: &str) -> Result<Document> {
        timed("documents.get", || {
            let collection = Identifier::parse(collection)?;
            validate_document_key(key)?;
            self.store.get(&collection, key)
        })
    }

    /// Removes every document from a collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the collection is missing.
    #[instrument(skip(self), fields(operation = "documents.truncate"))]
    pub fn truncate(&self, collection: &str) -> Result<()> {
        timed("documents.truncate", || {
            let collection = Identifier::parse(collection)?;
            self.store.truncate(&collection)
        })
    }

    /// Lists collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    #[instrument(skip(self), fields(operation = "documents.list_collections"))]
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        timed("documents.list_collections", || self.store.collections())
    }

    /// Creates a document or edge collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad name, or a store error if the
    /// name is taken.
    #[instrument(skip(self), fields(operation = "documents.create_collection"))]
    pub fn create_collection(
        &self,
        name: &str,
        kind: CollectionType,
        wait_for_sync: bool,
    ) -> Result<CollectionInfo> {
        timed("documents.create_collection", || {
            let name = Identifier::parse(name)?;
            self.store.create_collection(&name, kind, wait_for_sync)
        })
    }

    /// Stamps a document without storing it.
    #[must_use]
    pub fn add_temporal_metadata(&self, mut document: Document, is_update: bool) -> Document {
        stamp(
            &mut document,
            StampMode::from_is_update(is_update),
            self.clock.as_ref(),
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManualClock;
    use crate::storage::InMemoryStore;
    use chrono::Duration;
    use serde_json::json;

    fn setup() -> (DocumentService<InMemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at("2024-05-01T08:00:00Z").unwrap());
        let service = DocumentService::new(Arc::new(InMemoryStore::new()), clock.clone());
        service
            .create_collection("notes", CollectionType::Document, false)
            .unwrap();
        (service, clock)
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_stamps_creation() {
        let (service, _) = setup();
        let written = service.insert("notes", doc(json!({ "text": "hi" }))).unwrap();
        let stored = service.get("notes", &written.key).unwrap();

        assert_eq!(stored["created_at"], "2024-05-01T08:00:00.000000Z");
        assert_eq!(stored["created_at"], stored["updated_at"]);
        assert_eq!(stored["valid_from"], stored["created_at"]);
        assert!(stored.contains_key("valid_until"));
        assert!(stored["valid_until"].is_null());
    }

    #[test]
    fn test_update_advances_updated_at_only() {
        let (service, clock) = setup();
        let written = service.insert("notes", doc(json!({ "text": "hi" }))).unwrap();
        clock.advance(Duration::minutes(5));
        service
            .update("notes", &written.key, doc(json!({ "text": "bye" })))
            .unwrap();

        let stored = service.get("notes", &written.key).unwrap();
        assert_eq!(stored["text"], "bye");
        assert_eq!(stored["created_at"], "2024-05-01T08:00:00.000000Z");
        assert_eq!(stored["updated_at"], "2024-05-01T08:05:00.000000Z");
        assert_eq!(stored["valid_from"], "2024-05-01T08:00:00.000000Z");
        assert!(stored["valid_until"].is_null());
    }

    #[test]
    fn test_update_advances_even_when_clock_stalls() {
        let (service, clock) = setup();
        let written = service.insert("notes", Document::new()).unwrap();

        let mut seen = vec![service.get("notes", &written.key).unwrap()["updated_at"].clone()];
        for step in [0, 0, -60] {
            clock.advance(Duration::seconds(step));
            service
                .update("notes", &written.key, doc(json!({ "step": step })))
                .unwrap();
            seen.push(service.get("notes", &written.key).unwrap()["updated_at"].clone());
        }

        let seen: Vec<&str> = seen.iter().map(|v| v.as_str().unwrap()).collect();
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
        assert_eq!(seen[3], "2024-05-01T08:00:00.000003Z");
    }

    #[test]
    fn test_update_missing_document() {
        let (service, _) = setup();
        assert!(matches!(
            service.update("notes", "ghost", doc(json!({ "a": 1 }))),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_insert_canonicalizes_supplied_validity() {
        let (service, _) = setup();
        let written = service
            .insert(
                "notes",
                doc(json!({ "valid_from": "2024-01-15T12:30:00+02:00", "valid_until": "2024-02-01" })),
            )
            .unwrap();
        let stored = service.get("notes", &written.key).unwrap();
        assert_eq!(stored["valid_from"], "2024-01-15T10:30:00.000000Z");
        assert_eq!(stored["valid_until"], "2024-02-01T00:00:00.000000Z");
    }

    #[test]
    fn test_update_rejects_protected_fields() {
        let (service, _) = setup();
        let written = service.insert("notes", Document::new()).unwrap();
        for field in PROTECTED_FIELDS {
            let mut patch = Document::new();
            patch.insert(field.to_string(), json!("2030-01-01T00:00:00Z"));
            assert!(matches!(
                service.update("notes", &written.key, patch),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn test_bad_names_rejected_before_store() {
        let (service, _) = setup();
        assert!(matches!(
            service.insert("no tes", Document::new()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(service.get("notes", "a/b"), Err(Error::Validation(_))));
        assert!(matches!(service.get("notes", "404"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_insert_rejects_bad_validity() {
        let (service, _) = setup();
        let result = service.insert("notes", doc(json!({ "valid_from": "whenever" })));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_raw_query_unsupported_in_memory() {
        let (service, _) = setup();
        let result = service.query("FOR d IN notes RETURN d", Map::new());
        assert!(matches!(result, Err(Error::Store { .. })));
    }

    #[test]
    fn test_add_temporal_metadata_modes() {
        let (service, _) = setup();
        let created = service.add_temporal_metadata(Document::new(), false);
        assert_eq!(created.len(), 4);
        let updated = service.add_temporal_metadata(Document::new(), true);
        assert_eq!(updated.len(), 1);
        assert!(updated.contains_key("updated_at"));
    }

    #[test]
    fn test_list_and_truncate() {
        let (service, _) = setup();
        service.insert("notes", Document::new()).unwrap();
        service.truncate("notes").unwrap();
        let collections = service.list_collections().unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "notes");
    }
}
