//! In-memory document store.
//!
//! Provides a fast, non-persistent implementation of [`DocumentStore`] for
//! tests and development. Built queries are evaluated from their
//! [`QueryPlan`](crate::query::QueryPlan) with AQL comparison semantics;
//! caller-written AQL is rejected.

// Allow significant_drop_tightening - guards live for the whole operation.
#![allow(clippy::significant_drop_tightening)]

mod eval;

use crate::models::{
    CollectionInfo, CollectionType, Document, DocumentId, IndexSpec, WriteResult,
    validate_document_key,
};
use crate::query::{AqlQuery, Identifier};
use crate::storage::traits::DocumentStore;
use crate::{Error, Result};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// One collection's contents.
#[derive(Debug)]
struct Collection {
    kind: CollectionType,
    documents: Vec<Document>,
    next_key: u64,
    indexes: Vec<Value>,
}

impl Collection {
    fn new(name: &str, kind: CollectionType) -> Self {
        let mut indexes = vec![json!({
            "id": format!("{name}/0"),
            "name": "primary",
            "type": "primary",
            "fields": ["_key"],
            "unique": true,
            "sparse": false,
        })];
        if kind == CollectionType::Edge {
            indexes.push(json!({
                "id": format!("{name}/2"),
                "name": "edge",
                "type": "edge",
                "fields": ["_from", "_to"],
                "unique": false,
                "sparse": false,
            }));
        }
        Self {
            kind,
            documents: Vec::new(),
            next_key: 1,
            indexes,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.get("_key").and_then(Value::as_str) == Some(key))
    }

    fn find(&self, key: &str) -> Option<&Document> {
        self.position(key).map(|i| &self.documents[i])
    }

    fn allocate_key(&mut self) -> String {
        loop {
            let candidate = self.next_key.to_string();
            self.next_key += 1;
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// In-memory document store.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs.
///
/// # Example
///
/// ```rust
/// use tempograph::{CollectionType, DocumentStore, Identifier, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let people = Identifier::parse("people")?;
/// store.create_collection(&people, CollectionType::Document, false)?;
/// assert_eq!(store.collections()?.len(), 1);
/// # Ok::<(), tempograph::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<BTreeMap<String, Collection>>,
    revision: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection, or 0 if it does not exist.
    #[must_use]
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, |c| c.documents.len()))
            .unwrap_or(0)
    }

    fn next_rev(&self) -> String {
        format!("_r{}", self.revision.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn read(
        &self,
        operation: &str,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Collection>>> {
        self.collections.read().map_err(|_| poisoned(operation))
    }

    fn write(
        &self,
        operation: &str,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Collection>>> {
        self.collections.write().map_err(|_| poisoned(operation))
    }
}

fn poisoned(operation: &str) -> Error {
    Error::store(operation, "Lock poisoned")
}

fn collection_not_found(name: &str) -> Error {
    Error::NotFound(format!("collection or view not found: {name}"))
}

fn document_not_found(collection: &str, key: &str) -> Error {
    Error::NotFound(format!("document not found: {collection}/{key}"))
}

fn write_result(collection: &str, key: &str, rev: &str) -> WriteResult {
    WriteResult {
        id: format!("{collection}/{key}"),
        key: key.to_string(),
        rev: rev.to_string(),
    }
}

/// Merges `patch` into `target`, recursing into nested objects.
fn merge_into(target: &mut Document, patch: &Document) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_into(existing, incoming),
            _ => {
                target.insert(key.clone(), value.clone());
            },
        }
    }
}

fn check_endpoint(document: &Document, attribute: &str) -> Result<()> {
    let valid = document
        .get(attribute)
        .and_then(Value::as_str)
        .is_some_and(|id| DocumentId::parse(id).is_ok());
    if valid {
        Ok(())
    } else {
        Err(Error::store(
            "insert",
            format!("edge attribute missing or invalid: {attribute}"),
        ))
    }
}

impl DocumentStore for InMemoryStore {
    fn execute(&self, query: &AqlQuery) -> Result<Vec<Value>> {
        let collections = self.read("execute")?;
        eval::evaluate(&collections, &query.plan)
    }

    fn insert(&self, collection: &Identifier, document: &Document) -> Result<WriteResult> {
        let rev = self.next_rev();
        let mut collections = self.write("insert")?;
        let coll = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;

        if coll.kind == CollectionType::Edge {
            check_endpoint(document, "_from")?;
            check_endpoint(document, "_to")?;
        }

        let key = match document.get("_key") {
            Some(Value::String(key)) => {
                validate_document_key(key)?;
                if coll.position(key).is_some() {
                    return Err(Error::store(
                        "insert",
                        format!("unique constraint violated: {collection}/{key}"),
                    ));
                }
                key.clone()
            },
            Some(other) => {
                return Err(Error::Validation(format!("_key must be a string, got {other}")));
            },
            None => coll.allocate_key(),
        };

        let mut stored = document.clone();
        stored.insert("_key".to_string(), Value::String(key.clone()));
        stored.insert("_id".to_string(), Value::String(format!("{collection}/{key}")));
        stored.insert("_rev".to_string(), Value::String(rev.clone()));
        coll.documents.push(stored);

        Ok(write_result(collection.as_str(), &key, &rev))
    }

    fn update(&self, collection: &Identifier, key: &str, patch: &Document) -> Result<WriteResult> {
        let rev = self.next_rev();
        let mut collections = self.write("update")?;
        let coll = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;
        let index = coll
            .position(key)
            .ok_or_else(|| document_not_found(collection.as_str(), key))?;

        let mut patch = patch.clone();
        for system in ["_key", "_id", "_rev"] {
            patch.remove(system);
        }
        if coll.kind == CollectionType::Edge {
            for endpoint in ["_from", "_to"] {
                if patch.contains_key(endpoint) {
                    check_endpoint(&patch, endpoint)?;
                }
            }
        }

        let document = &mut coll.documents[index];
        merge_into(document, &patch);
        document.insert("_rev".to_string(), Value::String(rev.clone()));

        Ok(write_result(collection.as_str(), key, &rev))
    }

    fn get(&self, collection: &Identifier, key: &str) -> Result<Document> {
        let collections = self.read("get")?;
        let coll = collections
            .get(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;
        coll.find(key)
            .cloned()
            .ok_or_else(|| document_not_found(collection.as_str(), key))
    }

    fn remove(&self, collection: &Identifier, key: &str) -> Result<WriteResult> {
        let mut collections = self.write("remove")?;
        let coll = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;
        let index = coll
            .position(key)
            .ok_or_else(|| document_not_found(collection.as_str(), key))?;

        let removed = coll.documents.remove(index);
        let rev = removed
            .get("_rev")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(write_result(collection.as_str(), key, &rev))
    }

    fn truncate(&self, collection: &Identifier) -> Result<()> {
        let mut collections = self.write("truncate")?;
        let coll = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;
        coll.documents.clear();
        Ok(())
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.read("collections")?;
        Ok(collections
            .iter()
            .map(|(name, coll)| CollectionInfo {
                name: name.clone(),
                kind: coll.kind,
            })
            .collect())
    }

    fn create_collection(
        &self,
        name: &Identifier,
        kind: CollectionType,
        _wait_for_sync: bool,
    ) -> Result<CollectionInfo> {
        let mut collections = self.write("create_collection")?;
        if collections.contains_key(name.as_str()) {
            return Err(Error::store(
                "create_collection",
                format!("duplicate name: {name}"),
            ));
        }
        collections.insert(name.as_str().to_string(), Collection::new(name.as_str(), kind));
        Ok(CollectionInfo {
            name: name.as_str().to_string(),
            kind,
        })
    }

    fn add_index(&self, collection: &Identifier, spec: &IndexSpec) -> Result<Value> {
        let mut collections = self.write("add_index")?;
        let coll = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| collection_not_found(collection.as_str()))?;

        let payload = spec.payload();
        let unique = payload.get("unique").and_then(Value::as_bool).unwrap_or(false);
        let existing = coll.indexes.iter().find(|idx| {
            idx["type"] == payload["type"]
                && idx["fields"] == payload["fields"]
                && idx.get("unique").and_then(Value::as_bool).unwrap_or(false) == unique
        });
        if let Some(existing) = existing {
            let mut descriptor = existing.clone();
            descriptor["isNewlyCreated"] = Value::Bool(false);
            return Ok(descriptor);
        }

        let number = coll.indexes.len() + 1;
        let mut descriptor = Map::new();
        descriptor.insert("id".to_string(), json!(format!("{collection}/{number}")));
        descriptor.insert("name".to_string(), json!(format!("idx_{number}")));
        descriptor.insert("sparse".to_string(), Value::Bool(false));
        if let Value::Object(fields) = payload {
            descriptor.extend(fields);
        }
        descriptor
            .entry("unique".to_string())
            .or_insert(Value::Bool(false));
        coll.indexes.push(Value::Object(descriptor.clone()));

        descriptor.insert("isNewlyCreated".to_string(), Value::Bool(true));
        Ok(Value::Object(descriptor))
    }

    fn indexes(&self, collection: &Identifier) -> Result<Vec<Value>> {
        let collections = self.read("indexes")?;
        collections
            .get(collection.as_str())
            .map(|coll| coll.indexes.clone())
            .ok_or_else(|| collection_not_found(collection.as_str()))
    }
}
