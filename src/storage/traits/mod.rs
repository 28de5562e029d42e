//! Storage backend traits.
//!
//! # Error Modes
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Collection or document missing | [`Error::NotFound`](crate::Error::NotFound) |
//! | Anything else the store reports | [`Error::Store`](crate::Error::Store) |
//!
//! Implementations never retry and never buffer writes.

use crate::Result;
use crate::models::{CollectionInfo, CollectionType, Document, IndexSpec, WriteResult};
use crate::query::{AqlQuery, Identifier};
use serde_json::Value;

/// A document/graph database.
///
/// # Implementor Notes
///
/// - Methods take `&self` so a store can be shared as `Arc<S>`
/// - Use interior mutability for mutable state
/// - Return rows and index descriptors exactly as the database produced them
pub trait DocumentStore: Send + Sync {
    /// Runs a query and returns every result row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the query names a missing
    /// collection, or [`crate::Error::Store`] if it fails to run.
    fn execute(&self, query: &AqlQuery) -> Result<Vec<Value>>;

    /// Inserts a document, letting the store assign `_key` unless given.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is missing or the document is
    /// rejected (duplicate key, edge without endpoints).
    fn insert(&self, collection: &Identifier, document: &Document) -> Result<WriteResult>;

    /// Merges `patch` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the collection or document is
    /// missing.
    fn update(&self, collection: &Identifier, key: &str, patch: &Document) -> Result<WriteResult>;

    /// Fetches a document by key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the collection or document is
    /// missing.
    fn get(&self, collection: &Identifier, key: &str) -> Result<Document>;

    /// Deletes a document by key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the collection or document is
    /// missing.
    fn remove(&self, collection: &Identifier, key: &str) -> Result<WriteResult>;

    /// Deletes every document in a collection, keeping its indexes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the collection is missing.
    fn truncate(&self, collection: &Identifier) -> Result<()>;

    /// Lists non-system collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Creates a collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the name is taken.
    fn create_collection(
        &self,
        name: &Identifier,
        kind: CollectionType,
        wait_for_sync: bool,
    ) -> Result<CollectionInfo>;

    /// Ensures an index exists and returns its descriptor.
    ///
    /// Declaring an index identical to an existing one returns the existing
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is missing or the store rejects
    /// the definition.
    fn add_index(&self, collection: &Identifier, spec: &IndexSpec) -> Result<Value>;

    /// Lists the descriptors of every index on a collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the collection is missing.
    fn indexes(&self, collection: &Identifier) -> Result<Vec<Value>>;
}
