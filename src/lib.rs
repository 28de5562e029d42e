//! # Tempograph
//!
//! Temporal graph query and traversal tools for ArangoDB-style document stores.
//!
//! Every document written through this crate carries `created_at`,
//! `updated_at`, `valid_from` and `valid_until`. Edges can be traversed as of
//! a point in time, documents can be bucketed by time, and validity windows
//! are only ever moved through a dedicated operation.
//!
//! ## Features
//!
//! - Temporal metadata stamping with an injectable clock
//! - Parameterized AQL construction with allow-listed identifiers
//! - Bounded-depth traversal, with and without point-in-time filtering
//! - Time-bucketed aggregation (hour, day, week, month, year)
//! - Pluggable stores (ArangoDB over HTTP, in-memory for tests)
//! - MCP-style tool registry for agent access
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tempograph::services::ServiceContainer;
//! use tempograph::storage::InMemoryStore;
//! use tempograph::models::CollectionType;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let services = ServiceContainer::new(store);
//! services
//!     .documents()
//!     .create_collection("people", CollectionType::Document, false)?;
//! let person = serde_json::json!({ "name": "Ada" });
//! let result = services
//!     .documents()
//!     .insert("people", person.as_object().cloned().unwrap_or_default())?;
//! assert!(result.id.starts_with("people/"));
//! # Ok::<(), tempograph::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod query;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{ArangoConfig, TempographConfig};
pub use models::{
    Clock, CollectionType, Document, DocumentId, ManualClock, StampMode, SystemClock,
    TraversalStep, WriteResult, stamp,
};
pub use query::{AqlQuery, DepthRange, Direction, FieldPath, Identifier, TimeInterval};
pub use services::ServiceContainer;
pub use storage::{ArangoHttpStore, DocumentStore, InMemoryStore};

/// Error type for tempograph operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `NotFound` | Referenced collection or document key does not exist |
/// | `Validation` | Malformed identifier, id or timestamp; insufficient input; inverted depth bounds |
/// | `Store` | Any other failure surfaced by the underlying store |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A referenced collection or document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input failed validation before reaching the store.
    ///
    /// Raised when:
    /// - A collection or field name fails the identifier allow-list
    /// - A document id is not of the form `collection/key`
    /// - A timestamp is not ISO-8601
    /// - A sequential relationship has fewer than two items
    /// - A depth range has `min > max`
    /// - An ordinary update tries to touch `created_at` or the validity window
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store reported a failure. The store's message is kept verbatim.
    #[error("store operation '{operation}' failed: {cause}")]
    Store {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds a [`Error::Store`] from an operation name and cause.
    pub fn store(operation: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            cause: cause.into(),
        }
    }
}

/// Result type alias for tempograph operations.
pub type Result<T> = std::result::Result<T, Error>;
