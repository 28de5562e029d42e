//! Document, identifier and collection types.

use crate::query::{FieldPath, Identifier};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

/// A stored document: a JSON object keyed by attribute name.
pub type Document = Map<String, Value>;

/// Characters ArangoDB accepts in a document key.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-:.@()+,=;$!*'%]{1,254}$").unwrap_or_else(|_| unreachable!())
});

static NULL: Value = Value::Null;

/// Validates a document key against the store's key alphabet.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the key is empty, too long, or contains
/// characters outside the allowed set.
pub fn validate_document_key(key: &str) -> Result<()> {
    if KEY_PATTERN.is_match(key) {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid document key: {key:?}")))
    }
}

/// Reads the value at `path` inside `document`, or `null` if any segment is
/// missing or a non-object is encountered on the way.
#[must_use]
pub fn field_value<'a>(document: &'a Value, path: &FieldPath) -> &'a Value {
    let mut current = document;
    for segment in path.segments() {
        match current.get(segment) {
            Some(next) => current = next,
            None => return &NULL,
        }
    }
    current
}

/// A fully-qualified document id of the form `collection/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    collection: Identifier,
    key: String,
}

impl DocumentId {
    /// Parses and validates a `collection/key` id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the id has no `/`, the collection
    /// part is not a valid identifier, or the key part is not a valid key.
    pub fn parse(id: &str) -> Result<Self> {
        let (collection, key) = id.split_once('/').ok_or_else(|| {
            Error::Validation(format!("document id must be 'collection/key': {id:?}"))
        })?;
        let collection = Identifier::parse(collection)?;
        validate_document_key(key)?;
        Ok(Self {
            collection,
            key: key.to_string(),
        })
    }

    /// Returns the collection part.
    #[must_use]
    pub const fn collection(&self) -> &Identifier {
        &self.collection
    }

    /// Returns the key part.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Metadata returned by the store for a write (insert, update, remove).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Fully-qualified id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Store-assigned key.
    #[serde(rename = "_key")]
    pub key: String,
    /// Revision after the write.
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Kind of collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Plain document collection.
    Document,
    /// Edge collection; documents carry `_from` and `_to`.
    Edge,
}

impl CollectionType {
    /// Returns the collection type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Edge => "edge",
        }
    }

    /// Parses a collection type, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "document" | "doc" => Some(Self::Document),
            "edge" | "edges" => Some(Self::Edge),
            _ => None,
        }
    }

    /// The numeric type code used by the ArangoDB REST API.
    #[must_use]
    pub const fn code(&self) -> u64 {
        match self {
            Self::Document => 2,
            Self::Edge => 3,
        }
    }

    /// Maps a REST API type code back to a collection type.
    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            2 => Some(Self::Document),
            3 => Some(Self::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name and type of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Collection type.
    #[serde(rename = "type")]
    pub kind: CollectionType,
}
