//! Index declarations.

use crate::models::temporal::{CREATED_AT, UPDATED_AT, VALID_FROM, VALID_UNTIL};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Index kind. Unknown kinds pass through to the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexType {
    /// Sorted index on one or more attributes.
    #[default]
    Persistent,
    /// Legacy alias of persistent.
    Hash,
    /// Legacy alias of persistent.
    Skiplist,
    /// Time-to-live index.
    Ttl,
    /// Geo-spatial index.
    Geo,
    /// Full-text index.
    Fulltext,
    /// Any other kind the store understands.
    Other(String),
}

impl IndexType {
    /// Returns the index type as the store spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Persistent => "persistent",
            Self::Hash => "hash",
            Self::Skiplist => "skiplist",
            Self::Ttl => "ttl",
            Self::Geo => "geo",
            Self::Fulltext => "fulltext",
            Self::Other(other) => other,
        }
    }

    /// Parses an index type, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "persistent" => Self::Persistent,
            "hash" => Self::Hash,
            "skiplist" => Self::Skiplist,
            "ttl" => Self::Ttl,
            "geo" => Self::Geo,
            "fulltext" => Self::Fulltext,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Whether the store honors a `unique` flag for this kind.
    #[must_use]
    pub const fn supports_unique(&self) -> bool {
        !matches!(self, Self::Geo | Self::Fulltext)
    }
}

impl From<String> for IndexType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<IndexType> for String {
    fn from(t: IndexType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An index to declare on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index kind.
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Indexed attributes, in order.
    pub fields: Vec<String>,
    /// Whether values must be unique. Ignored for geo and fulltext.
    #[serde(default)]
    pub unique: bool,
}

impl IndexSpec {
    /// Creates an index spec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `fields` is empty or names an empty
    /// attribute.
    pub fn new(index_type: IndexType, fields: Vec<String>, unique: bool) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::Validation("an index needs at least one field".to_string()));
        }
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::Validation("index field names cannot be empty".to_string()));
        }
        Ok(Self {
            index_type,
            fields,
            unique,
        })
    }

    /// A non-unique persistent index.
    #[must_use]
    pub fn persistent(fields: &[&str]) -> Self {
        Self {
            index_type: IndexType::Persistent,
            fields: fields.iter().map(ToString::to_string).collect(),
            unique: false,
        }
    }

    /// The request body sent to the store.
    #[must_use]
    pub fn payload(&self) -> Value {
        if self.index_type.supports_unique() {
            json!({
                "type": self.index_type.as_str(),
                "fields": self.fields,
                "unique": self.unique,
            })
        } else {
            json!({
                "type": self.index_type.as_str(),
                "fields": self.fields,
            })
        }
    }

    /// The standard temporal index bundle, keyed by purpose.
    #[must_use]
    pub fn temporal_bundle() -> [(&'static str, Self); 3] {
        [
            (CREATED_AT, Self::persistent(&[CREATED_AT])),
            (UPDATED_AT, Self::persistent(&[UPDATED_AT])),
            ("validity_period", Self::persistent(&[VALID_FROM, VALID_UNTIL])),
        ]
    }
}

/// Store descriptors for the three standard temporal indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalIndexes {
    /// Index on `created_at`.
    pub created_at: Value,
    /// Index on `updated_at`.
    pub updated_at: Value,
    /// Compound index on `(valid_from, valid_until)`.
    pub validity_period: Value,
}
