//! Argument types and helper functions for tools.
//!
//! All argument types use `#[serde(deny_unknown_fields)]` so a misspelled
//! parameter fails loudly instead of being silently ignored.

use crate::models::{CollectionType, Document, ValidUntil};
use crate::query::{DepthRange, Direction};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Decodes tool arguments. A missing argument object is treated as `{}`.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the tool if the arguments do not
/// match its parameter set.
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| Error::Validation(format!("invalid arguments for {tool}: {e}")))
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

const fn default_depth() -> u32 {
    1
}

/// Arguments for `arango_query`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryArgs {
    /// AQL text.
    pub query: String,
    /// Bind parameters.
    #[serde(default)]
    pub bind_vars: Map<String, Value>,
}

/// Arguments for `arango_insert`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsertArgs {
    /// Target collection.
    pub collection: String,
    /// Document body.
    pub document: Document,
}

/// Arguments for `arango_update`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateArgs {
    /// Target collection.
    pub collection: String,
    /// Key of the document to patch.
    pub document_key: String,
    /// Fields to merge.
    pub update: Document,
}

/// Arguments for tools addressing one document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRefArgs {
    /// Collection name.
    pub collection: String,
    /// Document key.
    pub document_key: String,
}

/// Arguments for tools addressing one collection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionArgs {
    /// Collection name.
    pub collection: String,
}

/// Arguments for tools taking none.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// Arguments for `arango_create_collection`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCollectionArgs {
    /// New collection name.
    pub name: String,
    /// `document` (default) or `edge`.
    pub collection_type: Option<String>,
    /// Whether writes wait for disk sync.
    #[serde(default)]
    pub wait_for_sync: bool,
}

impl CreateCollectionArgs {
    /// The requested collection type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown type name.
    pub fn kind(&self) -> Result<CollectionType> {
        self.collection_type.as_deref().map_or(Ok(CollectionType::Document), |name| {
            CollectionType::parse(name)
                .ok_or_else(|| Error::Validation(format!("unknown collection type: {name}")))
        })
    }
}

/// Arguments for `arango_add_temporal_metadata`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemporalMetadataArgs {
    /// Document to stamp.
    pub document: Document,
    /// Stamp as an update rather than a creation.
    #[serde(default)]
    pub is_update: bool,
}

/// Arguments for `arango_create_edge`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEdgeArgs {
    /// Edge collection.
    pub edge_collection: String,
    /// Source document id.
    pub from_id: String,
    /// Target document id.
    pub to_id: String,
    /// Extra edge attributes.
    pub attributes: Option<Document>,
}

/// Arguments for `arango_create_sequential_relationship`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceArgs {
    /// Edge collection.
    pub edge_collection: String,
    /// Document ids in order.
    pub items: Vec<String>,
    /// Relationship label, `NEXT` if absent.
    pub relationship_type: Option<String>,
    /// Attributes copied onto every edge.
    pub attributes: Option<Document>,
}

/// Arguments for `arango_query_edges`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryEdgesArgs {
    /// Edge collection.
    pub edge_collection: String,
    /// Restrict to this source.
    pub from_id: Option<String>,
    /// Restrict to this target.
    pub to_id: Option<String>,
}

/// Arguments for `arango_traverse_graph` and `arango_temporal_traverse`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraverseArgs {
    /// Start vertex id.
    pub start_vertex: String,
    /// Edge collection to follow.
    pub edge_collection: String,
    /// Instant to traverse at (temporal traversal only).
    pub timestamp: Option<String>,
    /// Minimum path length.
    #[serde(default = "default_depth")]
    pub min_depth: u32,
    /// Maximum path length.
    #[serde(default = "default_depth")]
    pub max_depth: u32,
    /// `outbound` (default), `inbound` or `any`.
    pub direction: Option<String>,
}

impl TraverseArgs {
    /// The depth bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `min_depth > max_depth`.
    pub fn depth(&self) -> Result<DepthRange> {
        DepthRange::new(self.min_depth, self.max_depth)
    }

    /// The traversal direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown direction.
    pub fn direction(&self) -> Result<Direction> {
        self.direction
            .as_deref()
            .map_or(Ok(Direction::default()), Direction::parse)
    }
}

/// Arguments for `arango_time_series_analysis`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSeriesArgs {
    /// Collection to aggregate.
    pub collection: String,
    /// Timestamp field, `created_at` if absent.
    pub time_field: Option<String>,
    /// Bucket size, `day` if absent.
    pub interval: Option<String>,
    /// Optional field to split buckets by.
    pub grouping_field: Option<String>,
}

/// Arguments for `arango_query_by_time_range`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeRangeArgs {
    /// Collection to search.
    pub collection: String,
    /// Inclusive lower bound.
    pub start_time: String,
    /// Inclusive upper bound.
    pub end_time: String,
    /// Timestamp field, `created_at` if absent.
    pub field: Option<String>,
}

/// Arguments for `arango_query_valid_at`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidAtArgs {
    /// Collection to search.
    pub collection: String,
    /// Instant to test.
    pub timestamp: String,
}

/// Arguments for `arango_set_validity_period`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidityPeriodArgs {
    /// Collection name.
    pub collection: String,
    /// Document key.
    pub document_key: String,
    /// New start of validity.
    pub valid_from: Option<String>,
    /// New end of validity; an explicit `null` reopens the window.
    #[serde(default, deserialize_with = "explicit_null")]
    pub valid_until: Option<Option<String>>,
}

impl ValidityPeriodArgs {
    /// The requested `valid_until` change, if any.
    #[must_use]
    pub fn valid_until(&self) -> Option<ValidUntil> {
        self.valid_until.as_ref().map(|until| {
            until
                .as_ref()
                .map_or(ValidUntil::Open, |ts| ValidUntil::Set(ts.clone()))
        })
    }
}

/// Arguments for `arango_create_index`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIndexArgs {
    /// Collection to index.
    pub collection: String,
    /// Indexed attribute paths.
    pub fields: Vec<String>,
    /// Index kind, `persistent` if absent.
    pub index_type: Option<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}
