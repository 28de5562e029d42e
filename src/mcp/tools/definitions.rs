//! Tool definitions.
//!
//! Contains the JSON Schema definitions for all tempograph tools.

use super::ToolDefinition;
use serde_json::{Value, json};

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn object(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

fn depth(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "default": 1, "description": description })
}

fn direction() -> Value {
    json!({
        "type": "string",
        "enum": ["outbound", "inbound", "any"],
        "default": "outbound",
        "description": "Edge direction to follow"
    })
}

/// Every tool definition.
pub fn all() -> Vec<ToolDefinition> {
    vec![
        query_tool(),
        insert_tool(),
        update_tool(),
        remove_tool(),
        get_document_tool(),
        truncate_collection_tool(),
        list_collections_tool(),
        create_collection_tool(),
        add_temporal_metadata_tool(),
        create_edge_tool(),
        create_sequential_relationship_tool(),
        query_edges_tool(),
        traverse_graph_tool(),
        temporal_traverse_tool(),
        time_series_analysis_tool(),
        query_by_time_range_tool(),
        query_valid_at_tool(),
        set_validity_period_tool(),
        create_index_tool(),
        list_indexes_tool(),
        create_temporal_indexes_tool(),
    ]
}

// ============================================================================
// Documents
// ============================================================================

/// Defines the raw query tool.
pub fn query_tool() -> ToolDefinition {
    tool(
        "arango_query",
        "Execute an AQL query with optional bind variables",
        json!({
            "type": "object",
            "properties": {
                "query": string("AQL query text"),
                "bind_vars": object("Bind parameters referenced as @name in the query")
            },
            "required": ["query"]
        }),
    )
}

/// Defines the insert tool.
pub fn insert_tool() -> ToolDefinition {
    tool(
        "arango_insert",
        "Insert a document; created_at, updated_at, valid_from and valid_until are added automatically",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Target collection"),
                "document": object("Document body")
            },
            "required": ["collection", "document"]
        }),
    )
}

/// Defines the update tool.
pub fn update_tool() -> ToolDefinition {
    tool(
        "arango_update",
        "Merge fields into a document and refresh updated_at. Validity bounds are changed with arango_set_validity_period",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection name"),
                "document_key": string("Key of the document to update"),
                "update": object("Fields to merge")
            },
            "required": ["collection", "document_key", "update"]
        }),
    )
}

/// Defines the remove tool.
pub fn remove_tool() -> ToolDefinition {
    tool(
        "arango_remove",
        "Delete a document by key",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection name"),
                "document_key": string("Key of the document to delete")
            },
            "required": ["collection", "document_key"]
        }),
    )
}

/// Defines the get tool.
pub fn get_document_tool() -> ToolDefinition {
    tool(
        "arango_get_document",
        "Fetch a document by key",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection name"),
                "document_key": string("Document key")
            },
            "required": ["collection", "document_key"]
        }),
    )
}

/// Defines the truncate tool.
pub fn truncate_collection_tool() -> ToolDefinition {
    tool(
        "arango_truncate_collection",
        "Remove every document from a collection",
        json!({
            "type": "object",
            "properties": { "collection": string("Collection name") },
            "required": ["collection"]
        }),
    )
}

/// Defines the list collections tool.
pub fn list_collections_tool() -> ToolDefinition {
    tool(
        "arango_list_collections",
        "List non-system collections with their types",
        json!({ "type": "object", "properties": {} }),
    )
}

/// Defines the create collection tool.
pub fn create_collection_tool() -> ToolDefinition {
    tool(
        "arango_create_collection",
        "Create a document or edge collection",
        json!({
            "type": "object",
            "properties": {
                "name": string("Collection name"),
                "collection_type": {
                    "type": "string",
                    "enum": ["document", "edge"],
                    "default": "document",
                    "description": "Collection type"
                },
                "wait_for_sync": {
                    "type": "boolean",
                    "default": false,
                    "description": "Wait for writes to be synced to disk"
                }
            },
            "required": ["name"]
        }),
    )
}

/// Defines the stamping tool.
pub fn add_temporal_metadata_tool() -> ToolDefinition {
    tool(
        "arango_add_temporal_metadata",
        "Return a document with temporal metadata added, without storing it",
        json!({
            "type": "object",
            "properties": {
                "document": object("Document to stamp"),
                "is_update": {
                    "type": "boolean",
                    "default": false,
                    "description": "Only refresh updated_at"
                }
            },
            "required": ["document"]
        }),
    )
}

// ============================================================================
// Graph
// ============================================================================

/// Defines the create edge tool.
pub fn create_edge_tool() -> ToolDefinition {
    tool(
        "arango_create_edge",
        "Create an edge between two documents with temporal metadata",
        json!({
            "type": "object",
            "properties": {
                "edge_collection": string("Edge collection"),
                "from_id": string("Source document id (collection/key)"),
                "to_id": string("Target document id (collection/key)"),
                "attributes": object("Extra edge attributes")
            },
            "required": ["edge_collection", "from_id", "to_id"]
        }),
    )
}

/// Defines the sequence tool.
pub fn create_sequential_relationship_tool() -> ToolDefinition {
    tool(
        "arango_create_sequential_relationship",
        "Chain documents in order with edges tagged by relationship_type and sequence_index",
        json!({
            "type": "object",
            "properties": {
                "edge_collection": string("Edge collection"),
                "items": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 2,
                    "description": "Document ids in sequence order"
                },
                "relationship_type": {
                    "type": "string",
                    "default": "NEXT",
                    "description": "Relationship label stored on every edge"
                },
                "attributes": object("Attributes copied onto every edge")
            },
            "required": ["edge_collection", "items"]
        }),
    )
}

/// Defines the edge query tool.
pub fn query_edges_tool() -> ToolDefinition {
    tool(
        "arango_query_edges",
        "List edges, optionally restricted to a source and/or target",
        json!({
            "type": "object",
            "properties": {
                "edge_collection": string("Edge collection"),
                "from_id": string("Only edges leaving this document"),
                "to_id": string("Only edges entering this document")
            },
            "required": ["edge_collection"]
        }),
    )
}

/// Defines the traversal tool.
pub fn traverse_graph_tool() -> ToolDefinition {
    tool(
        "arango_traverse_graph",
        "Walk the graph from a start vertex, returning each reached vertex with its edge and path",
        json!({
            "type": "object",
            "properties": {
                "start_vertex": string("Start document id (collection/key)"),
                "edge_collection": string("Edge collection to follow"),
                "min_depth": depth("Minimum path length"),
                "max_depth": depth("Maximum path length"),
                "direction": direction()
            },
            "required": ["start_vertex", "edge_collection"]
        }),
    )
}

/// Defines the point-in-time traversal tool.
pub fn temporal_traverse_tool() -> ToolDefinition {
    tool(
        "arango_temporal_traverse",
        "Walk the graph as it was at a timestamp; only paths whose vertices and edges were all valid then are returned",
        json!({
            "type": "object",
            "properties": {
                "start_vertex": string("Start document id (collection/key)"),
                "edge_collection": string("Edge collection to follow"),
                "timestamp": string("ISO-8601 instant"),
                "min_depth": depth("Minimum path length"),
                "max_depth": depth("Maximum path length"),
                "direction": direction()
            },
            "required": ["start_vertex", "edge_collection", "timestamp"]
        }),
    )
}

// ============================================================================
// Temporal
// ============================================================================

/// Defines the time series tool.
pub fn time_series_analysis_tool() -> ToolDefinition {
    tool(
        "arango_time_series_analysis",
        "Count documents per time bucket, optionally split by a grouping field",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection to aggregate"),
                "time_field": {
                    "type": "string",
                    "default": "created_at",
                    "description": "Timestamp field to bucket on"
                },
                "interval": {
                    "type": "string",
                    "enum": ["hour", "day", "week", "month", "year"],
                    "default": "day",
                    "description": "Bucket size; unknown values fall back to day"
                },
                "grouping_field": string("Field to split buckets by")
            },
            "required": ["collection"]
        }),
    )
}

/// Defines the time range tool.
pub fn query_by_time_range_tool() -> ToolDefinition {
    tool(
        "arango_query_by_time_range",
        "Find documents whose timestamp field lies within an inclusive range",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection to search"),
                "start_time": string("Inclusive lower bound (ISO-8601)"),
                "end_time": string("Inclusive upper bound (ISO-8601)"),
                "field": {
                    "type": "string",
                    "default": "created_at",
                    "description": "Timestamp field to compare"
                }
            },
            "required": ["collection", "start_time", "end_time"]
        }),
    )
}

/// Defines the point-in-time query tool.
pub fn query_valid_at_tool() -> ToolDefinition {
    tool(
        "arango_query_valid_at",
        "Find documents valid at a timestamp (valid_from <= t and valid_until is null or >= t)",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection to search"),
                "timestamp": string("ISO-8601 instant")
            },
            "required": ["collection", "timestamp"]
        }),
    )
}

/// Defines the validity period tool.
pub fn set_validity_period_tool() -> ToolDefinition {
    tool(
        "arango_set_validity_period",
        "Set the validity window of a document; pass valid_until null to reopen it",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection name"),
                "document_key": string("Document key"),
                "valid_from": string("New start of validity (ISO-8601)"),
                "valid_until": {
                    "type": ["string", "null"],
                    "description": "New end of validity (ISO-8601), or null for open-ended"
                }
            },
            "required": ["collection", "document_key"]
        }),
    )
}

// ============================================================================
// Schema
// ============================================================================

/// Defines the create index tool.
pub fn create_index_tool() -> ToolDefinition {
    tool(
        "arango_create_index",
        "Create an index on a collection",
        json!({
            "type": "object",
            "properties": {
                "collection": string("Collection to index"),
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Attribute paths to index"
                },
                "index_type": {
                    "type": "string",
                    "default": "persistent",
                    "description": "persistent, hash, skiplist, ttl, geo or fulltext"
                },
                "unique": {
                    "type": "boolean",
                    "default": false,
                    "description": "Enforce uniqueness (ignored for geo and fulltext)"
                }
            },
            "required": ["collection", "fields"]
        }),
    )
}

/// Defines the list indexes tool.
pub fn list_indexes_tool() -> ToolDefinition {
    tool(
        "arango_list_indexes",
        "List the indexes of a collection",
        json!({
            "type": "object",
            "properties": { "collection": string("Collection name") },
            "required": ["collection"]
        }),
    )
}

/// Defines the temporal indexes tool.
pub fn create_temporal_indexes_tool() -> ToolDefinition {
    tool(
        "arango_create_temporal_indexes",
        "Ensure indexes on created_at, updated_at and (valid_from, valid_until)",
        json!({
            "type": "object",
            "properties": { "collection": string("Collection name") },
            "required": ["collection"]
        }),
    )
}
