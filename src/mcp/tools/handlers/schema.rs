//! Index tool handlers.

use crate::mcp::tool_types::{CollectionArgs, CreateIndexArgs, parse_args};
use crate::models::IndexType;
use crate::services::ServiceContainer;
use crate::storage::DocumentStore;
use crate::Result;
use serde_json::Value;

use super::super::ToolResult;

/// Executes `arango_create_index`.
pub fn execute_create_index<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_create_index";
    let args: CreateIndexArgs = parse_args(TOOL, arguments)?;
    let index_type = args
        .index_type
        .as_deref()
        .map(IndexType::parse)
        .unwrap_or_default();
    let outcome = services
        .schema()
        .create_index(&args.collection, args.fields, index_type, args.unique);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_list_indexes`.
pub fn execute_list_indexes<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_list_indexes";
    let args: CollectionArgs = parse_args(TOOL, arguments)?;
    ToolResult::from_outcome(TOOL, services.schema().list_indexes(&args.collection))
}

/// Executes `arango_create_temporal_indexes`.
pub fn execute_create_temporal_indexes<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_create_temporal_indexes";
    let args: CollectionArgs = parse_args(TOOL, arguments)?;
    ToolResult::from_outcome(TOOL, services.schema().create_temporal_indexes(&args.collection))
}
