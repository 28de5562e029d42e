//! Document and collection tool handlers.

use crate::mcp::tool_types::{
    CollectionArgs, CreateCollectionArgs, DocumentRefArgs, InsertArgs, NoArgs, QueryArgs,
    TemporalMetadataArgs, UpdateArgs, parse_args,
};
use crate::services::ServiceContainer;
use crate::storage::DocumentStore;
use crate::Result;
use serde_json::Value;

use super::super::ToolResult;

/// Executes `arango_query`.
pub fn execute_query<S: DocumentStore>(services: &ServiceContainer<S>, arguments: Value) -> Result<ToolResult> {
    const TOOL: &str = "arango_query";
    let args: QueryArgs = parse_args(TOOL, arguments)?;
    let outcome = services.documents().query(&args.query, args.bind_vars);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_insert`.
pub fn execute_insert<S: DocumentStore>(services: &ServiceContainer<S>, arguments: Value) -> Result<ToolResult> {
    const TOOL: &str = "arango_insert";
    let args: InsertArgs = parse_args(TOOL, arguments)?;
    let outcome = services.documents().insert(&args.collection, args.document);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_update`.
pub fn execute_update<S: DocumentStore>(services: &ServiceContainer<S>, arguments: Value) -> Result<ToolResult> {
    const TOOL: &str = "arango_update";
    let args: UpdateArgs = parse_args(TOOL, arguments)?;
    let outcome = services
        .documents()
        .update(&args.collection, &args.document_key, args.update);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_remove`.
pub fn execute_remove<S: DocumentStore>(services: &ServiceContainer<S>, arguments: Value) -> Result<ToolResult> {
    const TOOL: &str = "arango_remove";
    let args: DocumentRefArgs = parse_args(TOOL, arguments)?;
    let outcome = services.documents().remove(&args.collection, &args.document_key);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_get_document`.
pub fn execute_get_document<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_get_document";
    let args: DocumentRefArgs = parse_args(TOOL, arguments)?;
    let outcome = services.documents().get(&args.collection, &args.document_key);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_truncate_collection`.
pub fn execute_truncate_collection<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_truncate_collection";
    let args: CollectionArgs = parse_args(TOOL, arguments)?;
    let outcome = services
        .documents()
        .truncate(&args.collection)
        .map(|()| serde_json::json!({ "truncated": args.collection }));
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_list_collections`.
pub fn execute_list_collections<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_list_collections";
    let NoArgs {} = parse_args(TOOL, arguments)?;
    ToolResult::from_outcome(TOOL, services.documents().list_collections())
}

/// Executes `arango_create_collection`.
pub fn execute_create_collection<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_create_collection";
    let args: CreateCollectionArgs = parse_args(TOOL, arguments)?;
    let kind = args.kind()?;
    let outcome = services
        .documents()
        .create_collection(&args.name, kind, args.wait_for_sync);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_add_temporal_metadata`.
pub fn execute_add_temporal_metadata<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_add_temporal_metadata";
    let args: TemporalMetadataArgs = parse_args(TOOL, arguments)?;
    let stamped = services
        .documents()
        .add_temporal_metadata(args.document, args.is_update);
    ToolResult::from_outcome(TOOL, Ok(stamped))
}
