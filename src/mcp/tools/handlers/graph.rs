//! Graph tool handlers.

use crate::mcp::tool_types::{CreateEdgeArgs, QueryEdgesArgs, SequenceArgs, TraverseArgs, parse_args};
use crate::services::ServiceContainer;
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde_json::Value;

use super::super::ToolResult;

/// Executes `arango_create_edge`.
pub fn execute_create_edge<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_create_edge";
    let args: CreateEdgeArgs = parse_args(TOOL, arguments)?;
    let outcome = services.graph().create_edge(
        &args.edge_collection,
        &args.from_id,
        &args.to_id,
        args.attributes.as_ref(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_create_sequential_relationship`.
pub fn execute_create_sequential_relationship<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_create_sequential_relationship";
    let args: SequenceArgs = parse_args(TOOL, arguments)?;
    let outcome = services.graph().create_sequential_relationship(
        &args.edge_collection,
        &args.items,
        args.relationship_type.as_deref(),
        args.attributes.as_ref(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_query_edges`.
pub fn execute_query_edges<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_query_edges";
    let args: QueryEdgesArgs = parse_args(TOOL, arguments)?;
    let outcome = services.graph().query_edges(
        &args.edge_collection,
        args.from_id.as_deref(),
        args.to_id.as_deref(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_traverse_graph`.
pub fn execute_traverse_graph<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_traverse_graph";
    let args: TraverseArgs = parse_args(TOOL, arguments)?;
    if args.timestamp.is_some() {
        return Err(Error::Validation(format!(
            "{TOOL} does not take a timestamp; use arango_temporal_traverse"
        )));
    }
    let outcome = services.graph().traverse_graph(
        &args.start_vertex,
        &args.edge_collection,
        args.depth()?,
        args.direction()?,
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_temporal_traverse`.
pub fn execute_temporal_traverse<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_temporal_traverse";
    let args: TraverseArgs = parse_args(TOOL, arguments)?;
    let timestamp = args
        .timestamp
        .as_deref()
        .ok_or_else(|| Error::Validation(format!("{TOOL} requires a timestamp")))?;
    let outcome = services.graph().temporal_traverse(
        &args.start_vertex,
        &args.edge_collection,
        timestamp,
        args.depth()?,
        args.direction()?,
    );
    ToolResult::from_outcome(TOOL, outcome)
}
