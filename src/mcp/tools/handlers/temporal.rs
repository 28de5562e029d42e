//! Temporal tool handlers.

use crate::mcp::tool_types::{
    TimeRangeArgs, TimeSeriesArgs, ValidAtArgs, ValidityPeriodArgs, parse_args,
};
use crate::services::ServiceContainer;
use crate::storage::DocumentStore;
use crate::Result;
use serde_json::Value;

use super::super::ToolResult;

/// Executes `arango_time_series_analysis`.
pub fn execute_time_series_analysis<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_time_series_analysis";
    let args: TimeSeriesArgs = parse_args(TOOL, arguments)?;
    let outcome = services.temporal().time_series_analysis(
        &args.collection,
        args.time_field.as_deref(),
        args.interval.as_deref().unwrap_or("day"),
        args.grouping_field.as_deref(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_query_by_time_range`.
pub fn execute_query_by_time_range<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_query_by_time_range";
    let args: TimeRangeArgs = parse_args(TOOL, arguments)?;
    let outcome = services.temporal().query_by_time_range(
        &args.collection,
        &args.start_time,
        &args.end_time,
        args.field.as_deref(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_query_valid_at`.
pub fn execute_query_valid_at<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_query_valid_at";
    let args: ValidAtArgs = parse_args(TOOL, arguments)?;
    let outcome = services
        .temporal()
        .query_valid_at(&args.collection, &args.timestamp);
    ToolResult::from_outcome(TOOL, outcome)
}

/// Executes `arango_set_validity_period`.
pub fn execute_set_validity_period<S: DocumentStore>(
    services: &ServiceContainer<S>,
    arguments: Value,
) -> Result<ToolResult> {
    const TOOL: &str = "arango_set_validity_period";
    let args: ValidityPeriodArgs = parse_args(TOOL, arguments)?;
    let outcome = services.temporal().set_validity_period(
        &args.collection,
        &args.document_key,
        args.valid_from.as_deref(),
        args.valid_until(),
    );
    ToolResult::from_outcome(TOOL, outcome)
}
