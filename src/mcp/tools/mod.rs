//! Tool registry.
//!
//! Exposes every service operation as a named tool with a JSON Schema for
//! its arguments. Transport is left to the host.
//!
//! # Module Structure
//!
//! - [`definitions`]: Tool schema definitions
//! - [`handlers`]: Tool execution logic, one submodule per service

mod definitions;
mod handlers;

use crate::services::ServiceContainer;
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{instrument, warn};

/// Registry of tools bound to one service container.
pub struct ToolRegistry<S: DocumentStore> {
    services: ServiceContainer<S>,
    tools: BTreeMap<String, ToolDefinition>,
}

impl<S: DocumentStore> ToolRegistry<S> {
    /// Creates a registry with every tempograph tool.
    #[must_use]
    pub fn new(services: ServiceContainer<S>) -> Self {
        let tools = definitions::all()
            .into_iter()
            .map(|tool| (tool.name.clone(), tool))
            .collect();
        Self { services, tools }
    }

    /// Returns all tool definitions, sorted by name.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// Missing data and store failures come back as a result with
    /// `is_error` set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown tool, arguments that do
    /// not fit the tool's parameters, or input the operation rejects.
    #[instrument(skip(self, arguments), fields(operation = "tools.execute"))]
    pub fn execute(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        let s = &self.services;
        match name {
            "arango_query" => handlers::execute_query(s, arguments),
            "arango_insert" => handlers::execute_insert(s, arguments),
            "arango_update" => handlers::execute_update(s, arguments),
            "arango_remove" => handlers::execute_remove(s, arguments),
            "arango_get_document" => handlers::execute_get_document(s, arguments),
            "arango_truncate_collection" => handlers::execute_truncate_collection(s, arguments),
            "arango_list_collections" => handlers::execute_list_collections(s, arguments),
            "arango_create_collection" => handlers::execute_create_collection(s, arguments),
            "arango_add_temporal_metadata" => handlers::execute_add_temporal_metadata(s, arguments),
            // Graph tools
            "arango_create_edge" => handlers::execute_create_edge(s, arguments),
            "arango_create_sequential_relationship" => {
                handlers::execute_create_sequential_relationship(s, arguments)
            },
            "arango_query_edges" => handlers::execute_query_edges(s, arguments),
            "arango_traverse_graph" => handlers::execute_traverse_graph(s, arguments),
            "arango_temporal_traverse" => handlers::execute_temporal_traverse(s, arguments),
            // Temporal tools
            "arango_time_series_analysis" => handlers::execute_time_series_analysis(s, arguments),
            "arango_query_by_time_range" => handlers::execute_query_by_time_range(s, arguments),
            "arango_query_valid_at" => handlers::execute_query_valid_at(s, arguments),
            "arango_set_validity_period" => handlers::execute_set_validity_period(s, arguments),
            // Schema tools
            "arango_create_index" => handlers::execute_create_index(s, arguments),
            "arango_list_indexes" => handlers::execute_list_indexes(s, arguments),
            "arango_create_temporal_indexes" => {
                handlers::execute_create_temporal_indexes(s, arguments)
            },
            _ => Err(Error::Validation(format!("Unknown tool: {name}"))),
        }
    }
}

/// Definition of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Renders an operation outcome: the value as pretty JSON, or the error
    /// message flagged as an error.
    ///
    /// # Errors
    ///
    /// Passes [`Error::Validation`] through unchanged, so every input the
    /// caller got wrong surfaces the same way whether the tool layer or the
    /// service caught it.
    pub fn from_outcome<T: Serialize>(tool: &str, outcome: Result<T>) -> Result<Self> {
        let rendered = outcome.and_then(|value| {
            serde_json::to_string_pretty(&value).map_err(|e| Error::store("encode_tool_result", e.to_string()))
        });
        match rendered {
            Ok(text) => Ok(Self {
                content: vec![ToolContent::Text { text }],
                is_error: false,
            }),
            Err(e @ Error::Validation(_)) => Err(e),
            Err(e) => {
                warn!(tool, error = %e, "tool call failed");
                Ok(Self {
                    content: vec![ToolContent::Text {
                        text: e.to_string(),
                    }],
                    is_error: true,
                })
            },
        }
    }

    /// The text of the first content block.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}
