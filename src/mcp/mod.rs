//! Tool interface for agent access.
//!
//! Every service operation is available as an `arango_*` tool with a JSON
//! Schema for its arguments. Results are JSON text content.
//!
//! No transport is bundled; a host wires [`ToolRegistry::list_tools`] and
//! [`ToolRegistry::execute`] into whatever protocol server it runs.
//!
//! ```rust
//! use std::sync::Arc;
//! use tempograph::mcp::ToolRegistry;
//! use tempograph::{InMemoryStore, ServiceContainer};
//!
//! let registry = ToolRegistry::new(ServiceContainer::new(Arc::new(InMemoryStore::new())));
//! let result = registry.execute("arango_list_collections", serde_json::json!({}))?;
//! assert_eq!(result.text(), Some("[]"));
//! # Ok::<(), tempograph::Error>(())
//! ```

mod tool_types;
mod tools;

pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};
