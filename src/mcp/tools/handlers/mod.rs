//! Tool execution handlers.
//!
//! Each handler decodes its arguments, calls one service operation and
//! renders the outcome, organized into submodules by service.

mod documents;
mod graph;
mod schema;
mod temporal;

pub use documents::{
    execute_add_temporal_metadata, execute_create_collection, execute_get_document, execute_insert,
    execute_list_collections, execute_query, execute_remove, execute_truncate_collection,
    execute_update,
};
pub use graph::{
    execute_create_edge, execute_create_sequential_relationship, execute_query_edges,
    execute_temporal_traverse, execute_traverse_graph,
};
pub use schema::{execute_create_index, execute_create_temporal_indexes, execute_list_indexes};
pub use temporal::{
    execute_query_by_time_range, execute_query_valid_at, execute_set_validity_period,
    execute_time_series_analysis,
};
