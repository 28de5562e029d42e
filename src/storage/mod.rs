//! Storage layer abstraction.
//!
//! Services talk to the database through [`DocumentStore`]:
//! - [`ArangoHttpStore`]: `ArangoDB` over its REST API
//! - [`InMemoryStore`]: evaluates built queries in process, for tests and
//!   local development

pub mod arango;
pub mod memory;
pub mod traits;

pub use arango::ArangoHttpStore;
pub use memory::InMemoryStore;
pub use traits::DocumentStore;
