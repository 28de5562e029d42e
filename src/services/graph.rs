//! Graph service for edge creation and traversal.
//!
//! Provides a service layer over [`DocumentStore`] for building edges with
//! temporal metadata and walking them, either plainly or as of one instant.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tempograph::{CollectionType, DepthRange, Direction, InMemoryStore, ServiceContainer};
//!
//! let services = ServiceContainer::new(Arc::new(InMemoryStore::new()));
//! let docs = services.documents();
//! docs.create_collection("steps", CollectionType::Document, false)?;
//! docs.create_collection("next", CollectionType::Edge, false)?;
//! for key in ["a", "b", "c"] {
//!     let mut step = tempograph::Document::new();
//!     step.insert("_key".into(), key.into());
//!     docs.insert("steps", step)?;
//! }
//!
//! let graph = services.graph();
//! let items = ["steps/a", "steps/b", "steps/c"].map(String::from);
//! graph.create_sequential_relationship("next", &items, None, None)?;
//!
//! let reached = graph.traverse_graph("steps/a", "next", DepthRange::new(1, 2)?, Direction::Outbound)?;
//! assert_eq!(reached.len(), 2);
//! # Ok::<(), tempograph::Error>(())
//! ```

use super::normalize_supplied_validity;
use crate::models::temporal::normalize_timestamp;
use crate::models::{Clock, Document, DocumentId, StampMode, TraversalStep, WriteResult, stamp};
use crate::observability::timed;
use crate::query::{DepthRange, Direction, Identifier, QueryBuilder};
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Relationship type used when a sequence does not name one.
pub const DEFAULT_RELATIONSHIP_TYPE: &str = "NEXT";

/// Edge creation and traversal.
///
/// # Thread Safety
///
/// The service is thread-safe when the underlying store is.
pub struct GraphService<S: DocumentStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> GraphService<S> {
    /// Creates a graph service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Builds a stamped edge document from a template.
    fn edge_document(
        &self,
        template: Option<&Document>,
        from: &DocumentId,
        to: &DocumentId,
    ) -> Document {
        let mut edge = template.cloned().unwrap_or_default();
        edge.insert("_from".to_string(), Value::String(from.to_string()));
        edge.insert("_to".to_string(), Value::String(to.to_string()));
        stamp(&mut edge, StampMode::Create, self.clock.as_ref());
        edge
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Creates one edge from `from_id` to `to_id`.
    ///
    /// The referenced documents are not checked for existence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed ids or names and
    /// [`Error::NotFound`] if the edge collection is missing.
    #[instrument(skip(self, attributes), fields(operation = "graph.create_edge"))]
    pub fn create_edge(
        &self,
        edge_collection: &str,
        from_id: &str,
        to_id: &str,
        attributes: Option<&Document>,
    ) -> Result<WriteResult> {
        timed("graph.create_edge", || {
            let collection = Identifier::parse(edge_collection)?;
            let from = DocumentId::parse(from_id)?;
            let to = DocumentId::parse(to_id)?;
            let template = edge_template(attributes)?;

            let edge = self.edge_document(template.as_ref(), &from, &to);
            self.store.insert(&collection, &edge)
        })
    }

    /// Chains `items` with N-1 edges, `items[i] -> items[i + 1]`, each tagged
    /// with `relationship_type` and `sequence_index = i`.
    ///
    /// Every id is validated before the first insert. Inserts are not
    /// transactional: if the store fails part way, earlier edges remain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if fewer than two items are given or any
    /// id is malformed.
    #[instrument(
        skip(self, items, attributes),
        fields(operation = "graph.create_sequential_relationship", items = items.len())
    )]
    pub fn create_sequential_relationship(
        &self,
        edge_collection: &str,
        items: &[String],
        relationship_type: Option<&str>,
        attributes: Option<&Document>,
    ) -> Result<Vec<WriteResult>> {
        timed("graph.create_sequential_relationship", || {
            if items.len() < 2 {
                return Err(Error::Validation(format!(
                    "a sequence needs at least 2 items, got {}",
                    items.len()
                )));
            }
            let collection = Identifier::parse(edge_collection)?;
            let ids = items
                .iter()
                .map(|id| DocumentId::parse(id))
                .collect::<Result<Vec<_>>>()?;
            let template = edge_template(attributes)?;
            let relationship_type = relationship_type.unwrap_or(DEFAULT_RELATIONSHIP_TYPE);

            let mut results = Vec::with_capacity(ids.len() - 1);
            for (index, pair) in ids.windows(2).enumerate() {
                let mut edge = self.edge_document(template.as_ref(), &pair[0], &pair[1]);
                edge.insert(
                    "relationship_type".to_string(),
                    Value::String(relationship_type.to_string()),
                );
                edge.insert("sequence_index".to_string(), Value::from(index));
                results.push(self.store.insert(&collection, &edge)?);
            }
            Ok(results)
        })
    }

    /// Lists edges, optionally restricted to one source and/or target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed ids and
    /// [`Error::NotFound`] if the edge collection is missing.
    #[instrument(skip(self), fields(operation = "graph.query_edges"))]
    pub fn query_edges(
        &self,
        edge_collection: &str,
        from_id: Option<&str>,
        to_id: Option<&str>,
    ) -> Result<Vec<Value>> {
        timed("graph.query_edges", || {
            let collection = Identifier::parse(edge_collection)?;
            let from = from_id.map(DocumentId::parse).transpose()?;
            let to = to_id.map(DocumentId::parse).transpose()?;

            let query = QueryBuilder::edges(&collection, from.as_ref(), to.as_ref());
            debug!(query = %query.text, "built edge query");
            self.store.execute(&query)
        })
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Every path from `start_vertex` whose length lies in `depth`, ignoring
    /// validity windows. No edge repeats within one path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed start id or collection
    /// name, [`Error::NotFound`] if the edge collection is missing.
    #[instrument(skip(self), fields(operation = "graph.traverse_graph"))]
    pub fn traverse_graph(
        &self,
        start_vertex: &str,
        edge_collection: &str,
        depth: DepthRange,
        direction: Direction,
    ) -> Result<Vec<TraversalStep>> {
        timed("graph.traverse_graph", || {
            let start = DocumentId::parse(start_vertex)?;
            let collection = Identifier::parse(edge_collection)?;

            let query = QueryBuilder::traverse(&start, &collection, depth, direction);
            debug!(query = %query.text, "built traversal query");
            self.run_traversal(&query)
        })
    }

    /// Like [`traverse_graph`](Self::traverse_graph), but only returns paths
    /// whose every vertex (start included) and edge is valid at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed start id, collection
    /// name or timestamp.
    #[instrument(skip(self), fields(operation = "graph.temporal_traverse"))]
    pub fn temporal_traverse(
        &self,
        start_vertex: &str,
        edge_collection: &str,
        timestamp: &str,
        depth: DepthRange,
        direction: Direction,
    ) -> Result<Vec<TraversalStep>> {
        timed("graph.temporal_traverse", || {
            let start = DocumentId::parse(start_vertex)?;
            let collection = Identifier::parse(edge_collection)?;
            let timestamp = normalize_timestamp("timestamp", timestamp)?;

            let query = QueryBuilder::temporal_traverse(&start, &collection, &timestamp, depth, direction);
            debug!(query = %query.text, "built temporal traversal query");
            self.run_traversal(&query)
        })
    }

    fn run_traversal(&self, query: &crate::query::AqlQuery) -> Result<Vec<TraversalStep>> {
        self.store
            .execute(query)?
            .into_iter()
            .map(TraversalStep::from_row)
            .collect()
    }
}

/// Copies caller attributes with their validity bounds in canonical form.
fn edge_template(attributes: Option<&Document>) -> Result<Option<Document>> {
    attributes
        .map(|attributes| {
            let mut template = attributes.clone();
            normalize_supplied_validity(&mut template)?;
            Ok(template)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionType, ManualClock};
    use crate::storage::InMemoryStore;
    use serde_json::json;

    struct Fixture {
        store: Arc<InMemoryStore>,
        graph: GraphService<InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at("2024-02-01T00:00:00Z").unwrap());
        for (name, kind) in [("v", CollectionType::Document), ("e", CollectionType::Edge)] {
            store
                .create_collection(&Identifier::parse(name).unwrap(), kind, false)
                .unwrap();
        }
        Fixture {
            graph: GraphService::new(store.clone(), clock),
            store,
        }
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_create_edge_stamps_and_links() {
        let fx = fixture();
        let attrs = json!({ "weight": 2 }).as_object().cloned().unwrap();
        let written = fx.graph.create_edge("e", "v/a", "v/b", Some(&attrs)).unwrap();

        let stored = fx
            .store
            .get(&Identifier::parse("e").unwrap(), &written.key)
            .unwrap();
        assert_eq!(stored["_from"], "v/a");
        assert_eq!(stored["_to"], "v/b");
        assert_eq!(stored["weight"], 2);
        assert_eq!(stored["created_at"], "2024-02-01T00:00:00.000000Z");
        assert!(stored["valid_until"].is_null());
        // The caller's template is untouched.
        assert!(!attrs.contains_key("_from"));
    }

    #[test]
    fn test_create_edge_validates_ids() {
        let fx = fixture();
        assert!(matches!(
            fx.graph.create_edge("e", "nokey", "v/b", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            fx.graph.create_edge("missing", "v/a", "v/b", None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_sequence_builds_chain() {
        let fx = fixture();
        let results = fx
            .graph
            .create_sequential_relationship("e", &ids(&["v/a", "v/b", "v/c"]), Some("THEN"), None)
            .unwrap();
        assert_eq!(results.len(), 2);

        let edges = fx.graph.query_edges("e", None, None).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0]["_from"], "v/a");
        assert_eq!(edges[0]["_to"], "v/b");
        assert_eq!(edges[0]["sequence_index"], 0);
        assert_eq!(edges[1]["_from"], "v/b");
        assert_eq!(edges[1]["_to"], "v/c");
        assert_eq!(edges[1]["sequence_index"], 1);
        assert!(edges.iter().all(|e| e["relationship_type"] == "THEN"));
    }

    #[test]
    fn test_sequence_too_short() {
        let fx = fixture();
        for items in [ids(&[]), ids(&["v/a"])] {
            let result = fx.graph.create_sequential_relationship("e", &items, None, None);
            assert!(matches!(result, Err(Error::Validation(_))));
        }
        assert_eq!(fx.store.document_count("e"), 0);
    }

    #[test]
    fn test_sequence_validates_all_ids_first() {
        let fx = fixture();
        let result =
            fx.graph
                .create_sequential_relationship("e", &ids(&["v/a", "v/b", "broken"]), None, None);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(fx.store.document_count("e"), 0);
    }

    #[test]
    fn test_query_edges_filters() {
        let fx = fixture();
        fx.graph.create_edge("e", "v/a", "v/b", None).unwrap();
        fx.graph.create_edge("e", "v/a", "v/c", None).unwrap();
        fx.graph.create_edge("e", "v/b", "v/c", None).unwrap();

        assert_eq!(fx.graph.query_edges("e", Some("v/a"), None).unwrap().len(), 2);
        assert_eq!(fx.graph.query_edges("e", None, Some("v/c")).unwrap().len(), 2);
        assert_eq!(fx.graph.query_edges("e", Some("v/a"), Some("v/c")).unwrap().len(), 1);
    }

    #[test]
    fn test_temporal_traverse_rejects_bad_timestamp() {
        let fx = fixture();
        let result = fx.graph.temporal_traverse(
            "v/a",
            "e",
            "not-a-time",
            DepthRange::default(),
            Direction::Outbound,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_edge_bounds_and_traverse_instant_are_canonical() {
        let fx = fixture();
        let vertices = Identifier::parse("v").unwrap();
        for key in ["a", "b"] {
            let mut vertex = Document::new();
            vertex.insert("_key".into(), json!(key));
            vertex.insert("valid_from".into(), json!("2024-01-01T00:00:00.000000Z"));
            fx.store.insert(&vertices, &vertex).unwrap();
        }
        let attrs = json!({ "valid_until": "2024-03-01T02:00:00+02:00" })
            .as_object()
            .cloned()
            .unwrap();
        let written = fx.graph.create_edge("e", "v/a", "v/b", Some(&attrs)).unwrap();
        let stored = fx.store.get(&Identifier::parse("e").unwrap(), &written.key).unwrap();
        assert_eq!(stored["valid_until"], "2024-03-01T00:00:00.000000Z");

        let walk = |at: &str| {
            fx.graph
                .temporal_traverse("v/a", "e", at, DepthRange::default(), Direction::Outbound)
                .unwrap()
                .len()
        };
        assert_eq!(walk("2024-03-01"), 1);
        assert_eq!(walk("2024-03-01T01:00:00+01:00"), 1);
        assert_eq!(walk("2024-02-01T00:00:00Z"), 1);
        assert_eq!(walk("2024-03-01T00:00:01Z"), 0);
    }
}
