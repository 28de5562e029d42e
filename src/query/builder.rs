//! AQL assembly.
//!
//! Each builder returns an [`AqlQuery`] holding the query text, its bind
//! parameters and a [`QueryPlan`] describing the same query structurally.
//! Stores that speak AQL send `text` and `bind_vars`; stores that do not
//! evaluate `plan`.

use crate::models::DocumentId;
use crate::query::{DepthRange, Direction, FieldPath, Identifier, TimeInterval};
use serde_json::{Map, Value};

/// A parameterized AQL query.
#[derive(Debug, Clone, PartialEq)]
pub struct AqlQuery {
    /// Query text. Only validated identifiers are interpolated.
    pub text: String,
    /// Bind parameters referenced as `@name` in `text`.
    pub bind_vars: Map<String, Value>,
    /// Structured form of the query.
    pub plan: QueryPlan,
}

/// Structured description of a built query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Caller-written AQL; only a real AQL engine can run it.
    Raw,
    /// Edges filtered by endpoint.
    Edges {
        /// Edge collection.
        collection: Identifier,
        /// Required `_from`, if any.
        from: Option<String>,
        /// Required `_to`, if any.
        to: Option<String>,
    },
    /// Graph walk, optionally restricted to one instant.
    Traverse(TraversalPlan),
    /// Documents whose validity window contains an instant.
    ValidAt {
        /// Collection to scan.
        collection: Identifier,
        /// Instant to test.
        timestamp: String,
    },
    /// Documents whose `field` lies in `[start, end]`.
    TimeRange {
        /// Collection to scan.
        collection: Identifier,
        /// Timestamp attribute.
        field: FieldPath,
        /// Inclusive lower bound.
        start: String,
        /// Inclusive upper bound.
        end: String,
    },
    /// Counts per truncated timestamp (and group).
    TimeSeries {
        /// Collection to scan.
        collection: Identifier,
        /// Timestamp attribute.
        field: FieldPath,
        /// Bucket width.
        interval: TimeInterval,
        /// Optional grouping attribute.
        grouping: Option<FieldPath>,
    },
}

/// Parameters of a traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalPlan {
    /// Start vertex.
    pub start: DocumentId,
    /// Edge collection to walk.
    pub edge_collection: Identifier,
    /// Path length bounds.
    pub depth: DepthRange,
    /// Edge direction.
    pub direction: Direction,
    /// When set, every vertex and edge on a path must be valid at this instant.
    pub valid_at: Option<String>,
}

/// Builds the queries behind the graph and temporal operations.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Edges of `collection`, optionally restricted by `_from` and `_to`.
    /// Both filters are AND-combined.
    #[must_use]
    pub fn edges(collection: &Identifier, from: Option<&DocumentId>, to: Option<&DocumentId>) -> AqlQuery {
        let mut text = format!("FOR edge IN {}", collection.quoted());
        let mut bind_vars = Map::new();
        let mut filters = Vec::new();

        if let Some(from) = from {
            filters.push("edge._from == @from_id");
            bind_vars.insert("from_id".to_string(), Value::String(from.to_string()));
        }
        if let Some(to) = to {
            filters.push("edge._to == @to_id");
            bind_vars.insert("to_id".to_string(), Value::String(to.to_string()));
        }
        if !filters.is_empty() {
            text.push_str("\n  FILTER ");
            text.push_str(&filters.join(" AND "));
        }
        text.push_str("\n  RETURN edge");

        AqlQuery {
            text,
            bind_vars,
            plan: QueryPlan::Edges {
                collection: collection.clone(),
                from: from.map(ToString::to_string),
                to: to.map(ToString::to_string),
            },
        }
    }

    /// Every path from `start` within `depth`, regardless of time.
    #[must_use]
    pub fn traverse(
        start: &DocumentId,
        edge_collection: &Identifier,
        depth: DepthRange,
        direction: Direction,
    ) -> AqlQuery {
        let text = format!(
            "FOR v, e, p IN {depth} {} @start_vertex {}\n  {RETURN_STEP}",
            direction.keyword(),
            edge_collection.quoted(),
        );
        let mut bind_vars = Map::new();
        bind_vars.insert("start_vertex".to_string(), Value::String(start.to_string()));

        AqlQuery {
            text,
            bind_vars,
            plan: QueryPlan::Traverse(TraversalPlan {
                start: start.clone(),
                edge_collection: edge_collection.clone(),
                depth,
                direction,
                valid_at: None,
            }),
        }
    }

    /// Paths from `start` whose every vertex and edge is valid at
    /// `timestamp`. Invalid vertices and edges prune their branch; the path
    /// filters also reject a start vertex that is itself invalid.
    #[must_use]
    pub fn temporal_traverse(
        start: &DocumentId,
        edge_collection: &Identifier,
        timestamp: &str,
        depth: DepthRange,
        direction: Direction,
    ) -> AqlQuery {
        let text = format!(
            "FOR v, e, p IN {depth} {} @start_vertex {}\n  \
             PRUNE {} OR {}\n  \
             FILTER LENGTH(p.edges[* FILTER {}]) == 0\n  \
             FILTER LENGTH(p.vertices[* FILTER {}]) == 0\n  \
             {RETURN_STEP}",
            direction.keyword(),
            edge_collection.quoted(),
            invalid_at("e"),
            invalid_at("v"),
            invalid_at("CURRENT"),
            invalid_at("CURRENT"),
        );
        let mut bind_vars = Map::new();
        bind_vars.insert("start_vertex".to_string(), Value::String(start.to_string()));
        bind_vars.insert("timestamp".to_string(), Value::String(timestamp.to_string()));

        AqlQuery {
            text,
            bind_vars,
            plan: QueryPlan::Traverse(TraversalPlan {
                start: start.clone(),
                edge_collection: edge_collection.clone(),
                depth,
                direction,
                valid_at: Some(timestamp.to_string()),
            }),
        }
    }

    /// Documents of `collection` valid at `timestamp`.
    #[must_use]
    pub fn valid_at(collection: &Identifier, timestamp: &str) -> AqlQuery {
        let text = format!(
            "FOR doc IN {}\n  \
             FILTER doc.valid_from <= @timestamp\n  \
             FILTER doc.valid_until == null OR doc.valid_until >= @timestamp\n  \
             RETURN doc",
            collection.quoted(),
        );
        let mut bind_vars = Map::new();
        bind_vars.insert("timestamp".to_string(), Value::String(timestamp.to_string()));

        AqlQuery {
            text,
            bind_vars,
            plan: QueryPlan::ValidAt {
                collection: collection.clone(),
                timestamp: timestamp.to_string(),
            },
        }
    }

    /// Documents whose `field` lies between `start` and `end`, inclusive.
    #[must_use]
    pub fn time_range(collection: &Identifier, field: &FieldPath, start: &str, end: &str) -> AqlQuery {
        let attr = field.on("doc");
        let text = format!(
            "FOR doc IN {}\n  FILTER {attr} >= @start_time AND {attr} <= @end_time\n  RETURN doc",
            collection.quoted(),
        );
        let mut bind_vars = Map::new();
        bind_vars.insert("start_time".to_string(), Value::String(start.to_string()));
        bind_vars.insert("end_time".to_string(), Value::String(end.to_string()));

        AqlQuery {
            text,
            bind_vars,
            plan: QueryPlan::TimeRange {
                collection: collection.clone(),
                field: field.clone(),
                start: start.to_string(),
                end: end.to_string(),
            },
        }
    }

    /// Document counts per `interval` bucket of `field`, optionally split by
    /// `grouping`. Rows come back ascending by bucket, then group key.
    #[must_use]
    pub fn time_series(
        collection: &Identifier,
        field: &FieldPath,
        interval: TimeInterval,
        grouping: Option<&FieldPath>,
    ) -> AqlQuery {
        let bucket = truncate_expression(&field.on("doc"), interval);
        let text = match grouping {
            Some(group) => format!(
                "FOR doc IN {}\n  \
                 COLLECT time_unit = {bucket}, group_key = {} WITH COUNT INTO count\n  \
                 SORT time_unit, group_key\n  \
                 RETURN {{ time_unit, group_key, count }}",
                collection.quoted(),
                group.on("doc"),
            ),
            None => format!(
                "FOR doc IN {}\n  \
                 COLLECT time_unit = {bucket} WITH COUNT INTO count\n  \
                 SORT time_unit\n  \
                 RETURN {{ time_unit, count }}",
                collection.quoted(),
            ),
        };

        AqlQuery {
            text,
            bind_vars: Map::new(),
            plan: QueryPlan::TimeSeries {
                collection: collection.clone(),
                field: field.clone(),
                interval,
                grouping: grouping.cloned(),
            },
        }
    }

    /// Caller-written AQL, passed through untouched.
    #[must_use]
    pub fn raw(text: impl Into<String>, bind_vars: Map<String, Value>) -> AqlQuery {
        AqlQuery {
            text: text.into(),
            bind_vars,
            plan: QueryPlan::Raw,
        }
    }
}

const RETURN_STEP: &str = "RETURN { vertex: v, edge: e, path: p.vertices }";

/// Negation of the validity predicate for `var` against `@timestamp`.
fn invalid_at(var: &str) -> String {
    format!("({var}.valid_from > @timestamp OR ({var}.valid_until != null AND {var}.valid_until < @timestamp))")
}

fn truncate_expression(attr: &str, interval: TimeInterval) -> String {
    match interval {
        TimeInterval::Week => format!(
            "DATE_SUBTRACT(DATE_TRUNC({attr}, \"day\"), (DATE_DAYOFWEEK({attr}) + 6) % 7, \"day\")"
        ),
        other => format!("DATE_TRUNC({attr}, \"{}\")", other.as_str()),
    }
}
