//! Graph result types.
//!
//! Traversal and aggregation results are computed per call and never
//! persisted. Vertex and edge documents are returned as the store sent them.

use crate::query::TimeInterval;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a traversal: the reached vertex, the edge used to reach it and
/// the vertices from the start vertex to this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalStep {
    /// The reached vertex (`null` if the edge dangles).
    pub vertex: Value,
    /// The last edge on the path, `null` at depth 0.
    pub edge: Value,
    /// Vertex documents from start to `vertex`, inclusive.
    pub path: Vec<Value>,
}

impl TraversalStep {
    /// Number of hops from the start vertex.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Decodes a row returned by a traversal query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the row does not have the
    /// `{vertex, edge, path}` shape.
    pub fn from_row(row: Value) -> Result<Self> {
        serde_json::from_value(row).map_err(|e| Error::Store {
            operation: "decode_traversal_row".to_string(),
            cause: e.to_string(),
        })
    }
}

/// Count of documents falling into one time bucket (and group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Truncated timestamp, `null` if the source field was missing or not a date.
    pub time_unit: Value,
    /// Value of the grouping field, present only for grouped analyses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<Value>,
    /// Number of documents in the bucket.
    pub count: u64,
}

/// Result of a time-series analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Interval actually used for truncation.
    pub interval: TimeInterval,
    /// Whether the requested interval was unrecognized and `day` was used.
    pub fell_back: bool,
    /// Buckets, ascending by `time_unit` then `group_key`.
    pub buckets: Vec<TimeBucket>,
}

impl TimeSeries {
    /// Total number of documents across all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}
