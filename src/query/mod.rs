//! Query construction.
//!
//! Temporal and graph operations are expressed as AQL. This module owns the
//! allow-lists for names that end up in query text and the builders that
//! produce [`AqlQuery`] values.

mod builder;
mod identifier;
mod options;

pub use builder::{AqlQuery, QueryBuilder, QueryPlan, TraversalPlan};
pub use identifier::{FieldPath, Identifier};
pub use options::{DepthRange, Direction, IntervalResolution, TimeInterval};
