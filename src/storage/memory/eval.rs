//! Query plan evaluation for the in-memory store.

use super::{Collection, collection_not_found};
use crate::models::ordering::{compare_values, value_ge, value_le};
use crate::models::temporal::{is_valid_at, parse_timestamp};
use crate::models::{DocumentId, field_value};
use crate::query::{Direction, FieldPath, Identifier, QueryPlan, TimeInterval, TraversalPlan};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::BTreeMap;

type Collections = BTreeMap<String, Collection>;

/// Rendering used by AQL date functions.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(super) fn evaluate(collections: &Collections, plan: &QueryPlan) -> Result<Vec<Value>> {
    match plan {
        QueryPlan::Raw => Err(Error::store(
            "execute",
            "the in-memory store only evaluates built queries",
        )),
        QueryPlan::Edges {
            collection,
            from,
            to,
        } => {
            let coll = lookup(collections, collection)?;
            Ok(coll
                .documents
                .iter()
                .filter(|e| from.as_deref().is_none_or(|f| endpoint(e, "_from") == Some(f)))
                .filter(|e| to.as_deref().is_none_or(|t| endpoint(e, "_to") == Some(t)))
                .map(|e| Value::Object(e.clone()))
                .collect())
        },
        QueryPlan::ValidAt {
            collection,
            timestamp,
        } => {
            let coll = lookup(collections, collection)?;
            Ok(coll
                .documents
                .iter()
                .map(|d| Value::Object(d.clone()))
                .filter(|d| is_valid_at(d, timestamp))
                .collect())
        },
        QueryPlan::TimeRange {
            collection,
            field,
            start,
            end,
        } => {
            let coll = lookup(collections, collection)?;
            let start = Value::String(start.clone());
            let end = Value::String(end.clone());
            Ok(coll
                .documents
                .iter()
                .map(|d| Value::Object(d.clone()))
                .filter(|d| {
                    let at = field_value(d, field);
                    value_ge(at, &start) && value_le(at, &end)
                })
                .collect())
        },
        QueryPlan::TimeSeries {
            collection,
            field,
            interval,
            grouping,
        } => time_series(lookup(collections, collection)?, field, *interval, grouping.as_ref()),
        QueryPlan::Traverse(plan) => traverse(collections, plan),
    }
}

fn lookup<'a>(collections: &'a Collections, name: &Identifier) -> Result<&'a Collection> {
    collections
        .get(name.as_str())
        .ok_or_else(|| collection_not_found(name.as_str()))
}

fn endpoint<'a>(edge: &'a serde_json::Map<String, Value>, attribute: &str) -> Option<&'a str> {
    edge.get(attribute).and_then(Value::as_str)
}

// ============================================================================
// Time series
// ============================================================================

/// Reads a value as an instant the way AQL date functions do: ISO-8601
/// strings and millisecond epoch numbers.
fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Truncates `at` to the start of its bucket.
fn truncate(at: DateTime<Utc>, interval: TimeInterval) -> Option<DateTime<Utc>> {
    let date = at.date_naive();
    match interval {
        TimeInterval::Hour => date.and_hms_opt(at.hour(), 0, 0).map(|naive| naive.and_utc()),
        TimeInterval::Day => midnight(date),
        TimeInterval::Week => {
            let since_monday = i64::from(date.weekday().num_days_from_monday());
            midnight(date - Duration::days(since_monday))
        },
        TimeInterval::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(midnight),
        TimeInterval::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(midnight),
    }
}

/// The bucket label for one document, `null` if the field is not a date.
pub(super) fn bucket_of(value: &Value, interval: TimeInterval) -> Value {
    as_instant(value)
        .and_then(|at| truncate(at, interval))
        .map_or(Value::Null, |at| Value::String(at.format(DATE_FORMAT).to_string()))
}

struct Bucket {
    time_unit: Value,
    group_key: Value,
    count: u64,
}

fn time_series(
    coll: &Collection,
    field: &FieldPath,
    interval: TimeInterval,
    grouping: Option<&FieldPath>,
) -> Result<Vec<Value>> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for document in &coll.documents {
        let document = Value::Object(document.clone());
        let time_unit = bucket_of(field_value(&document, field), interval);
        let group_key = grouping.map_or(Value::Null, |g| field_value(&document, g).clone());

        let existing = buckets.iter_mut().find(|b| {
            compare_values(&b.time_unit, &time_unit) == Ordering::Equal
                && compare_values(&b.group_key, &group_key) == Ordering::Equal
        });
        match existing {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(Bucket {
                time_unit,
                group_key,
                count: 1,
            }),
        }
    }

    buckets.sort_by(|a, b| {
        compare_values(&a.time_unit, &b.time_unit).then_with(|| compare_values(&a.group_key, &b.group_key))
    });

    Ok(buckets
        .into_iter()
        .map(|b| {
            if grouping.is_some() {
                json!({ "time_unit": b.time_unit, "group_key": b.group_key, "count": b.count })
            } else {
                json!({ "time_unit": b.time_unit, "count": b.count })
            }
        })
        .collect())
}

// ============================================================================
// Traversal
// ============================================================================

struct Walk<'a> {
    collections: &'a Collections,
    edges: &'a Collection,
    plan: &'a TraversalPlan,
    rows: Vec<Value>,
}

impl Walk<'_> {
    fn vertex(&self, id: &str) -> Value {
        DocumentId::parse(id)
            .ok()
            .and_then(|id| {
                self.collections
                    .get(id.collection().as_str())
                    .and_then(|c| c.find(id.key()))
            })
            .map_or(Value::Null, |d| Value::Object(d.clone()))
    }

    fn admits(&self, element: &Value) -> bool {
        self.plan
            .valid_at
            .as_deref()
            .is_none_or(|at| is_valid_at(element, at))
    }

    /// Edges leaving `vertex_id` in the plan's direction, with the id of the
    /// vertex each one leads to.
    fn neighbours(&self, vertex_id: &str) -> Vec<(usize, String)> {
        let direction = self.plan.direction;
        self.edges
            .documents
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| {
                let from = endpoint(edge, "_from")?;
                let to = endpoint(edge, "_to")?;
                let outbound = matches!(direction, Direction::Outbound | Direction::Any);
                let inbound = matches!(direction, Direction::Inbound | Direction::Any);
                if outbound && from == vertex_id {
                    Some((i, to.to_string()))
                } else if inbound && to == vertex_id {
                    Some((i, from.to_string()))
                } else {
                    None
                }
            })
            .collect()
    }

    fn emit(&mut self, vertex: &Value, edge: &Value, path: &[Value]) {
        self.rows.push(json!({
            "vertex": vertex,
            "edge": edge,
            "path": path,
        }));
    }

    /// Depth-first walk from the start vertex at the top of `path`. An edge
    /// appears at most once per path.
    ///
    /// Frames live on the heap, so chain length is bounded by memory rather
    /// than the thread stack.
    fn descend(&mut self, start_id: &str, path: &mut Vec<Value>) {
        let max = self.plan.depth.max();
        let mut used: Vec<usize> = Vec::new();
        let mut stack = vec![Frame {
            pending: if max > 0 { self.neighbours(start_id) } else { Vec::new() },
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some((index, next_id)) = frame.pending.get(frame.next).cloned() else {
                stack.pop();
                if !stack.is_empty() {
                    used.pop();
                    path.pop();
                }
                continue;
            };
            frame.next += 1;
            if used.contains(&index) {
                continue;
            }
            let edge = Value::Object(self.edges.documents[index].clone());
            let vertex = self.vertex(&next_id);
            if !self.admits(&edge) || !self.admits(&vertex) {
                continue;
            }

            used.push(index);
            path.push(vertex.clone());
            let depth = u32::try_from(used.len()).unwrap_or(u32::MAX);
            if self.plan.depth.contains(depth) {
                self.emit(&vertex, &edge, path);
            }
            stack.push(Frame {
                pending: if depth < max { self.neighbours(&next_id) } else { Vec::new() },
                next: 0,
            });
        }
    }
}

/// One vertex on the walk: the hops out of it and how many were tried.
struct Frame {
    pending: Vec<(usize, String)>,
    next: usize,
}

fn traverse(collections: &Collections, plan: &TraversalPlan) -> Result<Vec<Value>> {
    let edges = lookup(collections, &plan.edge_collection)?;
    let mut walk = Walk {
        collections,
        edges,
        plan,
        rows: Vec::new(),
    };

    let start_id = plan.start.to_string();
    let start = walk.vertex(&start_id);
    if start.is_null() || !walk.admits(&start) {
        return Ok(Vec::new());
    }

    let mut path = vec![start.clone()];
    if plan.depth.contains(0) {
        walk.emit(&start, &Value::Null, &path);
    }
    walk.descend(&start_id, &mut path);
    Ok(walk.rows)
}
