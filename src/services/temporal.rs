//! Temporal query service.
//!
//! Point-in-time validity, creation-time ranges, bucketed time series and
//! validity-window maintenance.

use crate::models::temporal::{CREATED_AT, UPDATED_AT, VALID_FROM, VALID_UNTIL, normalize_timestamp};
use crate::models::{
    Clock, Document, TimeBucket, TimeSeries, ValidUntil, ValidityWindow, WriteResult,
    stamp_update_after, validate_document_key,
};
use crate::observability::timed;
use crate::query::{FieldPath, Identifier, QueryBuilder, TimeInterval};
use crate::storage::DocumentStore;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Temporal queries over a document store.
pub struct TemporalService<S: DocumentStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> TemporalService<S> {
    /// Creates a temporal service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Documents whose validity window contains `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad collection name or timestamp.
    #[instrument(skip(self), fields(operation = "temporal.query_valid_at"))]
    pub fn query_valid_at(&self, collection: &str, timestamp: &str) -> Result<Vec<Value>> {
        timed("temporal.query_valid_at", || {
            let collection = Identifier::parse(collection)?;
            let timestamp = normalize_timestamp("timestamp", timestamp)?;
            self.store.execute(&QueryBuilder::valid_at(&collection, &timestamp))
        })
    }

    /// Documents whose `time_field` (default `created_at`) lies within
    /// `[start, end]`. An inverted range returns nothing.
    ///
    /// Bounds are canonicalized; a custom `time_field` must hold canonical
    /// timestamps for the comparison to be chronological.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad name, field path or bound.
    #[instrument(skip(self), fields(operation = "temporal.query_by_time_range"))]
    pub fn query_by_time_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
        time_field: Option<&str>,
    ) -> Result<Vec<Value>> {
        timed("temporal.query_by_time_range", || {
            let collection = Identifier::parse(collection)?;
            let field = FieldPath::parse(time_field.unwrap_or(CREATED_AT))?;
            let start = normalize_timestamp("start_time", start)?;
            let end = normalize_timestamp("end_time", end)?;
            self.store
                .execute(&QueryBuilder::time_range(&collection, &field, &start, &end))
        })
    }

    /// Counts documents per `interval` bucket of `time_field` (default
    /// `created_at`), optionally split by `grouping`.
    ///
    /// An unrecognized interval falls back to `day`; the result records it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad name or field path.
    #[instrument(skip(self), fields(operation = "temporal.time_series_analysis"))]
    pub fn time_series_analysis(
        &self,
        collection: &str,
        time_field: Option<&str>,
        interval: &str,
        grouping: Option<&str>,
    ) -> Result<TimeSeries> {
        timed("temporal.time_series_analysis", || {
            let collection = Identifier::parse(collection)?;
            let field = FieldPath::parse(time_field.unwrap_or(CREATED_AT))?;
            let grouping = grouping.map(FieldPath::parse).transpose()?;
            let resolution = TimeInterval::resolve(interval);

            let query =
                QueryBuilder::time_series(&collection, &field, resolution.interval, grouping.as_ref());
            debug!(query = %query.text, "built time series query");

            let buckets = self
                .store
                .execute(&query)?
                .into_iter()
                .map(|row| decode_bucket(row, grouping.is_some()))
                .collect::<Result<Vec<_>>>()?;

            Ok(TimeSeries {
                interval: resolution.interval,
                fell_back: resolution.fell_back,
                buckets,
            })
        })
    }

    /// Sets either or both validity bounds and moves `updated_at` strictly
    /// past its stored value.
    ///
    /// Bounds are stored in canonical form. `valid_until` may reopen the
    /// window with [`ValidUntil::Open`]. An inverted result window is stored
    /// as-is and logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed bound and
    /// [`Error::NotFound`] if the document is missing.
    #[instrument(skip(self), fields(operation = "temporal.set_validity_period"))]
    pub fn set_validity_period(
        &self,
        collection: &str,
        key: &str,
        valid_from: Option<&str>,
        valid_until: Option<ValidUntil>,
    ) -> Result<WriteResult> {
        timed("temporal.set_validity_period", || {
            let collection = Identifier::parse(collection)?;
            validate_document_key(key)?;
            let valid_from = valid_from
                .map(|from| normalize_timestamp(VALID_FROM, from))
                .transpose()?;
            let valid_until = match valid_until {
                Some(ValidUntil::Set(until)) => {
                    Some(ValidUntil::Set(normalize_timestamp(VALID_UNTIL, &until)?))
                },
                other => other,
            };

            let mut patch = Document::new();
            if let Some(from) = valid_from {
                patch.insert(VALID_FROM.to_string(), Value::String(from));
            }
            if let Some(until) = &valid_until {
                patch.insert(VALID_UNTIL.to_string(), until.to_value());
            }

            let current = self.store.get(&collection, key)?;
            let previous = current.get(UPDATED_AT).cloned();
            let mut merged = Value::Object(current);
            if let Value::Object(fields) = &mut merged {
                fields.extend(patch.clone());
            }
            if ValidityWindow::of(&merged).is_inverted() {
                warn!(
                    collection = collection.as_str(),
                    key,
                    valid_from = %merged[VALID_FROM],
                    valid_until = %merged[VALID_UNTIL],
                    "validity window ends before it starts"
                );
            }

            stamp_update_after(&mut patch, previous.as_ref(), self.clock.as_ref());
            self.store.update(&collection, key, &patch)
        })
    }
}

/// Decodes one aggregation row. Grouped rows always carry a group key, even
/// when the store returned `null` for it.
fn decode_bucket(row: Value, grouped: bool) -> Result<TimeBucket> {
    let mut bucket: TimeBucket = serde_json::from_value(row).map_err(|e| Error::Store {
        operation: "decode_time_bucket".to_string(),
        cause: e.to_string(),
    })?;
    if grouped && bucket.group_key.is_none() {
        bucket.group_key = Some(Value::Null);
    }
    Ok(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionType, ManualClock, StampMode, stamp};
    use crate::storage::InMemoryStore;
    use chrono::Duration;
    use serde_json::json;

    struct Fixture {
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        temporal: TemporalService<InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at("2024-01-01T00:00:00Z").unwrap());
        store
            .create_collection(&Identifier::parse("facts").unwrap(), CollectionType::Document, false)
            .unwrap();
        Fixture {
            temporal: TemporalService::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    fn put(fx: &Fixture, value: Value) -> WriteResult {
        let mut document = value.as_object().cloned().unwrap();
        stamp(&mut document, StampMode::Create, fx.clock.as_ref());
        fx.store
            .insert(&Identifier::parse("facts").unwrap(), &document)
            .unwrap()
    }

    #[test]
    fn test_valid_at_inclusive_bounds() {
        let fx = fixture();
        put(&fx, json!({ "_key": "a", "valid_from": "2024-01-01T00:00:00.000000Z", "valid_until": "2024-06-30T00:00:00.000000Z" }));
        put(&fx, json!({ "_key": "b", "valid_from": "2024-07-01T00:00:00.000000Z", "valid_until": null }));

        let keys = |ts: &str| -> Vec<String> {
            fx.temporal
                .query_valid_at("facts", ts)
                .unwrap()
                .iter()
                .map(|d| d["_key"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(keys("2024-06-30T00:00:00.000000Z"), vec!["a"]);
        assert_eq!(keys("2024-07-01T00:00:00.000000Z"), vec!["b"]);
        assert_eq!(keys("2030-01-01T00:00:00.000000Z"), vec!["b"]);
        assert!(keys("2023-12-31T23:59:59.000000Z").is_empty());
    }

    #[test]
    fn test_valid_at_rejects_bad_timestamp() {
        let fx = fixture();
        assert!(matches!(
            fx.temporal.query_valid_at("facts", "yesterday"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_time_range_default_and_custom_field() {
        let fx = fixture();
        put(&fx, json!({ "_key": "early" }));
        fx.clock.advance(Duration::days(10));
        put(&fx, json!({ "_key": "late", "seen": "2024-03-05T00:00:00Z" }));

        let hits = fx
            .temporal
            .query_by_time_range("facts", "2024-01-05T00:00:00Z", "2024-01-31T00:00:00Z", None)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["_key"], "late");

        let hits = fx
            .temporal
            .query_by_time_range("facts", "2024-03-01T00:00:00Z", "2024-03-31T00:00:00Z", Some("seen"))
            .unwrap();
        assert_eq!(hits.len(), 1);

        let inverted = fx
            .temporal
            .query_by_time_range("facts", "2024-12-31T00:00:00Z", "2024-01-01T00:00:00Z", None)
            .unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_time_series_counts_and_fallback() {
        let fx = fixture();
        put(&fx, json!({ "kind": "x" }));
        put(&fx, json!({ "kind": "y" }));
        fx.clock.advance(Duration::days(1));
        put(&fx, json!({ "kind": "x" }));

        let series = fx
            .temporal
            .time_series_analysis("facts", None, "fortnight", None)
            .unwrap();
        assert!(series.fell_back);
        assert_eq!(series.interval, TimeInterval::Day);
        assert_eq!(series.buckets.len(), 2);
        assert_eq!(series.buckets[0].count, 2);
        assert_eq!(series.total(), 3);

        let grouped = fx
            .temporal
            .time_series_analysis("facts", None, "month", Some("kind"))
            .unwrap();
        assert!(!grouped.fell_back);
        assert_eq!(grouped.buckets.len(), 2);
        assert_eq!(grouped.buckets[0].group_key, Some(json!("x")));
        assert_eq!(grouped.buckets[0].count, 2);
    }

    #[test]
    fn test_set_validity_period_closes_and_reopens() {
        let fx = fixture();
        let written = put(&fx, json!({ "_key": "k" }));
        fx.clock.advance(Duration::hours(1));

        fx.temporal
            .set_validity_period(
                "facts",
                &written.key,
                None,
                Some(ValidUntil::Set("2024-02-01T00:00:00Z".to_string())),
            )
            .unwrap();
        let stored = fx.store.get(&Identifier::parse("facts").unwrap(), "k").unwrap();
        assert_eq!(stored["valid_until"], "2024-02-01T00:00:00.000000Z");
        assert_eq!(stored["updated_at"], "2024-01-01T01:00:00.000000Z");
        assert_eq!(stored["created_at"], "2024-01-01T00:00:00.000000Z");

        fx.temporal
            .set_validity_period("facts", "k", None, Some(ValidUntil::Open))
            .unwrap();
        let stored = fx.store.get(&Identifier::parse("facts").unwrap(), "k").unwrap();
        assert!(stored.contains_key("valid_until"));
        assert!(stored["valid_until"].is_null());
    }

    #[test]
    fn test_set_validity_period_touch_only() {
        let fx = fixture();
        put(&fx, json!({ "_key": "k" }));
        fx.clock.advance(Duration::minutes(1));
        fx.temporal.set_validity_period("facts", "k", None, None).unwrap();

        let stored = fx.store.get(&Identifier::parse("facts").unwrap(), "k").unwrap();
        assert_eq!(stored["updated_at"], "2024-01-01T00:01:00.000000Z");
        assert_eq!(stored["valid_from"], "2024-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_set_validity_period_errors() {
        let fx = fixture();
        assert!(matches!(
            fx.temporal.set_validity_period("facts", "missing", Some("2024-01-01"), None),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            fx.temporal.set_validity_period("facts", "k", Some("soon"), None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_inverted_window_is_stored() {
        let fx = fixture();
        put(&fx, json!({ "_key": "k" }));
        fx.temporal
            .set_validity_period(
                "facts",
                "k",
                None,
                Some(ValidUntil::Set("2023-01-01T00:00:00Z".to_string())),
            )
            .unwrap();
        let stored = fx.store.get(&Identifier::parse("facts").unwrap(), "k").unwrap();
        assert_eq!(stored["valid_until"], "2023-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_query_forms_match_the_same_instant() {
        let fx = fixture();
        put(&fx, json!({ "_key": "k" }));
        fx.temporal
            .set_validity_period(
                "facts",
                "k",
                Some("2024-01-15T12:30:00+02:00"),
                Some(ValidUntil::Set("2024-01-20".to_string())),
            )
            .unwrap();
        let stored = fx.store.get(&Identifier::parse("facts").unwrap(), "k").unwrap();
        assert_eq!(stored["valid_from"], "2024-01-15T10:30:00.000000Z");
        assert_eq!(stored["valid_until"], "2024-01-20T00:00:00.000000Z");

        for at in [
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.000000Z",
            "2024-01-15T11:30:00+01:00",
            "2024-01-20",
            "2024-01-19T23:00:00-01:00",
        ] {
            assert_eq!(fx.temporal.query_valid_at("facts", at).unwrap().len(), 1, "{at}");
        }
        for at in ["2024-01-15T10:29:59Z", "2024-01-20T00:00:00.000001Z", "2024-01-14"] {
            assert!(fx.temporal.query_valid_at("facts", at).unwrap().is_empty(), "{at}");
        }
    }

    #[test]
    fn test_time_range_bounds_in_any_form() {
        let fx = fixture();
        put(&fx, json!({ "_key": "k" }));
        // Stamped at 2024-01-01T00:00:00.000000Z.
        for (start, end) in [
            ("2024-01-01", "2024-01-01"),
            ("2024-01-01T01:00:00+01:00", "2024-01-01T00:00:00Z"),
            ("2023-12-31T23:00:00-01:00", "2024-01-02"),
        ] {
            let hits = fx.temporal.query_by_time_range("facts", start, end, None).unwrap();
            assert_eq!(hits.len(), 1, "{start}..{end}");
        }
    }
}
