//! Temporal metadata for documents and edges.
//!
//! Every document written through tempograph carries four timestamps:
//!
//! | Field | Set | Meaning |
//! |-------|-----|---------|
//! | `created_at` | once, at insert | When the record was written |
//! | `updated_at` | every insert and update | When the record last changed |
//! | `valid_from` | at insert unless supplied | Start of semantic validity |
//! | `valid_until` | `null` at insert unless supplied | End of validity, `null` = still valid |
//!
//! # Validity Semantics
//!
//! A document is *valid at T* iff `valid_from <= T` and either
//! `valid_until` is `null` or `valid_until >= T`. Both ends are inclusive.
//! Comparisons follow AQL ordering (see [`crate::models::ordering`]). Every
//! timestamp is stored and bound in one fixed-width UTC form (see
//! [`format_timestamp`] and [`normalize_timestamp`]), which makes that
//! ordering chronological.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tempograph::models::temporal::{ManualClock, StampMode, is_valid_at, stamp};
//!
//! let clock = ManualClock::at("2024-01-15T10:00:00Z")?;
//! let mut doc = json!({ "name": "Ada" }).as_object().cloned().unwrap_or_default();
//! stamp(&mut doc, StampMode::Create, &clock);
//!
//! assert_eq!(doc["created_at"], doc["updated_at"]);
//! assert!(doc["valid_until"].is_null());
//!
//! let doc = serde_json::Value::Object(doc);
//! assert!(is_valid_at(&doc, "2024-01-15T10:00:00.000000Z"));
//! assert!(!is_valid_at(&doc, "2024-01-14T00:00:00.000000Z"));
//! # Ok::<(), tempograph::Error>(())
//! ```

use crate::models::Document;
use crate::models::ordering::{value_ge, value_le};
use crate::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::RwLock;

/// Attribute set once at insert.
pub const CREATED_AT: &str = "created_at";
/// Attribute refreshed on every mutation.
pub const UPDATED_AT: &str = "updated_at";
/// Start of the validity window.
pub const VALID_FROM: &str = "valid_from";
/// End of the validity window, `null` when open.
pub const VALID_UNTIL: &str = "valid_until";

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Used to make stamping deterministic in tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Creates a clock frozen at an ISO-8601 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the timestamp does not parse.
    pub fn at(timestamp: &str) -> Result<Self> {
        let now = parse_timestamp(timestamp)
            .ok_or_else(|| Error::Validation(format!("invalid timestamp: {timestamp:?}")))?;
        Ok(Self::new(now))
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Renders an instant in the canonical stored form,
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
///
/// The form is fixed-width, so byte-wise comparison is chronological.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (any offset), a naive date-time (read as UTC, with `T`
/// or a space as separator) or a bare date (midnight UTC).
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses `value` and renders it in the canonical stored form.
///
/// Every timestamp a caller hands in goes through here before it is stored
/// or bound, so string comparison in the store matches instant comparison.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field` if it does not parse.
pub fn normalize_timestamp(field: &str, value: &str) -> Result<String> {
    parse_timestamp(value).map(format_timestamp).ok_or_else(|| {
        Error::Validation(format!("{field} is not an ISO-8601 timestamp: {value:?}"))
    })
}

/// Which write path a document is being stamped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampMode {
    /// First insert: sets creation, update and default validity fields.
    Create,
    /// Any later mutation: refreshes `updated_at` only.
    Update,
}

impl StampMode {
    /// Maps the `is_update` flag used by the tool surface.
    #[must_use]
    pub const fn from_is_update(is_update: bool) -> Self {
        if is_update { Self::Update } else { Self::Create }
    }
}

/// Stamps `document` with temporal metadata in place and returns it.
///
/// On [`StampMode::Create`], `created_at` and `updated_at` get the same
/// instant, `valid_from` defaults to that instant and `valid_until` defaults
/// to an explicit `null`. Caller-supplied `valid_from`/`valid_until` are kept;
/// a caller-supplied `created_at` is overwritten.
///
/// On [`StampMode::Update`], only `updated_at` changes. Validity bounds move
/// exclusively through
/// [`TemporalService::set_validity_period`](crate::services::TemporalService::set_validity_period).
/// Use [`stamp_update_after`] when the stored `updated_at` is known.
pub fn stamp<'a>(document: &'a mut Document, mode: StampMode, clock: &dyn Clock) -> &'a mut Document {
    let now = Value::String(format_timestamp(clock.now()));

    match mode {
        StampMode::Create => {
            document.insert(CREATED_AT.to_string(), now.clone());
            document.insert(UPDATED_AT.to_string(), now.clone());
            document.entry(VALID_FROM.to_string()).or_insert(now);
            document.entry(VALID_UNTIL.to_string()).or_insert(Value::Null);
        },
        StampMode::Update => {
            document.insert(UPDATED_AT.to_string(), now);
        },
    }

    document
}

/// Sets `updated_at` on an update patch, strictly after `previous`.
///
/// If the clock has not moved past the stored `updated_at` (same
/// microsecond, or stepped backwards), the new value is `previous + 1µs`.
pub fn stamp_update_after<'a>(
    patch: &'a mut Document,
    previous: Option<&Value>,
    clock: &dyn Clock,
) -> &'a mut Document {
    let floor = previous
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .map(|previous| previous + Duration::microseconds(1));
    let now = clock.now();
    let at = floor.map_or(now, |floor| now.max(floor));
    patch.insert(UPDATED_AT.to_string(), Value::String(format_timestamp(at)));
    patch
}

/// The validity bounds of a document, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct ValidityWindow<'a> {
    /// `valid_from`, `null` if missing.
    pub valid_from: &'a Value,
    /// `valid_until`, `null` if missing or open.
    pub valid_until: &'a Value,
}

impl<'a> ValidityWindow<'a> {
    /// Reads the window from a document. Non-objects yield an all-null window.
    #[must_use]
    pub fn of(document: &'a Value) -> Self {
        Self {
            valid_from: document.get(VALID_FROM).unwrap_or(&Value::Null),
            valid_until: document.get(VALID_UNTIL).unwrap_or(&Value::Null),
        }
    }

    /// Whether the window contains `timestamp` (both ends inclusive).
    ///
    /// `timestamp` is canonicalized first; the stored bounds are compared as
    /// stored, the way the database compares them.
    #[must_use]
    pub fn contains(&self, timestamp: &str) -> bool {
        let at = Value::String(
            parse_timestamp(timestamp).map_or_else(|| timestamp.to_string(), format_timestamp),
        );
        value_le(self.valid_from, &at) && (self.valid_until.is_null() || value_ge(self.valid_until, &at))
    }

    /// Whether `valid_until` is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.valid_until.is_null()
    }

    /// Whether a closed window ends before it starts.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        !self.valid_until.is_null() && !value_le(self.valid_from, self.valid_until)
    }
}

/// The point-in-time validity predicate.
#[must_use]
pub fn is_valid_at(document: &Value, timestamp: &str) -> bool {
    ValidityWindow::of(document).contains(timestamp)
}

/// New value for `valid_until` in a validity update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidUntil {
    /// Close the window at this timestamp.
    Set(String),
    /// Reopen the window (`null`).
    Open,
}

impl ValidUntil {
    /// The stored representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Set(ts) => Value::String(ts.clone()),
            Self::Open => Value::Null,
        }
    }
}
