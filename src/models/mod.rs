//! Data models for tempograph.
//!
//! Documents are plain JSON objects owned by the store. The types here add
//! the temporal conventions, identifiers and result shapes layered on top.

mod document;
pub mod graph;
pub mod index;
pub mod ordering;
pub mod temporal;

pub use document::{
    CollectionInfo, CollectionType, Document, DocumentId, WriteResult, field_value,
    validate_document_key,
};
pub use graph::{TimeBucket, TimeSeries, TraversalStep};
pub use index::{IndexSpec, IndexType, TemporalIndexes};
pub use temporal::{
    Clock, ManualClock, StampMode, SystemClock, ValidUntil, ValidityWindow, is_valid_at,
    normalize_timestamp, stamp, stamp_update_after,
};
