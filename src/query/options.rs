//! Traversal and aggregation options.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Which way edges are followed during a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow `_from` to `_to`.
    #[default]
    Outbound,
    /// Follow `_to` to `_from`.
    Inbound,
    /// Follow edges both ways.
    Any,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
            Self::Any => "any",
        }
    }

    /// The AQL keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Outbound => "OUTBOUND",
            Self::Inbound => "INBOUND",
            Self::Any => "ANY",
        }
    }

    /// Parses a direction, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for anything other than `outbound`,
    /// `inbound` or `any`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "outbound" => Ok(Self::Outbound),
            "inbound" => Ok(Self::Inbound),
            "any" => Ok(Self::Any),
            _ => Err(Error::Validation(format!(
                "direction must be outbound, inbound or any, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Inclusive bounds on path length for a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthRange {
    min: u32,
    max: u32,
}

impl DepthRange {
    /// Creates a depth range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(Error::Validation(format!(
                "min_depth ({min}) cannot exceed max_depth ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    /// Exactly `depth` hops.
    #[must_use]
    pub const fn exactly(depth: u32) -> Self {
        Self {
            min: depth,
            max: depth,
        }
    }

    /// Minimum path length.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Maximum path length.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether a path of `depth` hops is reported.
    #[must_use]
    pub const fn contains(&self, depth: u32) -> bool {
        depth >= self.min && depth <= self.max
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl fmt::Display for DepthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Bucket width for time-series aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInterval {
    /// Truncate to the hour.
    Hour,
    /// Truncate to midnight UTC.
    #[default]
    Day,
    /// Truncate to midnight of the preceding Monday.
    Week,
    /// Truncate to the first of the month.
    Month,
    /// Truncate to January 1st.
    Year,
}

/// Outcome of resolving a caller-supplied interval name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalResolution {
    /// The interval to use.
    pub interval: TimeInterval,
    /// Whether the name was unrecognized and `day` was substituted.
    pub fell_back: bool,
}

impl TimeInterval {
    /// Returns the interval as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Parses an interval name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Parses an interval name, substituting `day` for anything unknown.
    pub fn resolve(s: &str) -> IntervalResolution {
        Self::parse(s).map_or_else(
            || {
                warn!(requested = s, "unrecognized time interval, using day");
                IntervalResolution {
                    interval: Self::Day,
                    fell_back: true,
                }
            },
            |interval| IntervalResolution {
                interval,
                fell_back: false,
            },
        )
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
