//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Primary filter variable.
pub const LOG_ENV: &str = "TEMPOGRAPH_LOG";

/// Filter used when neither `TEMPOGRAPH_LOG` nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "tempograph=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable multi-line output.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parses a format name. Anything but `json` is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}

/// Subscriber configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_settings(None)
    }

    /// Builds logging configuration from config settings.
    ///
    /// The filter comes from `TEMPOGRAPH_LOG`, then `RUST_LOG`, then the
    /// settings, then `tempograph=info`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>) -> Self {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .map(LogFormat::parse)
            .unwrap_or_default();
        let file = settings.and_then(|s| s.file.clone());

        let directives = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .or_else(|| settings.and_then(|s| s.filter.clone()));

        Self {
            format,
            filter: build_filter(directives.as_deref()),
            file,
        }
    }
}

/// Parses filter directives, falling back to the default on bad input.
fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
