//! Configuration management.
//!
//! Sources are applied in order, later sources winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`load_from_file`, or the platform config dir via
//!    `load_default`)
//! 3. Environment variables, after loading `.env` if present
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ARANGO_URL` | `arango.url` |
//! | `ARANGO_DB` | `arango.database` |
//! | `ARANGO_USERNAME` | `arango.username` |
//! | `ARANGO_PASSWORD` | `arango.password` |
//! | `TEMPOGRAPH_TIMEOUT_MS` | `arango.timeout_ms` |
//! | `TEMPOGRAPH_CONNECT_TIMEOUT_MS` | `arango.connect_timeout_ms` |
//! | `TEMPOGRAPH_LOG_FORMAT` | `logging.format` |
//! | `TEMPOGRAPH_LOG_FILE` | `logging.file` |

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for tempograph.
#[derive(Debug, Clone, Default)]
pub struct TempographConfig {
    /// Database connection.
    pub arango: ArangoConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Connection settings for an `ArangoDB` server.
#[derive(Debug, Clone)]
pub struct ArangoConfig {
    /// Server URL.
    pub url: String,
    /// Database name.
    pub database: String,
    /// User for HTTP basic auth.
    pub username: String,
    /// Password for HTTP basic auth.
    pub password: SecretString,
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl ArangoConfig {
    /// Default server URL.
    pub const DEFAULT_URL: &'static str = "http://localhost:8529";

    /// Default database.
    pub const DEFAULT_DATABASE: &'static str = "_system";

    /// Default user.
    pub const DEFAULT_USERNAME: &'static str = "root";

    /// Sets the server URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the database name.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = SecretString::from(password.into());
        self
    }
}

impl Default for ArangoConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            database: Self::DEFAULT_DATABASE.to_string(),
            username: Self::DEFAULT_USERNAME.to_string(),
            password: SecretString::from(String::new()),
            timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Logging settings as read from configuration.
///
/// Turned into a subscriber configuration by
/// [`LoggingConfig::from_settings`](crate::observability::LoggingConfig::from_settings).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// `json` or `pretty`.
    pub format: Option<String>,
    /// Filter directives, e.g. `tempograph=debug`.
    pub filter: Option<String>,
    /// Write logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database section.
    pub arango: Option<ConfigFileArango>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// `[arango]` section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileArango {
    /// Server URL.
    pub url: Option<String>,
    /// Database name.
    pub database: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl TempographConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration a host process would normally use: `.env`,
    /// then the default config file, then environment overrides.
    #[must_use]
    pub fn load() -> Self {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::load_default().with_env_overrides()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Store {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::Validation(format!(
            "invalid config file {}: {e}",
            path.display()
        )))?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/tempograph/` on macOS)
    /// 2. XDG config dir (`~/.config/tempograph/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("tempograph").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("tempograph")
                .join("config.toml"),
        ];

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file"),
            }
        }

        Self::default()
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok());
        self
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ARANGO_URL") {
            self.arango.url = url;
        }
        if let Some(database) = lookup("ARANGO_DB") {
            self.arango.database = database;
        }
        if let Some(username) = lookup("ARANGO_USERNAME") {
            self.arango.username = username;
        }
        if let Some(password) = lookup("ARANGO_PASSWORD") {
            self.arango.password = SecretString::from(password);
        }
        if let Some(timeout_ms) = lookup("TEMPOGRAPH_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.arango.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) =
            lookup("TEMPOGRAPH_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok())
        {
            self.arango.connect_timeout_ms = connect_timeout_ms;
        }
        if let Some(format) = lookup("TEMPOGRAPH_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = lookup("TEMPOGRAPH_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    /// Converts a `ConfigFile` to `TempographConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(arango) = file.arango {
            if let Some(url) = arango.url {
                config.arango.url = url;
            }
            if let Some(database) = arango.database {
                config.arango.database = database;
            }
            if let Some(username) = arango.username {
                config.arango.username = username;
            }
            if let Some(password) = arango.password {
                config.arango.password = SecretString::from(password);
            }
            if let Some(timeout_ms) = arango.timeout_ms {
                config.arango.timeout_ms = timeout_ms;
            }
            if let Some(connect_timeout_ms) = arango.connect_timeout_ms {
                config.arango.connect_timeout_ms = connect_timeout_ms;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TempographConfig::new();
        assert_eq!(config.arango.url, "http://localhost:8529");
        assert_eq!(config.arango.database, "_system");
        assert_eq!(config.arango.username, "root");
        assert_eq!(config.arango.password.expose_secret(), "");
        assert_eq!(config.arango.timeout_ms, 30_000);
        assert_eq!(config.arango.connect_timeout_ms, 5_000);
        assert!(config.logging.format.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[arango]
url = "http://db:8529"
database = "graphs"
password = "s3cret"
timeout_ms = 1000

[logging]
format = "json"
filter = "tempograph=debug"
"#
        )
        .unwrap();

        let config = TempographConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.arango.url, "http://db:8529");
        assert_eq!(config.arango.database, "graphs");
        assert_eq!(config.arango.username, "root");
        assert_eq!(config.arango.password.expose_secret(), "s3cret");
        assert_eq!(config.arango.timeout_ms, 1000);
        assert_eq!(config.arango.connect_timeout_ms, 5_000);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.logging.filter.as_deref(), Some("tempograph=debug"));
    }

    #[test]
    fn test_load_from_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[arango]\nhost = \"db\"").unwrap();
        let result = TempographConfig::load_from_file(file.path());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TempographConfig::load_from_file(&dir.path().join("absent.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_win() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ARANGO_URL", "http://override:8529"),
            ("ARANGO_DB", "other"),
            ("ARANGO_USERNAME", "svc"),
            ("ARANGO_PASSWORD", "pw"),
            ("TEMPOGRAPH_TIMEOUT_MS", "250"),
            ("TEMPOGRAPH_CONNECT_TIMEOUT_MS", "not-a-number"),
            ("TEMPOGRAPH_LOG_FORMAT", "pretty"),
        ]);

        let mut config = TempographConfig::default();
        config.apply_overrides(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(config.arango.url, "http://override:8529");
        assert_eq!(config.arango.database, "other");
        assert_eq!(config.arango.username, "svc");
        assert_eq!(config.arango.password.expose_secret(), "pw");
        assert_eq!(config.arango.timeout_ms, 250);
        // Unparseable numbers leave the previous value.
        assert_eq!(config.arango.connect_timeout_ms, 5_000);
        assert_eq!(config.logging.format.as_deref(), Some("pretty"));
    }

    #[test]
    fn test_builders() {
        let config = ArangoConfig::default()
            .with_url("http://x:1")
            .with_database("d")
            .with_credentials("u", "p");
        assert_eq!(config.url, "http://x:1");
        assert_eq!(config.database, "d");
        assert_eq!(config.username, "u");
        assert_eq!(config.password.expose_secret(), "p");
    }
}
