//! Validated names that may appear in query text.
//!
//! Values (timestamps, ids, tags) always travel as bind parameters. Names
//! cannot be bound in every position AQL accepts them, so collection names
//! and attribute paths are checked against a strict allow-list and then
//! rendered backtick-quoted.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static COLLECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]{0,255}$").unwrap_or_else(|_| unreachable!())
});

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|_| unreachable!()));

/// A collection name that passed the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validates a collection name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the name starts with a letter or
    /// underscore and continues with at most 255 letters, digits, `_` or `-`.
    pub fn parse(name: &str) -> Result<Self> {
        if COLLECTION_PATTERN.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(Error::Validation(format!("invalid collection name: {name:?}")))
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as it is written into query text.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// A dot-separated attribute path such as `created_at` or `meta.source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Validates an attribute path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any segment is empty or contains
    /// characters other than letters, digits and `_`, or starts with a digit.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().all(|s| SEGMENT_PATTERN.is_match(s)) {
            Ok(Self {
                raw: path.to_string(),
                segments,
            })
        } else {
            Err(Error::Validation(format!("invalid field path: {path:?}")))
        }
    }

    /// Returns the path as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the individual attribute names.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Renders the attribute access on `variable`, e.g. ``doc.`meta`.`source` ``.
    #[must_use]
    pub fn on(&self, variable: &str) -> String {
        let mut out = variable.to_string();
        for segment in &self.segments {
            out.push_str(".`");
            out.push_str(segment);
            out.push('`');
        }
        out
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("people")]
    #[test_case("_system_like")]
    #[test_case("follows-v2")]
    #[test_case("A1")]
    fn test_identifier_accepts(name: &str) {
        assert_eq!(Identifier::parse(name).unwrap().as_str(), name);
    }

    #[test_case("" ; "empty")]
    #[test_case("1people" ; "leading digit")]
    #[test_case("-people" ; "leading dash")]
    #[test_case("people FILTER true" ; "injection attempt")]
    #[test_case("people`" ; "backtick")]
    #[test_case("a.b" ; "dot")]
    fn test_identifier_rejects(name: &str) {
        assert!(matches!(Identifier::parse(name), Err(Error::Validation(_))));
    }

    #[test]
    fn test_identifier_length_limit() {
        let ok = format!("a{}", "b".repeat(255));
        let too_long = format!("a{}", "b".repeat(256));
        assert!(Identifier::parse(&ok).is_ok());
        assert!(Identifier::parse(&too_long).is_err());
    }

    #[test]
    fn test_identifier_serde_validates() {
        let parsed: std::result::Result<Identifier, _> = serde_json::from_str("\"bad name\"");
        assert!(parsed.is_err());
        let parsed: Identifier = serde_json::from_str("\"good\"").unwrap();
        assert_eq!(parsed.quoted(), "`good`");
    }

    #[test]
    fn test_field_path_render() {
        let path = FieldPath::parse("meta.source").unwrap();
        assert_eq!(path.on("doc"), "doc.`meta`.`source`");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["meta", "source"]);
    }

    #[test_case("" ; "empty")]
    #[test_case("a..b" ; "empty segment")]
    #[test_case(".a" ; "leading dot")]
    #[test_case("a-b" ; "dash")]
    #[test_case("a[0]" ; "index")]
    #[test_case("a b" ; "space")]
    fn test_field_path_rejects(path: &str) {
        assert!(FieldPath::parse(path).is_err());
    }
}
