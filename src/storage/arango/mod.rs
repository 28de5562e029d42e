//! `ArangoDB` store over the HTTP REST API.
//!
//! Queries go through `/_api/cursor`, following `hasMore` until the cursor
//! is drained. Single-document operations use `/_api/document`, collection
//! management `/_api/collection` and index management `/_api/index`.

use crate::config::ArangoConfig;
use crate::models::{CollectionInfo, CollectionType, Document, IndexSpec, WriteResult};
use crate::query::{AqlQuery, Identifier};
use crate::storage::traits::DocumentStore;
use crate::{Error, Result};
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

/// Rows requested per cursor round trip.
const BATCH_SIZE: u32 = 1000;

/// `ERROR_ARANGO_DOCUMENT_NOT_FOUND`.
const DOCUMENT_NOT_FOUND: u64 = 1202;
/// `ERROR_ARANGO_DATA_SOURCE_NOT_FOUND`.
const COLLECTION_NOT_FOUND: u64 = 1203;

/// Error body returned by the server.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArangoErrorBody {
    #[serde(default)]
    error_num: Option<u64>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorBatch {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionDescriptor {
    name: String,
    #[serde(rename = "type")]
    kind: u64,
    #[serde(default)]
    is_system: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionList {
    #[serde(default)]
    result: Vec<CollectionDescriptor>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<Value>,
}

/// Builds a blocking HTTP client with the configured timeouts.
#[must_use]
pub fn build_http_client(config: &ArangoConfig) -> Client {
    let mut builder = Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build ArangoDB HTTP client: {err}");
        Client::new()
    })
}

/// Maps a failed response to an error.
///
/// Missing collections and documents become [`Error::NotFound`]; anything
/// else keeps the server's message in [`Error::Store`].
fn classify_failure(operation: &str, status: u16, body: &str) -> Error {
    let parsed: ArangoErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error_message
        .clone()
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));

    match parsed.error_num {
        Some(DOCUMENT_NOT_FOUND | COLLECTION_NOT_FOUND) => Error::NotFound(message),
        _ if status == 404 => Error::NotFound(message),
        _ => Error::store(operation, message),
    }
}

/// `ArangoDB` store.
///
/// # Example
///
/// ```rust,no_run
/// use tempograph::{ArangoConfig, ArangoHttpStore, DocumentStore};
///
/// let store = ArangoHttpStore::new(ArangoConfig::default())?;
/// for collection in store.collections()? {
///     println!("{} ({})", collection.name, collection.kind);
/// }
/// # Ok::<(), tempograph::Error>(())
/// ```
pub struct ArangoHttpStore {
    base: Url,
    database: String,
    username: String,
    password: SecretString,
    client: Client,
}

impl std::fmt::Debug for ArangoHttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArangoHttpStore")
            .field("base", &self.base.as_str())
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ArangoHttpStore {
    /// Creates a store for the configured server and database.
    ///
    /// No request is made until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the URL does not parse or cannot
    /// carry a path.
    pub fn new(config: ArangoConfig) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| Error::Validation(format!("invalid ArangoDB url {:?}: {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Validation(format!(
                "ArangoDB url cannot carry a path: {}",
                config.url
            )));
        }

        Ok(Self {
            client: build_http_client(&config),
            base,
            database: config.database,
            username: config.username,
            password: config.password,
        })
    }

    /// Checks that the server answers with valid credentials.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.endpoint(&["version"])
            .ok()
            .and_then(|url| self.authorized(self.client.get(url)).send().ok())
            .is_some_and(|r| r.status().is_success())
    }

    /// Builds `/_db/{database}/_api/{segments...}`, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::store("endpoint", "url cannot carry a path"))?;
            path.pop_if_empty();
            path.extend(["_db", self.database.as_str(), "_api"]);
            path.extend(segments);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    /// Sends a request and decodes the JSON response.
    fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T> {
        let mut request = self.authorized(self.client.request(method, url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_request() {
                "request"
            } else {
                "unknown"
            };
            tracing::error!(
                operation,
                error = %e,
                error_kind,
                "ArangoDB request failed"
            );
            Error::store(operation, format!("{error_kind} error: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(
                operation,
                status = %status,
                body = %body,
                "ArangoDB returned error status"
            );
            return Err(classify_failure(operation, status.as_u16(), &body));
        }

        response.json().map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to parse ArangoDB response");
            Error::store(operation, e.to_string())
        })
    }
}

impl DocumentStore for ArangoHttpStore {
    #[instrument(skip(self, query), fields(operation = "execute"))]
    fn execute(&self, query: &AqlQuery) -> Result<Vec<Value>> {
        debug!(query = %query.text, "running AQL");
        let body = json!({
            "query": query.text,
            "bindVars": query.bind_vars,
            "batchSize": BATCH_SIZE,
        });
        let mut batch: CursorBatch =
            self.call("execute", Method::POST, self.endpoint(&["cursor"])?, Some(&body))?;
        let mut rows = std::mem::take(&mut batch.result);

        while batch.has_more {
            let Some(id) = batch.id.take() else {
                return Err(Error::store("execute", "cursor has more rows but no id"));
            };
            batch = self.call("execute", Method::PUT, self.endpoint(&["cursor", id.as_str()])?, None)?;
            rows.append(&mut batch.result);
        }

        Ok(rows)
    }

    fn insert(&self, collection: &Identifier, document: &Document) -> Result<WriteResult> {
        let body = Value::Object(document.clone());
        self.call(
            "insert",
            Method::POST,
            self.endpoint(&["document", collection.as_str()])?,
            Some(&body),
        )
    }

    fn update(&self, collection: &Identifier, key: &str, patch: &Document) -> Result<WriteResult> {
        let body = Value::Object(patch.clone());
        self.call(
            "update",
            Method::PATCH,
            self.endpoint(&["document", collection.as_str(), key])?,
            Some(&body),
        )
    }

    fn get(&self, collection: &Identifier, key: &str) -> Result<Document> {
        self.call(
            "get",
            Method::GET,
            self.endpoint(&["document", collection.as_str(), key])?,
            None,
        )
    }

    fn remove(&self, collection: &Identifier, key: &str) -> Result<WriteResult> {
        self.call(
            "remove",
            Method::DELETE,
            self.endpoint(&["document", collection.as_str(), key])?,
            None,
        )
    }

    fn truncate(&self, collection: &Identifier) -> Result<()> {
        let _: Value = self.call(
            "truncate",
            Method::PUT,
            self.endpoint(&["collection", collection.as_str(), "truncate"])?,
            None,
        )?;
        Ok(())
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut url = self.endpoint(&["collection"])?;
        url.query_pairs_mut().append_pair("excludeSystem", "true");
        let list: CollectionList = self.call("collections", Method::GET, url, None)?;

        Ok(list
            .result
            .into_iter()
            .filter(|c| !c.is_system)
            .filter_map(|c| {
                CollectionType::from_code(c.kind).map(|kind| CollectionInfo { name: c.name, kind })
            })
            .collect())
    }

    fn create_collection(
        &self,
        name: &Identifier,
        kind: CollectionType,
        wait_for_sync: bool,
    ) -> Result<CollectionInfo> {
        let body = json!({
            "name": name.as_str(),
            "type": kind.code(),
            "waitForSync": wait_for_sync,
        });
        let created: CollectionDescriptor = self.call(
            "create_collection",
            Method::POST,
            self.endpoint(&["collection"])?,
            Some(&body),
        )?;

        Ok(CollectionInfo {
            name: created.name,
            kind: CollectionType::from_code(created.kind).unwrap_or(kind),
        })
    }

    fn add_index(&self, collection: &Identifier, spec: &IndexSpec) -> Result<Value> {
        let mut url = self.endpoint(&["index"])?;
        url.query_pairs_mut().append_pair("collection", collection.as_str());
        self.call("add_index", Method::POST, url, Some(&spec.payload()))
    }

    fn indexes(&self, collection: &Identifier) -> Result<Vec<Value>> {
        let mut url = self.endpoint(&["index"])?;
        url.query_pairs_mut().append_pair("collection", collection.as_str());
        let list: IndexList = self.call("indexes", Method::GET, url, None)?;
        Ok(list.indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str) -> ArangoHttpStore {
        ArangoHttpStore::new(ArangoConfig {
            url: url.to_string(),
            database: "graphs".to_string(),
            ..ArangoConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_layout() {
        let store = store("http://localhost:8529");
        let url = store.endpoint(&["document", "people", "alice"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8529/_db/graphs/_api/document/people/alice");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_keys() {
        let store = store("https://db.example.com/arango/");
        let url = store.endpoint(&["document", "people", "a%b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/arango/_db/graphs/_api/document/people/a%25b%20c"
        );
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = ArangoHttpStore::new(ArangoConfig {
            url: "not a url".to_string(),
            ..ArangoConfig::default()
        });
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = ArangoHttpStore::new(ArangoConfig {
            url: "mailto:root@localhost".to_string(),
            ..ArangoConfig::default()
        });
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_classify_not_found() {
        let body = r#"{"error":true,"code":404,"errorNum":1203,"errorMessage":"collection or view not found: ghost"}"#;
        match classify_failure("insert", 404, body) {
            Error::NotFound(message) => assert_eq!(message, "collection or view not found: ghost"),
            other => panic!("unexpected {other:?}"),
        }

        let body = r#"{"error":true,"code":404,"errorNum":1202,"errorMessage":"document not found"}"#;
        assert!(matches!(classify_failure("get", 404, body), Error::NotFound(_)));
    }

    #[test]
    fn test_classify_store_error_keeps_message() {
        let body = r#"{"error":true,"code":409,"errorNum":1210,"errorMessage":"unique constraint violated"}"#;
        match classify_failure("insert", 409, body) {
            Error::Store { operation, cause } => {
                assert_eq!(operation, "insert");
                assert_eq!(cause, "unique constraint violated");
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_non_json_body() {
        match classify_failure("execute", 502, "Bad Gateway") {
            Error::Store { cause, .. } => assert_eq!(cause, "HTTP 502: Bad Gateway"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_password() {
        let store = ArangoHttpStore::new(ArangoConfig {
            password: SecretString::from("hunter2"),
            ..ArangoConfig::default()
        })
        .unwrap();
        assert!(!format!("{store:?}").contains("hunter2"));
    }
}
