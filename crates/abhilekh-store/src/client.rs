//! Elasticsearch client wrapper
//!
//! Provides a high-level interface for connecting to the store and running
//! search and document operations against the archive's two collections.
//! Query bodies are built by callers (the search strategies); this layer
//! only speaks the REST surface: `_search`, `_doc`, `_bulk`,
//! `_delete_by_query`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::schema::{mapping_for, Collection};

/// Configuration for connecting to the store
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Server URL (e.g., "http://localhost:9200")
    pub url: String,
    /// Basic-auth username
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

impl ElasticConfig {
    /// Create config for local development
    pub fn local() -> Self {
        Self::default()
    }

    /// Create config with custom URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set basic-auth credentials
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// One search hit as returned by the store
#[derive(Debug, Clone)]
pub struct Hit {
    /// Document id
    pub id: String,
    /// Engine relevance score; opaque, monotonically comparable
    pub score: f32,
    /// Document source fields
    pub source: Value,
}

/// Decoded `_search` response
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    /// Ranked hits, descending score
    pub hits: Vec<Hit>,
    /// Engine-reported matching total (not used for pagination metadata)
    pub total: u64,
}

/// Document store operations the search path and ingestion plumbing need.
///
/// The concrete client is injected wherever store access is needed, so
/// tests can substitute doubles without network access.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a search request against one collection
    async fn search(&self, collection: Collection, body: Value) -> Result<SearchResponse>;

    /// Fetch one document by id; `None` when it does not exist
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    /// Index (create or replace) one document
    async fn index(&self, collection: Collection, id: &str, doc: Value) -> Result<()>;

    /// Partially update one document
    async fn update(&self, collection: Collection, id: &str, partial: Value) -> Result<()>;

    /// Delete one document by id
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    /// Delete every document matching a query; returns the deleted count
    async fn delete_by_query(&self, collection: Collection, query: Value) -> Result<u64>;

    /// Bulk-index documents as `(id, doc)` pairs
    async fn bulk_index(&self, collection: Collection, docs: Vec<(String, Value)>) -> Result<()>;
}

/// Elasticsearch-backed implementation of [`DocumentStore`]
pub struct ElasticStore {
    client: Client,
    config: ElasticConfig,
}

impl ElasticStore {
    /// Connect to the store and verify it answers.
    pub async fn connect(config: ElasticConfig) -> Result<Self> {
        info!("Connecting to document store at {}", config.url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(format!("failed to build HTTP client: {e}")))?;

        let store = Self { client, config };

        // Root endpoint doubles as a reachability check
        let response = store
            .request(reqwest::Method::GET, "")
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("failed to reach store: {e}")))?;

        if !response.status().is_success() {
            return Err(StoreError::Connection(format!(
                "store answered status {}",
                response.status()
            )));
        }

        info!("Connected to document store");
        Ok(store)
    }

    /// Build a store without the reachability check (tests, lazy startup).
    pub fn new_unchecked(config: ElasticConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create both indices with their mappings if they do not exist yet.
    pub async fn ensure_indices(&self) -> Result<()> {
        for collection in [Collection::Videos, Collection::Snippets] {
            if self.index_exists(collection).await? {
                debug!("Index '{}' already exists", collection);
                continue;
            }

            info!("Creating index '{}'", collection);
            let response = self
                .request(reqwest::Method::PUT, collection.as_str())
                .json(&mapping_for(collection))
                .send()
                .await
                .map_err(request_error)?;
            check_status(response).await?;
        }
        Ok(())
    }

    /// Check whether an index exists.
    pub async fn index_exists(&self, collection: Collection) -> Result<bool> {
        let response = self
            .request(reqwest::Method::HEAD, collection.as_str())
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StoreError::status(status.as_u16(), "index check failed")),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.config.url.trim_end_matches('/'), path);
        let mut request = self.client.request(method, url);
        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }
        request
    }
}

fn request_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Connection("store request timed out".into())
    } else if e.is_connect() {
        StoreError::Connection(format!("store connection failed: {e}"))
    } else {
        StoreError::Connection(format!("store request failed: {e}"))
    }
}

/// Turn a non-success response into a `Status` error, otherwise decode JSON.
async fn decode_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::status(status.as_u16(), body));
    }
    response
        .json()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Check status only, dropping the body.
async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::status(status.as_u16(), body));
    }
    Ok(())
}

/// Decode `hits.hits` from a `_search` response.
fn parse_search_response(body: Value) -> Result<SearchResponse> {
    let raw_hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(|h| h.as_array())
        .ok_or_else(|| StoreError::Decode("missing hits.hits in search response".into()))?;

    let total = body
        .pointer("/hits/total/value")
        .and_then(|v| v.as_u64())
        .unwrap_or(raw_hits.len() as u64);

    let hits = raw_hits
        .iter()
        .map(|hit| {
            let id = hit
                .get("_id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let score = hit
                .get("_score")
                .and_then(|v| v.as_f64())
                .unwrap_or_default() as f32;
            let source = hit.get("_source").cloned().unwrap_or(Value::Null);
            Hit { id, score, source }
        })
        .collect();

    Ok(SearchResponse { hits, total })
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn search(&self, collection: Collection, body: Value) -> Result<SearchResponse> {
        debug!("Searching '{}'", collection);

        let response = self
            .request(reqwest::Method::POST, &format!("{collection}/_search"))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let body = decode_json(response).await?;
        parse_search_response(body)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let response = self
            .request(reqwest::Method::GET, &format!("{collection}/_doc/{id}"))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = decode_json(response).await?;
        let found = body.get("found").and_then(|v| v.as_bool()).unwrap_or(false);
        if !found {
            return Ok(None);
        }
        Ok(body.get("_source").cloned())
    }

    async fn index(&self, collection: Collection, id: &str, doc: Value) -> Result<()> {
        debug!("Indexing {collection}/{id}");

        let response = self
            .request(reqwest::Method::PUT, &format!("{collection}/_doc/{id}"))
            .json(&doc)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> Result<()> {
        debug!("Updating {collection}/{id}");

        let response = self
            .request(reqwest::Method::POST, &format!("{collection}/_update/{id}"))
            .json(&json!({ "doc": partial }))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        debug!("Deleting {collection}/{id}");

        let response = self
            .request(reqwest::Method::DELETE, &format!("{collection}/_doc/{id}"))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await
    }

    async fn delete_by_query(&self, collection: Collection, query: Value) -> Result<u64> {
        debug!("Delete-by-query on '{}'", collection);

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("{collection}/_delete_by_query"),
            )
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(request_error)?;

        let body = decode_json(response).await?;
        Ok(body.get("deleted").and_then(|v| v.as_u64()).unwrap_or(0))
    }

    async fn bulk_index(&self, collection: Collection, docs: Vec<(String, Value)>) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }

        debug!("Bulk-indexing {} docs into '{}'", docs.len(), collection);

        let mut payload = String::new();
        for (id, doc) in &docs {
            let action = json!({ "index": { "_index": collection.as_str(), "_id": id } });
            payload.push_str(&serde_json::to_string(&action)?);
            payload.push('\n');
            payload.push_str(&serde_json::to_string(doc)?);
            payload.push('\n');
        }

        let response = self
            .request(reqwest::Method::POST, "_bulk")
            .header("Content-Type", "application/x-ndjson")
            .body(payload)
            .send()
            .await
            .map_err(request_error)?;

        let body = decode_json(response).await?;
        if body.get("errors").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(StoreError::Decode(
                "bulk request reported item-level errors".into(),
            ));
        }
        Ok(())
    }
}
