//! Shared test doubles for router tests
//!
//! The router takes injected trait objects for the classifier, embedder,
//! and document store, so the full routing path runs here without any
//! network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use abhilekh_search::{Classifier, Embedder, Intent, Level, SearchError, SearchType};
use abhilekh_store::{
    Collection, DocumentStore, Hit, RawFilters, SearchResponse, StoreError,
};

/// Classifier double returning a fixed base classification.
pub struct FixedClassifier {
    pub search_type: SearchType,
    pub level: Level,
    pub filters: RawFilters,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(search_type: SearchType, level: Level) -> Self {
        Self {
            search_type,
            level,
            filters: RawFilters::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_filters(mut self, filters: RawFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _query: &str) -> Result<Intent, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Intent {
            search_type: self.search_type,
            level: self.level,
            filters: self.filters.clone(),
        })
    }
}

/// Classifier double that always fails.
pub struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _query: &str) -> Result<Intent, SearchError> {
        Err(SearchError::QueryAnalysis("model unavailable".into()))
    }
}

/// Embedder double returning a constant vector and counting calls.
pub struct MockEmbedder {
    pub dimension: usize,
    pub calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: 3072,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.1; self.dimension])
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embedder double that always fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
        Err(SearchError::Embedding("quota exceeded".into()))
    }

    fn dimension(&self) -> usize {
        3072
    }
}

/// Document store double: canned search hits, canned parent videos,
/// recorded request bodies.
pub struct MockStore {
    pub hits: Vec<Hit>,
    pub videos: HashMap<String, Value>,
    pub search_calls: Mutex<Vec<(Collection, Value)>>,
    pub get_calls: AtomicUsize,
    pub fail_search: bool,
    pub fail_get_for: Option<String>,
}

impl MockStore {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self {
            hits,
            videos: HashMap::new(),
            search_calls: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
            fail_search: false,
            fail_get_for: None,
        }
    }

    pub fn with_video(mut self, vid_id: &str, source: Value) -> Self {
        self.videos.insert(vid_id.to_string(), source);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_get_for(mut self, vid_id: &str) -> Self {
        self.fail_get_for = Some(vid_id.to_string());
        self
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.lock().unwrap().len()
    }

    pub fn last_search_body(&self) -> Option<(Collection, Value)> {
        self.search_calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn search(
        &self,
        collection: Collection,
        body: Value,
    ) -> Result<SearchResponse, StoreError> {
        self.search_calls.lock().unwrap().push((collection, body));
        if self.fail_search {
            return Err(StoreError::status(503, "shard failure"));
        }
        Ok(SearchResponse {
            total: self.hits.len() as u64,
            hits: self.hits.clone(),
        })
    }

    async fn get(&self, _collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get_for.as_deref() == Some(id) {
            return Err(StoreError::status(500, "lookup failed"));
        }
        Ok(self.videos.get(id).cloned())
    }

    async fn index(&self, _: Collection, _: &str, _: Value) -> Result<(), StoreError> {
        unimplemented!("not used by router tests")
    }

    async fn update(&self, _: Collection, _: &str, _: Value) -> Result<(), StoreError> {
        unimplemented!("not used by router tests")
    }

    async fn delete(&self, _: Collection, _: &str) -> Result<(), StoreError> {
        unimplemented!("not used by router tests")
    }

    async fn delete_by_query(&self, _: Collection, _: Value) -> Result<u64, StoreError> {
        unimplemented!("not used by router tests")
    }

    async fn bulk_index(&self, _: Collection, _: Vec<(String, Value)>) -> Result<(), StoreError> {
        unimplemented!("not used by router tests")
    }
}
