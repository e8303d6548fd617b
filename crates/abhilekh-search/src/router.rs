//! Search router
//!
//! Orchestrates one search request end to end: validate, classify,
//! normalize filters, dispatch to the mode's strategy, post-process, and
//! wrap the results in a uniform envelope. Single pass, no retries, no
//! state across requests. Every collaborator fault propagates to the
//! caller.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::classify::{extract_keywords, Classifier, Level, QueryAnalyzer, SearchType};
use crate::embedding::Embedder;
use crate::error::{Result, SearchError};
use crate::strategy::{strategy_for, QueryStrategy, StrategyInput};
use abhilekh_store::{fields, Collection, DocumentStore, Hit, RawFilters};

/// Hard cap on page size; larger requests are rejected before any
/// collaborator call.
pub const MAX_PAGE_SIZE: usize = 50;

/// Page size used when the caller does not send one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One incoming search request
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Pagination offset
    pub from: usize,
    /// Page size (1..=50)
    pub size: usize,
    /// Explicit filters; these override classifier-inferred ones
    pub filters: RawFilters,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
            filters: RawFilters::default(),
        }
    }
}

/// Envelope metadata echoed with every routed response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub search_type: String,
    pub level: String,
    /// Count of items actually returned; deep-pagination totals are not
    /// computed for cost reasons
    pub total_results: usize,
    pub page: usize,
    pub page_size: usize,
    /// Degraded-result notices (e.g. a snippet whose parent video is gone)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Routed search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchEnvelope {
    pub results: Vec<Value>,
    pub metadata: SearchMetadata,
}

/// Orchestrates classification, dispatch, and post-processing.
///
/// All collaborators are injected handles, so tests can run the full
/// routing path against doubles.
pub struct SearchRouter {
    analyzer: QueryAnalyzer,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
}

impl SearchRouter {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(classifier, Arc::clone(&embedder)),
            embedder,
            store,
        }
    }

    /// Routed search: classify the query, dispatch, post-process, and
    /// wrap in an envelope.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchEnvelope> {
        validate(&request.query, request.size)?;
        info!("Routing search for '{}'", request.query);

        let analysis = self.analyzer.analyze(&request.query).await?;
        info!(
            "Query classified as {} at {} level",
            analysis.search_type, analysis.level
        );

        let filters = request.filters.merged_over(&analysis.filters);
        let collection = analysis.level.collection();
        let clauses = filters.normalize(collection);

        let strategy = strategy_for(analysis.search_type);
        let input = StrategyInput {
            query_text: &request.query,
            keywords: &analysis.keywords,
            embedding: analysis.query_embedding.as_deref(),
            filters: &clauses,
            from: request.from,
            size: request.size,
        };

        let mut results = self.execute(strategy, &input, collection).await?;

        let warnings = if analysis.level == Level::Snippet {
            self.enrich_snippets(&mut results).await
        } else {
            Vec::new()
        };

        Ok(SearchEnvelope {
            metadata: SearchMetadata {
                search_type: analysis.search_type.to_string(),
                level: analysis.level.to_string(),
                total_results: results.len(),
                page: page_number(request.from, request.size),
                page_size: request.size,
                warnings,
            },
            results,
        })
    }

    /// Direct lexical search, bypassing classification.
    pub async fn keyword_search(
        &self,
        query: &str,
        level: Level,
        filters: &RawFilters,
        from: usize,
        size: usize,
    ) -> Result<Vec<Value>> {
        validate(query, size)?;
        let keywords = extract_keywords(query);
        let collection = level.collection();
        let clauses = filters.normalize(collection);

        let input = StrategyInput {
            query_text: query,
            keywords: &keywords,
            embedding: None,
            filters: &clauses,
            from,
            size,
        };
        self.execute(strategy_for(SearchType::Keyword), &input, collection)
            .await
    }

    /// Direct vector-similarity search, bypassing classification.
    pub async fn semantic_search(
        &self,
        query: &str,
        level: Level,
        filters: &RawFilters,
        from: usize,
        size: usize,
    ) -> Result<Vec<Value>> {
        validate(query, size)?;
        let embedding = self.embedder.embed(query).await?;
        let collection = level.collection();
        let clauses = filters.normalize(collection);

        let input = StrategyInput {
            query_text: query,
            keywords: &[],
            embedding: Some(&embedding),
            filters: &clauses,
            from,
            size,
        };
        self.execute(strategy_for(SearchType::Semantic), &input, collection)
            .await
    }

    /// Direct hybrid search, bypassing classification.
    pub async fn combined_search(
        &self,
        query: &str,
        level: Level,
        filters: &RawFilters,
        from: usize,
        size: usize,
    ) -> Result<Vec<Value>> {
        validate(query, size)?;
        let keywords = extract_keywords(query);
        let embedding = self.embedder.embed(query).await?;
        let collection = level.collection();
        let clauses = filters.normalize(collection);

        let input = StrategyInput {
            query_text: query,
            keywords: &keywords,
            embedding: Some(&embedding),
            filters: &clauses,
            from,
            size,
        };
        self.execute(strategy_for(SearchType::Combined), &input, collection)
            .await
    }

    /// Build the request with a strategy, run it, and shape the hits.
    async fn execute(
        &self,
        strategy: &dyn QueryStrategy,
        input: &StrategyInput<'_>,
        collection: Collection,
    ) -> Result<Vec<Value>> {
        let body = strategy.build(input, collection)?;
        let response = self.store.search(collection, body).await?;
        Ok(response.hits.into_iter().map(hit_to_result).collect())
    }

    /// Attach parent-video transcript context to snippet hits.
    ///
    /// Lookups run concurrently; a miss or a failed lookup degrades that
    /// one result (`videoData: null` plus a warning) rather than failing
    /// the whole request.
    async fn enrich_snippets(&self, results: &mut [Value]) -> Vec<String> {
        let lookups: Vec<_> = results
            .iter()
            .map(|result| {
                let vid_id = result
                    .get(fields::VID_ID)
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                async move {
                    match vid_id {
                        Some(id) => {
                            let outcome = self.store.get(Collection::Videos, &id).await;
                            (Some(id), outcome)
                        }
                        None => (None, Ok(None)),
                    }
                }
            })
            .collect();

        let outcomes = futures::future::join_all(lookups).await;

        let mut warnings = Vec::new();
        for (result, (vid_id, outcome)) in results.iter_mut().zip(outcomes) {
            let video_data = match (vid_id, outcome) {
                (Some(_), Ok(Some(parent))) => json!({
                    (fields::TRANSCRIPT_JSON): parent.get(fields::TRANSCRIPT_JSON)
                        .cloned()
                        .unwrap_or(Value::Null),
                    (fields::ENGLISH_TRANSCRIPT_JSON): parent.get(fields::ENGLISH_TRANSCRIPT_JSON)
                        .cloned()
                        .unwrap_or(Value::Null),
                }),
                (Some(id), Ok(None)) => {
                    warn!("Snippet references missing video '{id}'");
                    warnings.push(format!("parent video '{id}' not found; result degraded"));
                    Value::Null
                }
                (Some(id), Err(e)) => {
                    warn!("Parent lookup for video '{id}' failed: {e}");
                    warnings.push(format!("parent video '{id}' lookup failed; result degraded"));
                    Value::Null
                }
                (None, _) => {
                    warn!("Snippet hit carries no vidID");
                    warnings.push("snippet without vidID; result degraded".to_string());
                    Value::Null
                }
            };

            if let Some(object) = result.as_object_mut() {
                object.insert("videoData".to_string(), video_data);
            }
        }
        warnings
    }
}

/// Reject empty queries and oversized pages before any collaborator call.
fn validate(query: &str, size: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::Validation("Missing query parameter".into()));
    }
    if size == 0 {
        return Err(SearchError::Validation("Page size must be at least 1".into()));
    }
    if size > MAX_PAGE_SIZE {
        return Err(SearchError::Validation(format!(
            "Maximum page size is {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

/// `page = floor(from / size) + 1`
fn page_number(from: usize, size: usize) -> usize {
    from / size + 1
}

/// Shape one hit into a result item: stored fields plus `score`, with the
/// internal embedding vectors stripped; they must never reach a client.
fn hit_to_result(hit: Hit) -> Value {
    let mut source = hit.source;
    if let Some(object) = source.as_object_mut() {
        object.remove(fields::TRANSCRIPT_EMBEDDING);
        object.remove(fields::SNIPPET_EMBEDDING);
        object.insert("score".to_string(), json!(hit.score));
    }
    source
}
