//! Abhilekh Search - query analysis and multi-modal ranking
//!
//! This crate is the search core of the archive: it classifies free-text
//! queries, builds the matching lexical / vector-similarity / hybrid
//! request against the `videos` or `video_snippets` collection, and
//! post-processes the hits into a uniform response envelope.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use abhilekh_search::{RuleClassifier, SearchRequest, SearchRouter};
//! use abhilekh_search::{EmbedderConfig, OpenAiEmbedder};
//! use abhilekh_store::{ElasticConfig, ElasticStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(ElasticStore::connect(ElasticConfig::local()).await?);
//!     let embedder = Arc::new(OpenAiEmbedder::new(EmbedderConfig::default())?);
//!     let router = SearchRouter::new(Arc::new(RuleClassifier), embedder, store);
//!
//!     let envelope = router
//!         .search(&SearchRequest {
//!             query: "what rituals happen during Teej?".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("{} results", envelope.metadata.total_results);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod embedding;
pub mod error;
pub mod router;
pub mod scoring;
pub mod strategy;

// Re-exports for convenience
pub use classify::{
    apply_overrides, extract_keywords, Classifier, Intent, Level, LlmClassifier,
    LlmClassifierConfig, QueryAnalysis, QueryAnalyzer, RuleClassifier, SearchType,
};
pub use embedding::{Embedder, EmbedderConfig, OpenAiEmbedder};
pub use error::{Result, SearchError};
pub use router::{
    SearchEnvelope, SearchMetadata, SearchRequest, SearchRouter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use scoring::{SigmoidParams, LEXICAL_BOOST};
pub use strategy::{
    contains_devanagari, HybridStrategy, LexicalStrategy, QueryStrategy, StrategyInput,
    VectorStrategy,
};
