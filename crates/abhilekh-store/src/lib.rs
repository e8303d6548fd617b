//! Abhilekh Store - Elasticsearch document layer for the video archive
//!
//! This crate owns everything the archive persists: the `videos` and
//! `video_snippets` collections, their mappings, the typed document models,
//! validated filter clauses, and a thin REST client for search and CRUD.
//!
//! # Example
//!
//! ```ignore
//! use abhilekh_store::{ElasticConfig, ElasticStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ElasticStore::connect(ElasticConfig::local()).await?;
//!     store.ensure_indices().await?;
//!
//!     let video = abhilekh_store::ops::get_video(&store, "yt-abc123").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod models;
pub mod ops;
pub mod schema;

// Re-exports for convenience
pub use client::{DocumentStore, ElasticConfig, ElasticStore, Hit, SearchResponse};
pub use error::{Result, StoreError};
pub use filter::{clauses_to_dsl, FilterClause, RawFilters};
pub use models::{Snippet, TranscriptAlternative, TranscriptSegment, Video, WordOffset};
pub use schema::{collections, fields, Collection, EMBEDDING_DIM};
