//! Search strategies
//!
//! One parameterized seam replaces what would otherwise be three
//! near-duplicate search implementations: each strategy only decides how
//! the scoring part of the request is shaped, while filters, pagination,
//! and source filtering are assembled identically for all of them.

mod hybrid;
mod lexical;
mod vector;

pub use hybrid::HybridStrategy;
pub use lexical::LexicalStrategy;
pub use vector::VectorStrategy;

use serde_json::{json, Value};

use crate::classify::SearchType;
use crate::error::Result;
use abhilekh_store::{clauses_to_dsl, fields, Collection, FilterClause};

/// Everything a strategy may need to build its request
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    /// The raw query text (vector modes embed and lexically match this)
    pub query_text: &'a str,
    /// Significant keywords (lexical modes match these)
    pub keywords: &'a [String],
    /// Query embedding, present for vector and combined modes
    pub embedding: Option<&'a [f32]>,
    /// Normalized filter clauses, AND-combined
    pub filters: &'a [FilterClause],
    /// Pagination offset
    pub from: usize,
    /// Page size
    pub size: usize,
}

/// Builds the store request body for one search mode.
pub trait QueryStrategy: Send + Sync {
    /// Mode name for logs
    fn name(&self) -> &'static str;

    /// Assemble the full request body for one collection
    fn build(&self, input: &StrategyInput<'_>, collection: Collection) -> Result<Value>;
}

/// The strategy implementing a search mode
pub fn strategy_for(search_type: SearchType) -> &'static dyn QueryStrategy {
    match search_type {
        SearchType::Keyword => &LexicalStrategy,
        SearchType::Semantic => &VectorStrategy,
        SearchType::Combined => &HybridStrategy,
    }
}

/// True when the text contains at least one Devanagari code point
/// (U+0900–U+097F).
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

/// The transcript field lexical matching should target for this query:
/// original script for Devanagari queries, English otherwise. The choice
/// is per request; a single query is assumed monolingual.
pub fn transcript_field_for(query: &str) -> &'static str {
    if contains_devanagari(query) {
        fields::TRANSCRIPT
    } else {
        fields::ENGLISH_TRANSLATION
    }
}

/// Boosted field list for fuzzy keyword matching.
pub fn keyword_fields(collection: Collection, query: &str) -> Vec<String> {
    match collection {
        Collection::Videos => vec![
            format!("{}^3", fields::VID_TITLE),
            format!("{}^2", fields::VID_DESCRIPTION),
            format!("{}^2", fields::TAGS),
            fields::LOCATION.to_string(),
            transcript_field_for(query).to_string(),
        ],
        Collection::Snippets => vec![
            fields::TRANSCRIPT_SNIPPET.to_string(),
            fields::ENGLISH_TRANSLATION.to_string(),
        ],
    }
}

/// Unboosted text fields for the secondary lexical signal in vector mode.
pub fn text_fields(collection: Collection) -> Vec<String> {
    match collection {
        Collection::Videos => vec![
            fields::VID_TITLE.to_string(),
            fields::TRANSCRIPT.to_string(),
            fields::ENGLISH_TRANSLATION.to_string(),
        ],
        Collection::Snippets => vec![
            fields::TRANSCRIPT_SNIPPET.to_string(),
            fields::ENGLISH_TRANSLATION.to_string(),
        ],
    }
}

/// Source fields excluded from every response: embedding vectors never
/// leave the store, and the word-level offset arrays inside the stored
/// transcript structures would dominate the payload.
pub fn source_excludes(collection: Collection) -> Vec<&'static str> {
    match collection {
        Collection::Videos => vec![
            fields::TRANSCRIPT_EMBEDDING,
            "transcriptJson.alternatives.words",
            "englishTranscriptJson.alternatives.words",
        ],
        Collection::Snippets => vec![fields::SNIPPET_EMBEDDING],
    }
}

/// Wrap a scoring query into the full request body.
pub fn assemble_body(query: Value, input: &StrategyInput<'_>, collection: Collection) -> Value {
    json!({
        "from": input.from,
        "size": input.size,
        "query": query,
        "_source": { "excludes": source_excludes(collection) }
    })
}

/// `filter` array for a bool query.
pub fn filter_dsl(input: &StrategyInput<'_>) -> Vec<Value> {
    clauses_to_dsl(input.filters)
}
