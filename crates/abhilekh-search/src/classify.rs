//! Query intent classification
//!
//! Turns a free-text query into a structured intent: search mode, target
//! level, inferred filters, significant keywords, and (for semantic and
//! combined modes) a query embedding.
//!
//! The base classification comes from a pluggable backend: an external
//! language model or a deterministic rule engine. Either way the output is
//! treated as an untrusted payload: mode and level must deserialize into
//! closed enums before any search executes. Two deterministic override
//! rules then run as safety nets against misclassification; they must hold
//! regardless of what the backend answered.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::Embedder;
use crate::error::{Result, SearchError};
use abhilekh_store::{Collection, RawFilters};

/// Search mode chosen for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Short, specific queries; lexical matching only
    Keyword,
    /// Natural-language questions and descriptions; vector similarity
    Semantic,
    /// Specific terms mixed with descriptive context; both signals
    Combined,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Keyword => write!(f, "keyword"),
            SearchType::Semantic => write!(f, "semantic"),
            SearchType::Combined => write!(f, "combined"),
        }
    }
}

/// Target granularity for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Broad/topical queries; searches whole videos
    Video,
    /// Queries implying a specific moment; searches transcript snippets
    Snippet,
}

impl Level {
    /// The collection this level searches
    pub fn collection(&self) -> Collection {
        match self {
            Level::Video => Collection::Videos,
            Level::Snippet => Collection::Snippets,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Video => write!(f, "video"),
            Level::Snippet => write!(f, "snippet"),
        }
    }
}

/// Validated base-classification output
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    #[serde(rename = "searchType")]
    pub search_type: SearchType,
    pub level: Level,
    #[serde(default)]
    pub filters: RawFilters,
}

/// Base classification backend.
///
/// Implementations return an [`Intent`] or fail with
/// [`SearchError::QueryAnalysis`]; the router never searches without a
/// valid classification.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<Intent>;
}

/// Fully analyzed query, ready for dispatch
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    pub search_type: SearchType,
    pub level: Level,
    /// Filters inferred from the query text (explicit values only)
    pub filters: RawFilters,
    /// Significant terms; empty for pure semantic mode
    pub keywords: Vec<String>,
    /// Present for semantic and combined modes
    pub query_embedding: Option<Vec<f32>>,
}

/// Interrogative words that force a keyword classification to semantic.
const INTERROGATIVES: [&str; 6] = ["what", "where", "when", "how", "why", "who"];

/// Token count above which a keyword classification becomes combined.
const KEYWORD_TOKEN_LIMIT: usize = 6;

/// Apply the deterministic override rules to a base classification.
///
/// Rules, in order:
/// 1. A query beginning with an interrogative word that was classified
///    `keyword` is forced to `semantic`.
/// 2. A query with more than 6 whitespace tokens still classified
///    `keyword` is forced to `combined`.
pub fn apply_overrides(query: &str, base: SearchType) -> SearchType {
    let mut search_type = base;

    if search_type == SearchType::Keyword && starts_with_interrogative(query) {
        debug!("Override: interrogative query forced to semantic");
        search_type = SearchType::Semantic;
    }

    if search_type == SearchType::Keyword
        && query.split_whitespace().count() > KEYWORD_TOKEN_LIMIT
    {
        debug!("Override: long query forced to combined");
        search_type = SearchType::Combined;
    }

    search_type
}

fn starts_with_interrogative(query: &str) -> bool {
    let first = query
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    INTERROGATIVES.contains(&first.as_str())
}

/// Tokenize a query into significant keywords: lowercased terms longer
/// than two characters, surrounding punctuation stripped.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| t.chars().count() > 2)
        .collect()
}

/// Full analysis pipeline: base classification, overrides, keyword
/// extraction, and embedding generation where the mode needs it.
pub struct QueryAnalyzer {
    classifier: Arc<dyn Classifier>,
    embedder: Arc<dyn Embedder>,
}

impl QueryAnalyzer {
    pub fn new(classifier: Arc<dyn Classifier>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            classifier,
            embedder,
        }
    }

    /// Analyze a query.
    ///
    /// Embedding failures abort the analysis; a semantic query must never
    /// silently degrade to keyword-only search.
    pub async fn analyze(&self, query: &str) -> Result<QueryAnalysis> {
        let intent = self.classifier.classify(query).await?;
        debug!(
            "Base classification: {} at {} level",
            intent.search_type, intent.level
        );

        let search_type = apply_overrides(query, intent.search_type);

        let keywords = match search_type {
            SearchType::Keyword | SearchType::Combined => extract_keywords(query),
            SearchType::Semantic => Vec::new(),
        };

        let query_embedding = match search_type {
            SearchType::Semantic | SearchType::Combined => {
                Some(self.embedder.embed(query).await?)
            }
            SearchType::Keyword => None,
        };

        Ok(QueryAnalysis {
            search_type,
            level: intent.level,
            filters: intent.filters,
            keywords,
            query_embedding,
        })
    }
}

/// Deterministic rule-based classifier: no network calls, same output for
/// the same query.
pub struct RuleClassifier;

/// Words suggesting the user wants a specific moment rather than a whole
/// recording.
const MOMENT_HINTS: [&str; 7] = [
    "moment", "says", "said", "mention", "mentions", "clip", "timestamp",
];

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, query: &str) -> Result<Intent> {
        let trimmed = query.trim();
        let is_question = trimmed.ends_with('?') || starts_with_interrogative(trimmed);
        let significant = extract_keywords(trimmed).len();

        let search_type = if is_question {
            SearchType::Semantic
        } else if significant <= 3 {
            SearchType::Keyword
        } else {
            SearchType::Combined
        };

        let lowered = trimmed.to_lowercase();
        let level = if MOMENT_HINTS.iter().any(|hint| lowered.contains(hint)) {
            Level::Snippet
        } else {
            Level::Video
        };

        // Only explicit literal dates are extractable without a language model
        let date_pattern = Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap();
        let upload_date = date_pattern
            .captures(trimmed)
            .map(|c| c[1].to_string());

        Ok(Intent {
            search_type,
            level,
            filters: RawFilters {
                upload_date,
                ..Default::default()
            },
        })
    }
}

/// Configuration for the LLM classification backend
#[derive(Debug, Clone)]
pub struct LlmClassifierConfig {
    /// Chat API base URL (OpenAI-compatible)
    pub base_url: String,
    /// API key (optional for local gateways)
    pub api_key: Option<String>,
    /// Chat model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Classifier backed by an external language model over an
/// OpenAI-compatible chat API.
pub struct LlmClassifier {
    client: Client,
    config: LlmClassifierConfig,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClassifier {
    pub fn new(config: LlmClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::QueryAnalysis(format!("HTTP client error: {e}")))?;

        Ok(Self { client, config })
    }

    fn prompt(query: &str) -> String {
        format!(
            "You classify search queries for a bilingual (Nepali/English) video \
             interview archive. Given a query, answer with ONLY a JSON object:\n\
             {{\"searchType\": \"keyword\"|\"semantic\"|\"combined\", \
             \"level\": \"video\"|\"snippet\", \
             \"filters\": {{\"uploadDate\": \"YYYY-MM-DD\"|null, \
             \"location\": string|null, \"tags\": [string], \"vidID\": null}}}}\n\n\
             keyword: 1-3 specific terms. semantic: a natural-language question \
             or description. combined: specific terms mixed with descriptive \
             context. level snippet: the query asks for a specific moment. \
             Extract filters ONLY when explicit in the query.\n\n\
             Query: \"{query}\""
        )
    }

    fn chat_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }
}

/// Extract and validate the JSON object in a model answer.
///
/// The surrounding text is untrusted chatter; the object must deserialize
/// into the closed [`Intent`] schema or the classification fails.
pub fn parse_intent(content: &str) -> Result<Intent> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => {
            return Err(SearchError::QueryAnalysis(format!(
                "classifier returned no JSON object: {content}"
            )))
        }
    };

    serde_json::from_str::<Intent>(json_str)
        .map_err(|e| SearchError::QueryAnalysis(format!("classifier returned invalid intent: {e}")))
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, query: &str) -> Result<Intent> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::prompt(query),
            }],
            temperature: 0.0,
        };

        let mut builder = self.client.post(self.chat_url()).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::QueryAnalysis(format!("classifier call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::QueryAnalysis(format!(
                "classifier call failed with status {status}: {body}"
            )));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| SearchError::QueryAnalysis(format!("invalid classifier response: {e}")))?;

        let content = decoded
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| SearchError::QueryAnalysis("classifier returned no choices".into()))?;

        parse_intent(content)
    }
}
