//! Abhilekh Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.abhilekh/config.toml`
//! - Local config: `.abhilekh/config.toml` (in working directory)
//! - Programmatic overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

/// Embedding vector dimension used by both index mappings and the
/// embedding client. Vectors of any other length are rejected.
pub const EMBEDDING_DIM: usize = 3072;

/// Root configuration for Abhilekh.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AbhilekhConfig {
    /// Elasticsearch connection configuration
    pub elasticsearch: ElasticsearchConfig,

    /// Embedding service configuration
    pub embedding: EmbeddingConfig,

    /// Query classifier configuration
    pub classifier: ClassifierConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AbhilekhConfig {
    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elasticsearch.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "elasticsearch.url is required".to_string(),
            ));
        }
        self.embedding.validate()?;
        self.classifier.validate()?;
        if self.server.bind_addr.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.bind_addr is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply programmatic overrides on top of the merged config.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref url) = overrides.elasticsearch_url {
            self.elasticsearch.url = url.clone();
        }
        if let Some(ref addr) = overrides.bind_addr {
            self.server.bind_addr = addr.clone();
        }
        if let Some(expose) = overrides.expose_errors {
            self.server.expose_errors = expose;
        }
        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }
}

/// Overrides applied after file-based configuration (e.g. from CLI flags).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override elasticsearch.url
    pub elasticsearch_url: Option<String>,
    /// Override server.bind_addr
    pub bind_addr: Option<String>,
    /// Override server.expose_errors
    pub expose_errors: Option<bool>,
    /// Override logging.level
    pub log_level: Option<String>,
}

/// Elasticsearch connection configuration.
///
/// # Example TOML
///
/// ```toml
/// [elasticsearch]
/// url = "http://localhost:9200"
/// username = "elastic"
/// password_env = "ABHILEKH_ES_PASSWORD"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// Server URL (e.g., "http://localhost:9200")
    pub url: String,

    /// Basic-auth username (optional)
    pub username: Option<String>,

    /// Environment variable holding the basic-auth password
    pub password_env: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password_env: Some("ABHILEKH_ES_PASSWORD".to_string()),
            timeout_secs: 30,
        }
    }
}

/// Embedding service configuration.
///
/// The embedding service is an OpenAI-compatible endpoint producing
/// 3072-dimensional multilingual vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Environment variable name containing the API key
    pub api_key_env: Option<String>,

    /// Embedding model name
    pub model: String,

    /// Expected vector dimension; must match the index mappings
    pub dimension: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            model: "text-embedding-3-large".to_string(),
            dimension: EMBEDDING_DIM,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Validate that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "embedding.base_url is required".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "embedding.model is required".to_string(),
            ));
        }
        if self.dimension != EMBEDDING_DIM {
            return Err(ConfigError::ValidationError(format!(
                "embedding.dimension must be {} to match the index mappings, got {}",
                EMBEDDING_DIM, self.dimension
            )));
        }
        Ok(())
    }
}

/// Which backend performs the base query-intent classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Deterministic heuristics, no network calls (default)
    #[default]
    Rules,
    /// External language model over an OpenAI-compatible chat API
    Llm,
}

impl std::fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

/// Query classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Classification backend
    pub mode: ClassifierMode,

    /// Chat API base URL (required when mode = "llm")
    pub base_url: String,

    /// Environment variable name containing the API key
    pub api_key_env: Option<String>,

    /// Chat model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Rules,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
        }
    }
}

impl ClassifierConfig {
    /// Validate that required settings exist for the selected mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == ClassifierMode::Llm {
            if self.base_url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "classifier.mode is 'llm' but classifier.base_url is empty".to_string(),
                ));
            }
            if self.model.is_empty() {
                return Err(ConfigError::ValidationError(
                    "classifier.mode is 'llm' but classifier.model is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:8080")
    pub bind_addr: String,

    /// Include collaborator error detail in 500 responses.
    /// Must stay off outside development environments.
    pub expose_errors: bool,

    /// Maximum page size accepted by search endpoints
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            expose_errors: false,
            max_page_size: 50,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level filter (overridden by RUST_LOG)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
