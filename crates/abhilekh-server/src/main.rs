use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use abhilekh_config::{ClassifierMode, ConfigLoader, ConfigOverrides};
use abhilekh_search::{
    Classifier, EmbedderConfig, LlmClassifier, LlmClassifierConfig, OpenAiEmbedder,
    RuleClassifier, SearchRouter,
};
use abhilekh_store::{ElasticConfig, ElasticStore};
use abhilekh_server::{app, AppState};

/// Abhilekh search API server
#[derive(Debug, Parser)]
#[command(name = "abhilekh-server", version, about)]
struct Args {
    /// Working directory holding .abhilekh/config.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the listen address
    #[arg(long)]
    bind: Option<String>,

    /// Override the Elasticsearch URL
    #[arg(long, env = "ABHILEKH_ES_URL")]
    elasticsearch_url: Option<String>,

    /// Include collaborator error detail in 500 responses (development only)
    #[arg(long)]
    expose_errors: bool,
}

fn env_key(var: &Option<String>) -> Option<String> {
    var.as_deref().and_then(|name| std::env::var(name).ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        elasticsearch_url: args.elasticsearch_url.clone(),
        bind_addr: args.bind.clone(),
        expose_errors: args.expose_errors.then_some(true),
        log_level: None,
    };
    let mut loader = ConfigLoader::new();
    let config = loader.load(&args.config_dir, Some(&overrides))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    tracing::info!("Document store: {}", config.elasticsearch.url);
    tracing::info!(
        "Classifier: {}, embedding model: {}",
        config.classifier.mode,
        config.embedding.model
    );

    let mut es_config = ElasticConfig::with_url(&config.elasticsearch.url);
    es_config.timeout_secs = config.elasticsearch.timeout_secs;
    if let Some(ref username) = config.elasticsearch.username {
        let password = env_key(&config.elasticsearch.password_env).unwrap_or_default();
        es_config = es_config.basic_auth(username.clone(), password);
    }
    let store = Arc::new(ElasticStore::connect(es_config).await?);
    store.ensure_indices().await?;

    let embedder = Arc::new(OpenAiEmbedder::new(EmbedderConfig {
        base_url: config.embedding.base_url.clone(),
        api_key: env_key(&config.embedding.api_key_env),
        model: config.embedding.model.clone(),
        timeout_secs: config.embedding.timeout_secs,
    })?);

    let classifier: Arc<dyn Classifier> = match config.classifier.mode {
        ClassifierMode::Rules => Arc::new(RuleClassifier),
        ClassifierMode::Llm => Arc::new(LlmClassifier::new(LlmClassifierConfig {
            base_url: config.classifier.base_url.clone(),
            api_key: env_key(&config.classifier.api_key_env),
            model: config.classifier.model.clone(),
            timeout_secs: config.classifier.timeout_secs,
        })?),
    };

    let router = Arc::new(SearchRouter::new(classifier, embedder, store));
    let state = AppState::new(router, config.server.expose_errors);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("Server listening on {}", config.server.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
