//! Voyage Server
//!
//! HTTP front end of the dialogue engine. Each request carries a session
//! id and a user message; the reply is either a text message or a
//! schedule of departures.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod service;

use config::ServiceConfig;
use handlers::{create_router, AppState};
use service::{Conversation, DialogueService};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voyage_dialogue::{DialogueOrchestrator, InMemoryMessageLog};
use voyage_domain::traits::LlmProvider;
use voyage_extractor::{EntityExtractor, ExtractionClient, FallbackExtractor};
use voyage_llm::{MistralProvider, RateLimiter};
use voyage_routes::{MultiLegComposer, RaspClient};

/// Dialogue service wired to the live LLM and transit APIs
pub type LiveService = DialogueService<MistralProvider, RaspClient, RaspClient>;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// A client or limiter could not be constructed
    #[error("Setup error: {0}")]
    Setup(String),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Initialize tracing from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the live service from configuration
///
/// Creates blocking HTTP clients, so it must not be called from inside an
/// async runtime.
pub fn build_service(config: &ServiceConfig) -> Result<LiveService, ServerError> {
    let provider = MistralProvider::with_timeout(
        config.llm.endpoint.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        config.extractor.request_timeout(),
    )
    .map_err(|e| ServerError::Setup(e.to_string()))?;
    if !provider.is_configured() {
        warn!("LLM API key not set, extraction will use fallback rules only");
    }

    let limiter = Arc::new(
        RateLimiter::new(config.extractor.max_rps).map_err(|e| ServerError::Setup(e.to_string()))?,
    );
    let client = ExtractionClient::new(Arc::new(provider), limiter, config.extractor.clone());
    let extractor = EntityExtractor::new(client, FallbackExtractor::new());

    let rasp = RaspClient::from_config(&config.routes, config.transit_api_key.clone())
        .map_err(|e| ServerError::Setup(e.to_string()))?;
    if !rasp.is_configured() {
        warn!("Transit API key not set, route searches will fail");
    }
    let rasp = Arc::new(rasp);
    let composer = MultiLegComposer::from_services(Arc::clone(&rasp), rasp, &config.routes);

    Ok(DialogueService::with_log(
        DialogueOrchestrator::new(extractor, composer),
        InMemoryMessageLog::with_idle_ttl(config.session_idle()),
    ))
}

/// Start the HTTP server
///
/// Serves until the listener fails.
pub async fn start_server(
    config: &ServiceConfig,
    conversation: Arc<dyn Conversation>,
) -> Result<(), ServerError> {
    info!("Starting Voyage server");
    info!("Bind address: {}", config.bind_addr());
    info!("LLM model: {}", config.llm.model);
    info!("Extraction rate limit: {} rps", config.extractor.max_rps);

    let app = create_router(AppState { conversation });

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
