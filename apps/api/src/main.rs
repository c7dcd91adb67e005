use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prepsmart_api::config::Config;
use prepsmart_api::generation::questions::LlmQuestionGenerator;
use prepsmart_api::llm_client::{self, LlmClient};
use prepsmart_api::routes::build_router;
use prepsmart_api::state::AppState;
use prepsmart_api::store::firestore::{FirestoreEndpoint, FirestoreInitializer};
use prepsmart_api::store::CredentialProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("prepsmart_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PrepSmart API v{}", env!("CARGO_PKG_VERSION"));

    // Document store handle is created on first use, not here
    let endpoint = FirestoreEndpoint::from_emulator_host(config.firestore_emulator_host.clone());
    let store = Arc::new(CredentialProvider::new(
        config.credentials.clone(),
        Arc::new(FirestoreInitializer::new(endpoint)),
    ));

    // Initialize LLM client
    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set; every request will use fallback questions");
    }
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_base.clone(),
        config.generation_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        store,
        generator: Arc::new(LlmQuestionGenerator::new(llm)),
        generation_timeout: config.generation_timeout,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
