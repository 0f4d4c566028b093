//! Concierge HTTP server
//!
//! Serves the chat API for the configured business.

use concierge::api::{create_router, AppState};
use concierge::knowledge::{default_extractor, load_from_dir};
use concierge::system_prompt::build_system_prompt;
use concierge::tools::ToolRegistry;
use concierge::{Agent, Config, LogStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Log storage
    let store = Arc::new(LogStore::new(&config.log_dir));
    store.ensure_dir()?;
    tracing::info!(path = %store.dir().display(), "Log directory ready");

    // Business knowledge
    let knowledge = load_from_dir(&config.knowledge_dir, default_extractor());
    if knowledge.is_empty() {
        tracing::warn!(
            dir = %config.knowledge_dir.display(),
            "No business knowledge found, answers will rely on feedback escalation"
        );
    } else {
        tracing::info!(chars = knowledge.chars().count(), "Business knowledge loaded");
    }
    let system_prompt = build_system_prompt(&config.business_name, &knowledge);

    let agent = Agent::from_config(&config, ToolRegistry::new(store), system_prompt)?;
    if agent.is_ready() {
        tracing::info!(model = %agent.model_id(), "Provider configured");
    } else {
        tracing::warn!("No usable OPENAI_API_KEY. Chat requests will return the setup message.");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(agent))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Concierge listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
