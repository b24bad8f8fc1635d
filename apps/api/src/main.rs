mod config;
mod db;
mod embedding;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingProvider, Readiness};
use crate::db::create_pool;
use crate::embedding::{Embedder, HashingEmbedder, OpenAiEmbedder};
use crate::generation::context_builder::ContextBudget;
use crate::generation::dispatcher::GenerationDispatcher;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::store::ExampleStore;

#[tokio::main]
async fn main() -> Result<()> {
    let readiness = Config::check()?;
    let log_level = match &readiness {
        Readiness::Ready(config) => config.rust_log.clone(),
        Readiness::MissingConfig(_) => "info".to_string(),
    };

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Nothing below may be constructed without both provider keys.
    let config = match readiness {
        Readiness::Ready(config) => config,
        Readiness::MissingConfig(keys) => {
            error!("Missing required configuration: {}", keys.join(", "));
            anyhow::bail!(
                "Set {} in the environment or a .env file before starting",
                keys.join(" and ")
            );
        }
    };

    info!("Starting Scriptsmith v{}", env!("CARGO_PKG_VERSION"));

    // Example store
    let pool = create_pool(&config.store_path).await?;
    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(
            config.openai_api_key.clone(),
            config.embedding_model.clone(),
        )),
        EmbeddingProvider::Local => Arc::new(HashingEmbedder::default()),
    };
    info!("Embedder initialized ({})", embedder.name());
    let store = ExampleStore::new(pool, embedder);

    // Generation backends
    let dispatcher = GenerationDispatcher::from_config(&config);
    info!(
        "Generation backends: {}",
        dispatcher
            .catalog()
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Session results
    let sessions = match &config.redis_url {
        Some(url) => SessionStore::redis(redis::Client::open(url.as_str())?, config.session_ttl_secs),
        None => SessionStore::in_memory(config.session_ttl_secs),
    };
    info!("Session store: {}", sessions.backend_name());

    let state = AppState {
        store,
        dispatcher,
        sessions,
        budget: ContextBudget::default(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a hosted frontend exists

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
