mod coach;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod progress;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::{AppState, SessionRegistry};
use crate::store::mirror::MirroredStore;
use crate::store::postgres::PgDocumentStore;
use crate::store::DocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the document schema
    let db = create_pool(&config.database_url).await?;
    let postgres = PgDocumentStore::new(db);
    postgres.ensure_schema().await?;

    // Initialize the Redis mirror
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    let store: Arc<dyn DocumentStore> =
        Arc::new(MirroredStore::new(Arc::new(postgres), redis));

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_keys.clone());
    info!(
        "LLM client initialized (model: {}, {} key(s))",
        llm_client::MODEL,
        config.gemini_api_keys.len()
    );

    // Build app state
    let state = AppState {
        sessions: SessionRegistry::new(Arc::clone(&store)),
        store,
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
