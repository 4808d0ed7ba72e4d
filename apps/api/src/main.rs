mod ai_client;
mod ats;
mod config;
mod db;
mod errors;
mod models;
mod resume;
mod routes;
mod state;
mod subscription;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiServiceClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::subscription::store::PgSubscriptionStore;
use crate::subscription::SubscriptionService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Helper API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the subscription store on top of it
    let db = create_pool(&config.database_url).await?;
    let subscriptions = SubscriptionService::new(Arc::new(PgSubscriptionStore::new(db)));

    // Initialize AI service client
    let ai = AiServiceClient::new(&config.aiservice_base_url)?;
    info!("AI service client initialized ({})", ai.adapt_url());

    let state = AppState {
        subscriptions,
        ai,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
