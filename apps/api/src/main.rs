mod config;
mod errors;
mod ideation;
mod llm_client;
mod routes;
mod session;
mod state;
mod trends;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, API_KEY_VAR};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ideator API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::from_config(&config)?;
    if llm.has_credential() {
        info!("LLM client initialized (default model: {})", config.openai_model);
    } else {
        warn!("{API_KEY_VAR} is not set; idea generation will be refused until it is");
    }

    if !config.trends_csv.exists() {
        warn!(
            "Default trends catalog {} not found; sessions need an upload",
            config.trends_csv.display()
        );
    } else {
        info!("Default trends catalog: {}", config.trends_csv.display());
    }

    let state = AppState::new(config.clone(), Arc::new(llm));

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
