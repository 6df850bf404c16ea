//! Limitly - roast chat server
//!
//! Serves a single chat session whose replies come from an LLM running a
//! fixed "savage roast" persona.

mod api;
mod config;
mod llm;
mod persona;
mod transcript;
mod turn_handler;

use api::{create_router, AppState};
use config::Config;
use llm::{GroqService, LoggingService};
use persona::Persona;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turn_handler::TurnHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "limitly=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration; a missing API key stops startup here
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    // One provider client for the whole process
    let groq = GroqService::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.request_timeout,
    )?;
    let llm = Arc::new(LoggingService::new(Arc::new(groq)));

    let persona = Persona::roast();
    tracing::info!(
        model = %persona.model,
        base_url = %config.base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "LLM client initialized"
    );

    let state = AppState::new(TurnHandler::new(llm, persona));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(state).layer(cors).layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Limitly listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
