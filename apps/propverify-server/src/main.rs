//! PropVerify Server
//!
//! Receives the extracted text of uploaded property documents (deeds,
//! surveys, tax records), asks a local LLM for a structured verification
//! report and returns it to the web UI. Provides:
//!
//! - `POST /api/analyze` - document analysis
//! - `GET /health` - health check
//! - the built web UI, when `--static-dir` is given
//!
//! ## Architecture
//!
//! The request text is sealed into an AES-256-GCM envelope on receipt and
//! opened only inside the analysis step. The LLM is any Ollama-compatible
//! `/api/generate` endpoint. Nothing is persisted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shared_crypto::EnvelopeCodec;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verification_engine::{OllamaClient, VerificationEngine};

mod api;
mod config;
mod error;

use config::{Args, Config};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let collaborator = Arc::new(OllamaClient::new(&config.ollama_url, &config.model));
        let codec = EnvelopeCodec::from_passphrase(&config.secret);
        let engine = VerificationEngine::new(codec, collaborator).with_timeout(config.llm_timeout);

        Self {
            engine: Arc::new(engine),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting PropVerify server on {}", config.addr);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit.into())
            .burst_size(config.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    let state = AppState::from_config(&config);

    // Configure CORS for a UI served from a separate dev server
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state, config.static_dir.as_deref()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!("Server listening on http://{}", config.addr);
    info!("LLM endpoint: {} (model {})", config.ollama_url, config.model);
    info!("LLM timeout: {}ms", config.llm_timeout.as_millis());
    match &config.static_dir {
        Some(dir) => info!("Serving web UI from {}", dir.display()),
        None => info!("No static directory configured; serving API only"),
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
