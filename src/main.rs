//! Runner binary for the Medical Note Structurer REST API.
//!
//! Resolves configuration from the environment once at startup, builds the
//! core structuring service, and serves the REST router.
//!
//! # Environment Variables
//! - `MNS_REST_ADDR`: server address (default: "0.0.0.0:8000")
//! - `MNS_OLLAMA_URL`: generation backend base URL (default: "http://localhost:11434")
//! - `MNS_MODEL`: model name sent to the backend (default: "llama2")
//! - `MNS_GENERATE_TIMEOUT_SECS`: generation request timeout (default: 60)
//! - `MNS_TAGS_TIMEOUT_SECS`: health probe timeout (default: 5)

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use mns_core::{CoreConfig, StructurerService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("mns=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MNS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let cfg = CoreConfig::resolve(
        std::env::var("MNS_OLLAMA_URL").ok(),
        std::env::var("MNS_MODEL").ok(),
        std::env::var("MNS_GENERATE_TIMEOUT_SECS").ok(),
        std::env::var("MNS_TAGS_TIMEOUT_SECS").ok(),
    )?;

    tracing::info!("-- Starting MNS REST API on {}", addr);
    tracing::info!(
        "-- Generation backend: {} (model: {})",
        cfg.ollama_base_url(),
        cfg.model()
    );

    let service = Arc::new(StructurerService::from_config(&cfg)?);
    let app = api_rest::build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
