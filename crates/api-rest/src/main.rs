//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `medrec-run` binary runs both gRPC and REST
//! concurrently.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use api_shared::env::core_config_from_env;
use medrec_core::DiagnosisService;

/// Main entry point for the medrec REST API server
///
/// Loads the knowledge base and model, then serves on the configured address
/// (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `MEDREC_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDREC_DATA_DIR`, `MEDREC_MODEL_PATH`, `MEDREC_SYMPTOMS_FILE`, `MEDREC_DISEASES_FILE`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the data directory, tables, vocabulary, catalog or model fail to load,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medrec_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDREC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = core_config_from_env()?;
    let service = DiagnosisService::load(&cfg)?;

    tracing::info!("-- Starting medrec REST API on {}", addr);

    let app = router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
