use std::net::SocketAddr;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{MedrecService, auth_interceptor};
use api_rest::{AppState, router};
use api_shared::FILE_DESCRIPTOR_SET;
use api_shared::auth::ApiKey;
use api_shared::env::{core_config_from_env, flag_enabled};
use api_shared::pb::medrec_server::MedrecServer;
use medrec_core::DiagnosisService;

/// Main entry point for the medrec application
///
/// Loads the knowledge base and model once, then starts both servers concurrently over the
/// same `DiagnosisService`:
/// - gRPC server on port 50051 (configurable via MEDREC_ADDR)
/// - REST server on port 3000 (configurable via MEDREC_REST_ADDR)
///
/// The gRPC server requires authentication via x-api-key header.
/// The REST server provides open access.
///
/// # Environment Variables
/// - `MEDREC_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `MEDREC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDREC_DATA_DIR`: Directory holding the reference tables and model (default: `data`)
/// - `MEDREC_MODEL_PATH`, `MEDREC_SYMPTOMS_FILE`, `MEDREC_DISEASES_FILE`: optional overrides
/// - `MEDREC_ENABLE_REFLECTION`: `true` to serve gRPC reflection
/// - `API_KEY`: API key for gRPC authentication
///
/// # Returns
/// * `Ok(())` - If servers start and run successfully
/// * `Err(anyhow::Error)` - If startup, data loading or either server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medrec_run=info".parse()?)
                .add_directive("medrec_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let grpc_addr: SocketAddr = std::env::var("MEDREC_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;
    let rest_addr = std::env::var("MEDREC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let api_key = ApiKey::from_env()
        .ok_or_else(|| anyhow::anyhow!("API_KEY must be set to serve gRPC"))?;

    let cfg = core_config_from_env()?;
    let service = DiagnosisService::load(&cfg)?;

    tracing::info!("++ Starting medrec gRPC on {}", grpc_addr);
    tracing::info!("++ Starting medrec REST on {}", rest_addr);

    // Start REST server
    let rest_app = router(AppState::new(service.clone()));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_server = async move { axum::serve(listener, rest_app).await };

    // Start gRPC server
    let mut grpc_builder = Server::builder().add_service(MedrecServer::with_interceptor(
        MedrecService::new(service),
        auth_interceptor(api_key),
    ));
    if flag_enabled("MEDREC_ENABLE_REFLECTION") {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        grpc_builder = grpc_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    }
    let grpc_server = grpc_builder.serve(grpc_addr);

    // Run both
    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result?;
    grpc_result?;

    Ok(())
}
