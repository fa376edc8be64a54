use std::net::SocketAddr;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{auth_interceptor, pb::medrec_server::MedrecServer, MedrecService};
use api_shared::auth::ApiKey;
use api_shared::env::{core_config_from_env, flag_enabled};
use api_shared::FILE_DESCRIPTOR_SET;
use medrec_core::DiagnosisService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_grpc=info".parse()?)
                .add_directive("medrec_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("MEDREC_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;

    let api_key = ApiKey::from_env()
        .ok_or_else(|| anyhow::anyhow!("API_KEY must be set to serve gRPC"))?;

    let cfg = core_config_from_env()?;
    let svc = MedrecService::new(DiagnosisService::load(&cfg)?);

    tracing::info!("-- Starting medrec gRPC on {}", addr);

    let mut server_builder = Server::builder().add_service(MedrecServer::with_interceptor(
        svc,
        auth_interceptor(api_key),
    ));

    if flag_enabled("MEDREC_ENABLE_REFLECTION") {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
