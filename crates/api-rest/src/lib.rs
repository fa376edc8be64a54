//! # API REST
//!
//! REST API implementation for medrec.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

use axum::{extract::State, http::StatusCode, response::Json, routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{convert, pb, HealthService};
use medrec_core::{AnalysisRequest, DiagnosisError, DiagnosisService};

/// Application state for the REST API server
///
/// Holds the loaded diagnosis service. Cloning is cheap; the knowledge base and model are
/// shared behind `Arc`s.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: DiagnosisService,
}

impl AppState {
    pub fn new(service: DiagnosisService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_symptoms, list_diseases, analyse),
    components(schemas(
        pb::HealthRes,
        pb::Symptom,
        pb::SymptomGroup,
        pb::ListSymptomsRes,
        pb::Disease,
        pb::ListDiseasesRes,
        pb::AnalyseReq,
        pb::AnalyseRes,
        pb::Report,
    ))
)]
pub struct ApiDoc;

/// Build the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/symptoms", get(list_symptoms))
        .route("/diseases", get(list_diseases))
        .route("/analyse", post(analyse))
        .merge(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error onto a status code and the short message safe to show a user.
///
/// The full error is logged; only `DiagnosisError::user_message` leaves the process.
fn error_response(err: &DiagnosisError) -> (StatusCode, String) {
    let status = if err.is_client_error() {
        tracing::warn!("Rejected analysis request: {}", err);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Analysis failed: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.user_message())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// The server only starts once the knowledge base and model have loaded, so answering at all
/// means the service is usable.
///
/// # Returns
/// * `Json<pb::HealthRes>` - Health status response containing service status
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/symptoms",
    responses(
        (status = 200, description = "Recognised symptoms in feature-position order, plus browsing groups", body = pb::ListSymptomsRes)
    )
)]
/// List every recognised symptom with its feature position and display name, followed by the
/// symptom groups used to browse them.
#[axum::debug_handler]
async fn list_symptoms(State(state): State<AppState>) -> Json<pb::ListSymptomsRes> {
    Json(convert::list_symptoms_res(
        state.service.vocabulary(),
        state.service.groups(),
    ))
}

#[utoipa::path(
    get,
    path = "/diseases",
    responses(
        (status = 200, description = "Diseases the classifier can predict", body = pb::ListDiseasesRes)
    )
)]
/// List the disease catalog in label order.
#[axum::debug_handler]
async fn list_diseases(State(state): State<AppState>) -> Json<pb::ListDiseasesRes> {
    Json(convert::list_diseases_res(state.service.catalog()))
}

#[utoipa::path(
    post,
    path = "/analyse",
    request_body = pb::AnalyseReq,
    responses(
        (status = 200, description = "Predicted disease and its report", body = pb::AnalyseRes),
        (status = 400, description = "Empty selection or unrecognised symptom"),
        (status = 500, description = "Internal server error")
    )
)]
/// Analyse a set of symptoms
///
/// Encodes the selected symptoms, runs the classifier and assembles the report for the
/// predicted disease. Every response carries the safety notice.
///
/// # Arguments
/// * `req` - Request body listing the selected symptom names
///
/// # Returns
/// * `Ok(Json<pb::AnalyseRes>)` - Request id, predicted label, report and safety notice
/// * `Err((StatusCode, String))` - Short user-facing message
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - no symptom was selected, or
/// - a symptom is not in the vocabulary.
///
/// Returns `500 Internal Server Error` for classifier or catalog failures.
#[axum::debug_handler]
async fn analyse(
    State(state): State<AppState>,
    Json(req): Json<pb::AnalyseReq>,
) -> Result<Json<pb::AnalyseRes>, (StatusCode, String)> {
    let request_id = uuid::Uuid::new_v4().simple().to_string();
    tracing::info!("REST analyse request {}", request_id);

    let request = AnalysisRequest::new(req.symptoms).map_err(|e| error_response(&e))?;
    let diagnosis = state
        .service
        .analyse(&request)
        .map_err(|e| error_response(&e))?;

    Ok(Json(convert::analyse_res(request_id, diagnosis)))
}
