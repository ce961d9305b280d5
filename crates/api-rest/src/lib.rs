//! # API REST
//!
//! REST API for the Medical Note Structurer.
//!
//! Handles:
//! - HTTP endpoints with axum (`POST /extract/`, `GET /`, `GET /health`)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (form decoding, JSON serialisation, CORS)
//!
//! The router is built here rather than in the binary so tests can drive it
//! directly with `tower::ServiceExt::oneshot`. Uses `api-shared` for wire
//! types and `mns-core` for the structuring service.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{BackendStatus, ExtractForm, ExtractRes, HealthRes, RootRes, ServiceStatus};
use mns_core::StructurerService;

pub const ROOT_MESSAGE: &str = "Medical Note Structurer API is running";

/// Application state shared across REST API handlers.
///
/// Holds the structuring service; no mutable state is coordinated — the
/// service is read-only after startup and each request is independent.
#[derive(Clone)]
pub struct AppState {
    service: Arc<StructurerService>,
}

impl AppState {
    pub fn new(service: Arc<StructurerService>) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(extract, root, health),
    components(schemas(
        ExtractForm,
        ExtractRes,
        HealthRes,
        RootRes,
        ServiceStatus,
        BackendStatus
    ))
)]
struct ApiDoc;

/// Build the REST router: extraction endpoints, Swagger UI, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/extract/", post(extract))
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/extract/",
    request_body(content = ExtractForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Extraction result wrapper", body = ExtractRes)
    )
)]
/// Extract structured fields from a clinical note
///
/// Prompts the generation backend with the note and returns the resulting
/// text in the `structured` field. The payload is always syntactically valid
/// JSON: the model's raw output when it parses, the fallback object (every
/// field `"Unable to parse"`) on any backend failure. This endpoint never
/// returns an error status for extraction failures.
#[axum::debug_handler]
async fn extract(State(state): State<AppState>, Form(req): Form<ExtractForm>) -> Json<ExtractRes> {
    let structured = state.service.extract(&req.note).await;
    Json(ExtractRes { structured })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootRes)
    )
)]
/// Root banner endpoint
///
/// Confirms the API is running; carries no backend status.
async fn root() -> Json<RootRes> {
    Json(RootRes {
        message: ROOT_MESSAGE.into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and backend health", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Probes the generation backend's model-listing endpoint. Healthy/connected
/// iff that probe answers HTTP 200; any other status or transport failure
/// reads as unhealthy/disconnected.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    if state.service.backend_reachable().await {
        Json(HealthRes::connected())
    } else {
        Json(HealthRes::disconnected())
    }
}
