//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # API Endpoints
//!
//! ## Research (`/api/research`)
//! - `POST /api/research` - Start a research run in the background
//! - `GET /api/research` - List runs, newest first
//! - `GET /api/research/{research_id}` - Poll the full state of a run
//! - `GET /api/research/{research_id}/report` - Rendered HTML dashboard
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available at
//! `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::research::state::ResearchStatus;
use crate::types::{CreateResearchRequest, CreateResearchResponse, HealthResponse, ResearchSummary};
use utoipa::OpenApi;

/// OpenAPI description of the HTTP surface
#[derive(OpenApi)]
#[openapi(
    info(title = "Agentic Research Studio API"),
    paths(
        handlers::health::health,
        handlers::research::create_research,
        handlers::research::list_research,
        handlers::research::get_research,
        handlers::research::get_report,
    ),
    components(schemas(
        CreateResearchRequest,
        CreateResearchResponse,
        ResearchSummary,
        ResearchStatus,
        HealthResponse,
    )),
    tags(
        (name = "research", description = "Research run lifecycle"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(not(feature = "swagger-ui"))]
pub(crate) async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
