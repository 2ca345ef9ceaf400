use crate::{
    research::state::ResearchState,
    types::{AppError, CreateResearchRequest, CreateResearchResponse, ResearchSummary, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use uuid::Uuid;

/// Identifiers that are not UUIDs cannot name a run
fn parse_research_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Research {} not found", raw)))
}

/// Start a research run in the background
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = CreateResearchRequest,
    responses(
        (status = 200, description = "Research started", body = CreateResearchResponse),
        (status = 400, description = "Blank topic")
    ),
    tag = "research"
)]
pub async fn create_research(
    State(state): State<AppState>,
    Json(payload): Json<CreateResearchRequest>,
) -> Result<Json<CreateResearchResponse>> {
    let response = state
        .service
        .create_research(&payload.topic, payload.customization)?;
    Ok(Json(response))
}

/// List all runs, newest first
#[utoipa::path(
    get,
    path = "/api/research",
    responses(
        (status = 200, description = "Run summaries", body = [ResearchSummary])
    ),
    tag = "research"
)]
pub async fn list_research(State(state): State<AppState>) -> Json<Vec<ResearchSummary>> {
    Json(state.service.list_research())
}

/// Poll the full state of a run
#[utoipa::path(
    get,
    path = "/api/research/{research_id}",
    params(("research_id" = String, Path, description = "Research run identifier")),
    responses(
        (status = 200, description = "Current research state"),
        (status = 404, description = "Unknown research run")
    ),
    tag = "research"
)]
pub async fn get_research(
    State(state): State<AppState>,
    Path(research_id): Path<String>,
) -> Result<Json<ResearchState>> {
    let research_id = parse_research_id(&research_id)?;
    Ok(Json(state.service.get_research(&research_id)?))
}

/// Serve the generated HTML dashboard
#[utoipa::path(
    get,
    path = "/api/research/{research_id}/report",
    params(("research_id" = String, Path, description = "Research run identifier")),
    responses(
        (status = 200, description = "HTML dashboard", body = String, content_type = "text/html"),
        (status = 404, description = "Unknown run or no report yet")
    ),
    tag = "research"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(research_id): Path<String>,
) -> Result<Html<String>> {
    let research_id = parse_research_id(&research_id)?;
    let run = state.service.get_research(&research_id)?;

    run.html_output.map(Html).ok_or_else(|| {
        AppError::NotFound(format!("Research {} has no report yet", research_id))
    })
}
