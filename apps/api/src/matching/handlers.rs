//! Axum route handlers for matching.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::aggregator::MatchAggregator;
use crate::matching::ranking::{
    project_aggregates, rank, statistics, MatchStatistics, ProjectMatchSummary, RankedMatch,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub project_id: i32,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<RankedMatch>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummariesResponse {
    pub projects: Vec<ProjectMatchSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches/evaluate
///
/// Scores every developer against the project, saves each pair and returns
/// them best first. Runs one model call per developer, sequentially.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<MatchListResponse>, AppError> {
    let catalog = state.catalog.current().await?;
    let aggregator = MatchAggregator::new(&state.model, &catalog, state.matches.as_ref());

    let matches = aggregator
        .evaluate_project(state.directory.as_ref(), request.project_id)
        .await?;

    Ok(Json(MatchListResponse { matches }))
}

/// GET /api/v1/matches/projects
pub async fn handle_project_summaries(
    State(state): State<AppState>,
) -> Result<Json<ProjectSummariesResponse>, AppError> {
    let projects = state.directory.list_projects().await?;
    let results = state.matches.list_all().await?;

    Ok(Json(ProjectSummariesResponse {
        projects: project_aggregates(projects, &results),
    }))
}

/// GET /api/v1/matches/stats
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<MatchStatistics>, AppError> {
    let results = state.matches.list_all().await?;
    let projects = state.directory.list_projects().await?;
    let developers = state.directory.list_developers().await?;

    Ok(Json(statistics(&results, &projects, &developers)))
}

/// GET /api/v1/projects/:id/matches
pub async fn handle_project_matches(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<MatchListResponse>, AppError> {
    if state.directory.get_project(project_id).await?.is_none() {
        return Err(AppError::NotFound(format!("project {project_id}")));
    }
    let results = state.matches.list_for_project(project_id).await?;

    Ok(Json(MatchListResponse {
        matches: rank(results),
    }))
}

/// GET /api/v1/developers/:id/matches
pub async fn handle_developer_matches(
    State(state): State<AppState>,
    Path(developer_id): Path<i32>,
) -> Result<Json<MatchListResponse>, AppError> {
    if state.directory.get_developer(developer_id).await?.is_none() {
        return Err(AppError::NotFound(format!("developer {developer_id}")));
    }
    let results = state.matches.list_for_developer(developer_id).await?;

    Ok(Json(MatchListResponse {
        matches: rank(results),
    }))
}
