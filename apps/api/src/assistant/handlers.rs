//! Axum route handlers for the project assistant.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assistant::session::{ConversationTurn, RefinementSession, RefinementTurn, SessionState};
use crate::errors::AppError;
use crate::interpreter::ProjectDraft;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// The current user message. On the first turn, the project description.
    pub description: String,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub phase: SessionState,
    pub data: ProjectDraft,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assistant/analyze
///
/// Runs one refinement turn. Model failures still return 200 with a
/// heuristic draft whose `error` field explains what happened.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let catalog = state.catalog.current().await?;
    let session = RefinementSession::new(&state.model, &catalog, state.config.history_window);
    let outcome = session
        .refine(RefinementTurn {
            message: &request.description,
            goals: request.goals.as_deref(),
            history: &request.history,
        })
        .await;

    Ok(Json(AnalyzeResponse {
        success: true,
        phase: outcome.phase,
        data: outcome.draft,
    }))
}
