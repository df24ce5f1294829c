use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub technology_count: usize,
}

/// POST /api/v1/technologies/refresh
///
/// Rebuilds the catalog cache. Call after the technologies table changes.
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    state.catalog.invalidate();
    let catalog = state.catalog.current().await?;
    info!("Catalog refreshed on request ({} technologies)", catalog.len());

    Ok(Json(RefreshResponse {
        technology_count: catalog.len(),
    }))
}
