pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{assistant, catalog, matching};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Project assistant
        .route(
            "/api/v1/assistant/analyze",
            post(assistant::handlers::handle_analyze),
        )
        // Matching
        .route(
            "/api/v1/matches/evaluate",
            post(matching::handlers::handle_evaluate),
        )
        .route(
            "/api/v1/matches/projects",
            get(matching::handlers::handle_project_summaries),
        )
        .route(
            "/api/v1/matches/stats",
            get(matching::handlers::handle_statistics),
        )
        .route(
            "/api/v1/projects/:id/matches",
            get(matching::handlers::handle_project_matches),
        )
        .route(
            "/api/v1/developers/:id/matches",
            get(matching::handlers::handle_developer_matches),
        )
        // Technology catalog
        .route(
            "/api/v1/technologies/refresh",
            post(catalog::handlers::handle_refresh),
        )
        .with_state(state)
}
