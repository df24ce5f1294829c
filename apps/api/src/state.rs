use std::sync::Arc;

use crate::catalog::CatalogCache;
use crate::config::Config;
use crate::directory::ProfileDirectory;
use crate::llm_client::ModelClient;
use crate::matching::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub model: ModelClient,
    /// Read-through technology catalog, shared by every request.
    pub catalog: Arc<CatalogCache>,
    /// Projects and developers, read only.
    pub directory: Arc<dyn ProfileDirectory>,
    pub matches: Arc<dyn MatchStore>,
}
