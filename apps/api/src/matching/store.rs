use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::models::match_result::{format_timestamp, MatchResult, MatchRow};

/// Persistence contract for match results. At most one row per
/// `(project_id, developer_id)`.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find(&self, project_id: i32, developer_id: i32) -> Result<Option<MatchResult>>;

    /// Inserts or replaces the row for the result's pair and returns what was stored.
    async fn save(&self, result: &MatchResult) -> Result<MatchResult>;

    async fn list_for_project(&self, project_id: i32) -> Result<Vec<MatchResult>>;
    async fn list_for_developer(&self, developer_id: i32) -> Result<Vec<MatchResult>>;
    async fn list_all(&self) -> Result<Vec<MatchResult>>;
}

const MATCH_COLUMNS: &str = "project_id, developer_id, technical_match, ai_technical_affinity, \
    ai_motivational_affinity, ai_experience_relevance, ai_comment, created_at";

/// Same columns with `created_at` read as text, whatever its column type.
const SELECT_COLUMNS: &str = "project_id, developer_id, technical_match, ai_technical_affinity, \
    ai_motivational_affinity, ai_experience_relevance, ai_comment, created_at::text AS created_at";

#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn find(&self, project_id: i32, developer_id: i32) -> Result<Option<MatchResult>> {
        Ok(sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM match_results WHERE project_id = $1 AND developer_id = $2"
        ))
        .bind(project_id)
        .bind(developer_id)
        .fetch_optional(&self.pool)
        .await?
        .map(MatchRow::into_result))
    }

    /// The unique key on `(project_id, developer_id)` makes concurrent saves
    /// of the same pair converge on one row.
    #[instrument(skip(self, result), fields(project_id = result.project_id, developer_id = result.developer_id))]
    async fn save(&self, result: &MatchResult) -> Result<MatchResult> {
        Ok(sqlx::query_as::<_, MatchRow>(&format!(
            r#"
            INSERT INTO match_results ({MATCH_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (project_id, developer_id) DO UPDATE SET
                technical_match = EXCLUDED.technical_match,
                ai_technical_affinity = EXCLUDED.ai_technical_affinity,
                ai_motivational_affinity = EXCLUDED.ai_motivational_affinity,
                ai_experience_relevance = EXCLUDED.ai_experience_relevance,
                ai_comment = EXCLUDED.ai_comment,
                created_at = EXCLUDED.created_at
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(result.project_id)
        .bind(result.developer_id)
        .bind(result.technical_match)
        .bind(result.ai_technical_affinity)
        .bind(result.ai_motivational_affinity)
        .bind(result.ai_experience_relevance)
        .bind(&result.ai_comment)
        .bind(format_timestamp(result.created_at))
        .fetch_one(&self.pool)
        .await?
        .into_result())
    }

    async fn list_for_project(&self, project_id: i32) -> Result<Vec<MatchResult>> {
        Ok(sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM match_results WHERE project_id = $1 ORDER BY developer_id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(MatchRow::into_result)
        .collect())
    }

    async fn list_for_developer(&self, developer_id: i32) -> Result<Vec<MatchResult>> {
        Ok(sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM match_results WHERE developer_id = $1 ORDER BY project_id"
        ))
        .bind(developer_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(MatchRow::into_result)
        .collect())
    }

    async fn list_all(&self) -> Result<Vec<MatchResult>> {
        Ok(sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM match_results ORDER BY project_id, developer_id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(MatchRow::into_result)
        .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Keyed on the pair like the real table; `save` replaces in place.
    #[derive(Default)]
    pub(crate) struct InMemoryMatchStore {
        rows: Mutex<Vec<MatchResult>>,
    }

    impl InMemoryMatchStore {
        pub(crate) fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MatchStore for InMemoryMatchStore {
        async fn find(&self, project_id: i32, developer_id: i32) -> Result<Option<MatchResult>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.project_id == project_id && r.developer_id == developer_id)
                .cloned())
        }

        async fn save(&self, result: &MatchResult) -> Result<MatchResult> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|r| r.project_id == result.project_id && r.developer_id == result.developer_id)
            {
                Some(existing) => existing.overwrite_with(result),
                None => rows.push(result.clone()),
            }
            Ok(result.clone())
        }

        async fn list_for_project(&self, project_id: i32) -> Result<Vec<MatchResult>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| r.project_id == project_id).cloned().collect())
        }

        async fn list_for_developer(&self, developer_id: i32) -> Result<Vec<MatchResult>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| r.developer_id == developer_id).cloned().collect())
        }

        async fn list_all(&self) -> Result<Vec<MatchResult>> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }
}
