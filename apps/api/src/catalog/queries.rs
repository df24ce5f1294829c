use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::{CatalogReader, MatchMode};
use crate::models::technology::Technology;

/// Catalog reader over the `technologies` table.
#[derive(Clone)]
pub struct PgCatalogReader {
    pool: PgPool,
}

impl PgCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn list_all(&self) -> Result<Vec<Technology>> {
        Ok(sqlx::query_as::<_, Technology>(
            "SELECT id, name, category FROM technologies ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_name(&self, name: &str, mode: MatchMode) -> Result<Option<Technology>> {
        let row = match mode {
            MatchMode::Exact => {
                sqlx::query_as::<_, Technology>(
                    "SELECT id, name, category FROM technologies WHERE LOWER(name) = LOWER($1) LIMIT 1",
                )
                .bind(name)
                .fetch_optional(&self.pool)
                .await?
            }
            MatchMode::Substring => {
                sqlx::query_as::<_, Technology>(
                    r#"
                    SELECT id, name, category FROM technologies
                    WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
                    ORDER BY name
                    LIMIT 1
                    "#,
                )
                .bind(escape_like(name))
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(row)
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
