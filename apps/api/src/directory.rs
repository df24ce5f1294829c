//! Read accessors for projects and developers. Both are owned by the CRUD
//! layer; this service never creates or deletes them.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::developer::{DeveloperProfile, DeveloperRow, Experience};
use crate::models::project::{ProjectRow, ProjectSpec};
use crate::models::technology::Technology;

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectSpec>>;
    async fn get_project(&self, id: i32) -> Result<Option<ProjectSpec>>;
    async fn list_developers(&self) -> Result<Vec<DeveloperProfile>>;
    async fn get_developer(&self, id: i32) -> Result<Option<DeveloperProfile>>;
}

#[derive(Clone)]
pub struct PgProfileDirectory {
    pool: PgPool,
}

impl PgProfileDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn required_technologies(&self, project_id: i32) -> Result<Vec<Technology>> {
        Ok(sqlx::query_as::<_, Technology>(
            r#"
            SELECT t.id, t.name, t.category
            FROM technologies t
            JOIN project_technologies pt ON pt.technology_id = t.id
            WHERE pt.project_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn skills(&self, developer_id: i32) -> Result<Vec<Technology>> {
        Ok(sqlx::query_as::<_, Technology>(
            r#"
            SELECT t.id, t.name, t.category
            FROM technologies t
            JOIN developer_skills ds ON ds.technology_id = t.id
            WHERE ds.developer_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(developer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn experiences(&self, developer_id: i32) -> Result<Vec<Experience>> {
        Ok(sqlx::query_as::<_, Experience>(
            "SELECT description, category FROM experiences WHERE developer_id = $1 ORDER BY id",
        )
        .bind(developer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn hydrate_project(&self, row: ProjectRow) -> Result<ProjectSpec> {
        let techs = self.required_technologies(row.id).await?;
        Ok(row.into_spec(techs))
    }

    async fn hydrate_developer(&self, row: DeveloperRow) -> Result<DeveloperProfile> {
        let skills = self.skills(row.id).await?;
        let experiences = self.experiences(row.id).await?;
        Ok(row.into_profile(skills, experiences))
    }
}

const PROJECT_COLUMNS: &str = "id, name, description, experience_level, project_type, status";
const DEVELOPER_COLUMNS: &str = "id, name, experience_level, motivation";

#[async_trait]
impl ProfileDirectory for PgProfileDirectory {
    async fn list_projects(&self) -> Result<Vec<ProjectSpec>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(self.hydrate_project(row).await?);
        }
        Ok(projects)
    }

    async fn get_project(&self, id: i32) -> Result<Option<ProjectSpec>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_developers(&self) -> Result<Vec<DeveloperProfile>> {
        let rows = sqlx::query_as::<_, DeveloperRow>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut developers = Vec::with_capacity(rows.len());
        for row in rows {
            developers.push(self.hydrate_developer(row).await?);
        }
        Ok(developers)
    }

    async fn get_developer(&self, id: i32) -> Result<Option<DeveloperProfile>> {
        let row = sqlx::query_as::<_, DeveloperRow>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_developer(row).await?)),
            None => Ok(None),
        }
    }
}
