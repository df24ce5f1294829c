//! Match Aggregator: merges the technical score and the model's semantic
//! analysis into a `MatchResult`, and persists it idempotently.
//!
//! Flow per pair: technical::score → analysis prompt → model → interpreter
//! (or heuristic analysis on model failure) → upsert.

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::TechnologyCatalog;
use crate::directory::ProfileDirectory;
use crate::errors::AppError;
use crate::interpreter::{
    heuristic_analysis, interpret_analysis, AnalysisContext, AnalysisResult,
};
use crate::llm_client::prompts::{render_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{ModelClient, ModelError};
use crate::matching::prompts::{ANALYSIS_PROMPT_TEMPLATE, NO_EXPERIENCES};
use crate::matching::ranking::{rank, RankedMatch};
use crate::matching::store::MatchStore;
use crate::matching::technical;
use crate::models::developer::DeveloperProfile;
use crate::models::match_result::MatchResult;
use crate::models::project::ProjectSpec;

pub struct MatchAggregator<'a> {
    model: &'a ModelClient,
    catalog: &'a TechnologyCatalog,
    store: &'a dyn MatchStore,
}

impl<'a> MatchAggregator<'a> {
    pub fn new(model: &'a ModelClient, catalog: &'a TechnologyCatalog, store: &'a dyn MatchStore) -> Self {
        Self {
            model,
            catalog,
            store,
        }
    }

    /// Scores one pair. Model failures fall back to a heuristic analysis, so
    /// this always produces a result.
    pub async fn evaluate(&self, project: &ProjectSpec, developer: &DeveloperProfile) -> MatchResult {
        let technical_match =
            technical::score(&project.required_technologies, &developer.skills);

        let ctx = AnalysisContext {
            catalog: self.catalog,
            project_description: &project.description,
            developer_skills: &developer.skills,
        };
        let analysis = match self.model.generate(&build_analysis_prompt(project, developer)).await {
            Ok(raw) => interpret_analysis(&raw, &ctx),
            Err(e) => {
                warn!(
                    "Model call failed for project {} / developer {}: {e}",
                    project.id, developer.id
                );
                heuristic_analysis(&ctx, failure_comment(&e))
            }
        };

        merge(project.id, developer.id, technical_match, analysis)
    }

    /// Inserts the pair's result, or overwrites the existing row's scores,
    /// comment and timestamp in place.
    pub async fn upsert(&self, result: MatchResult) -> anyhow::Result<MatchResult> {
        let to_save = match self.store.find(result.project_id, result.developer_id).await? {
            Some(mut existing) => {
                existing.overwrite_with(&result);
                info!(
                    "Updating match project={} developer={}",
                    result.project_id, result.developer_id
                );
                existing
            }
            None => {
                info!(
                    "Saving new match project={} developer={}",
                    result.project_id, result.developer_id
                );
                result
            }
        };
        self.store.save(&to_save).await
    }

    /// Evaluates every developer against one project, saves each result and
    /// returns them ranked.
    pub async fn evaluate_project(
        &self,
        directory: &dyn ProfileDirectory,
        project_id: i32,
    ) -> Result<Vec<RankedMatch>, AppError> {
        let project = directory
            .get_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project {project_id}")))?;
        let developers = directory.list_developers().await?;

        info!(
            "Evaluating project {} '{}' against {} developers",
            project.id,
            project.name,
            developers.len()
        );

        let mut saved = Vec::with_capacity(developers.len());
        for developer in &developers {
            let result = self.evaluate(&project, developer).await;
            saved.push(self.upsert(result).await?);
        }

        Ok(rank(saved))
    }
}

fn merge(
    project_id: i32,
    developer_id: i32,
    technical_match: f64,
    analysis: AnalysisResult,
) -> MatchResult {
    MatchResult {
        project_id,
        developer_id,
        technical_match,
        ai_technical_affinity: analysis.technical_affinity,
        ai_motivational_affinity: analysis.motivational_affinity,
        ai_experience_relevance: analysis.experience_relevance,
        ai_comment: analysis.comment,
        created_at: Utc::now(),
    }
}

fn failure_comment(error: &ModelError) -> String {
    if error.is_timeout() {
        "The AI analysis timed out. Scores were estimated from the project description."
            .to_string()
    } else {
        format!(
            "The AI analysis was unavailable ({error}). Scores were estimated from the project description."
        )
    }
}

pub fn build_analysis_prompt(project: &ProjectSpec, developer: &DeveloperProfile) -> String {
    let required: Vec<&str> = project
        .required_technologies
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    let experiences = if developer.experiences.is_empty() {
        NO_EXPERIENCES.to_string()
    } else {
        developer
            .experiences
            .iter()
            .map(|e| format!("- {}", e.description.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let required = required.join(", ");
    let skills = developer.skill_names().join(", ");

    render_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("required_technologies", required.as_str()),
            ("developer_skills", skills.as_str()),
            ("developer_level", developer.experience_level.as_str()),
            ("experiences", experiences.as_str()),
            ("developer_motivation", developer.motivation.trim()),
            ("developer_name", developer.name.as_str()),
            ("project_name", project.name.as_str()),
            ("project_description", project.description.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use crate::catalog::tests::sample_catalog;
    use crate::directory::tests::FixedDirectory;
    use crate::llm_client::tests::{client_with, ScriptedTransport, StalledTransport};
    use crate::matching::store::tests::InMemoryMatchStore;
    use crate::models::developer::Experience;
    use crate::models::project::{ExperienceLevel, ProjectType};
    use crate::models::technology::Technology;

    fn java_project() -> ProjectSpec {
        ProjectSpec {
            id: 1,
            name: "Inventory".to_string(),
            description: "Stock control in Java with PostgreSQL".to_string(),
            experience_level: ExperienceLevel::Intermediate,
            project_type: ProjectType::Web,
            status: "open".to_string(),
            required_technologies: vec![
                Technology::new(1, "Java", Some("backend")),
                Technology::new(3, "PostgreSQL", Some("database")),
            ],
        }
    }

    fn developer(id: i32) -> DeveloperProfile {
        DeveloperProfile {
            id,
            name: format!("Dev {id}"),
            experience_level: ExperienceLevel::Advanced,
            motivation: "I like backend work".to_string(),
            skills: vec![
                Technology::new(1, "Java", Some("backend")),
                Technology::new(13, "React", Some("frontend")),
            ],
            experiences: vec![Experience {
                description: "Built a warehouse system".to_string(),
                category: Some("work".to_string()),
            }],
        }
    }

    #[test]
    fn test_analysis_prompt_contents() {
        let prompt = build_analysis_prompt(&java_project(), &developer(7));
        assert!(prompt.contains("Name: Inventory"));
        assert!(prompt.contains("Required technologies: Java, PostgreSQL"));
        assert!(prompt.contains("Skills: Java, React"));
        assert!(prompt.contains("Experience level: Advanced"));
        assert!(prompt.contains("Motivation: I like backend work"));
        assert!(prompt.contains("Previous Experiences:\n- Built a warehouse system"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_profile_text_is_not_expanded_as_placeholders() {
        let mut dev = developer(7);
        dev.motivation = "Anything like {project_description}".to_string();
        let prompt = build_analysis_prompt(&java_project(), &dev);
        assert!(prompt.contains("Motivation: Anything like {project_description}"));
        assert_eq!(prompt.matches("Stock control in Java").count(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_merges_scores() {
        let catalog = sample_catalog();
        let store = InMemoryMatchStore::default();
        let client = client_with(vec![ScriptedTransport::ok(
            r#"{"technical_affinity": 80, "motivational_affinity": 70, "experience_relevance": 60, "comment": "Good fit"}"#,
        )]);
        let aggregator = MatchAggregator::new(&client, &catalog, &store);

        let result = aggregator.evaluate(&java_project(), &developer(7)).await;
        assert_eq!(result.project_id, 1);
        assert_eq!(result.developer_id, 7);
        assert_eq!(result.technical_match, 50.0);
        assert_eq!(result.ai_technical_affinity, 80);
        assert_eq!(result.ai_motivational_affinity, 70);
        assert_eq!(result.ai_experience_relevance, 60);
        assert_eq!(result.ai_comment, "Good fit");
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_survives_timeout() {
        let catalog = sample_catalog();
        let store = InMemoryMatchStore::default();
        let client = client_with(vec![Arc::new(StalledTransport)]);
        let aggregator = MatchAggregator::new(&client, &catalog, &store);

        let result = aggregator.evaluate(&java_project(), &developer(7)).await;
        assert_eq!(result.technical_match, 50.0);
        // Description names Java and PostgreSQL; the developer has Java.
        assert_eq!(result.ai_technical_affinity, 50);
        assert_eq!(result.ai_motivational_affinity, 0);
        assert!(result.ai_comment.contains("timed out"));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_pair() {
        let catalog = sample_catalog();
        let store = InMemoryMatchStore::default();
        let client = client_with(vec![]);
        let aggregator = MatchAggregator::new(&client, &catalog, &store);

        let first = merge(1, 7, 50.0, AnalysisResult {
            technical_affinity: 10,
            motivational_affinity: 10,
            experience_relevance: 10,
            comment: "first".to_string(),
        });
        let second = merge(1, 7, 100.0, AnalysisResult {
            technical_affinity: 90,
            motivational_affinity: 80,
            experience_relevance: 70,
            comment: "second".to_string(),
        });

        aggregator.upsert(first).await.unwrap();
        aggregator.upsert(second.clone()).await.unwrap();
        aggregator.upsert(second.clone()).await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.find(1, 7).await.unwrap().unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test]
    async fn test_evaluate_project_saves_and_ranks() {
        let catalog = sample_catalog();
        let store = InMemoryMatchStore::default();
        let transport = ScriptedTransport::ok(
            r#"{"technical_affinity": 50, "motivational_affinity": 50, "experience_relevance": 50, "comment": "ok"}"#,
        );
        let client = client_with(vec![transport.clone()]);
        let aggregator = MatchAggregator::new(&client, &catalog, &store);

        let mut full_stack = developer(2);
        full_stack
            .skills
            .push(Technology::new(3, "PostgreSQL", Some("database")));
        let mut no_skills = developer(3);
        no_skills.skills.clear();
        let directory = FixedDirectory {
            projects: vec![java_project()],
            developers: vec![no_skills, developer(1), full_stack],
        };

        let ranked = aggregator.evaluate_project(&directory, 1).await.unwrap();
        let order: Vec<i32> = ranked.iter().map(|r| r.result.developer_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(store.len(), 3);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

        // Re-evaluating keeps one row per pair.
        aggregator.evaluate_project(&directory, 1).await.unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_evaluate_unknown_project() {
        let catalog = sample_catalog();
        let store = InMemoryMatchStore::default();
        let client = client_with(vec![]);
        let aggregator = MatchAggregator::new(&client, &catalog, &store);
        let directory = FixedDirectory {
            projects: vec![],
            developers: vec![developer(1)],
        };

        let err = aggregator.evaluate_project(&directory, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
