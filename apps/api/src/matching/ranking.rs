//! Read-side views over saved matches: ranked lists, the per-project
//! aggregate, and overall statistics. Everything here is pure.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::developer::DeveloperProfile;
use crate::models::match_result::MatchResult;
use crate::models::project::ProjectSpec;

const TOP_TECHNICAL_MATCHES: usize = 3;
const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub composite_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectMatchSummary {
    pub project: ProjectSpec,
    pub match_count: usize,
    /// Mean composite score of the project's matches; 0 without matches.
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopTechnicalMatch {
    pub project_id: i32,
    pub developer_id: i32,
    pub technical_match: f64,
    pub project_name: String,
    pub developer_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchStatistics {
    pub total_matches: usize,
    pub best_technical_matches: Vec<TopTechnicalMatch>,
    pub average_technical_score: f64,
    pub average_ai_technical: f64,
    pub average_ai_motivational: f64,
}

/// Sorts by composite score, highest first. Equal scores keep their input order.
pub fn rank(results: Vec<MatchResult>) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = results
        .into_iter()
        .map(|result| RankedMatch {
            composite_score: result.composite_score(),
            result,
        })
        .collect();
    ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    ranked
}

/// Projects ordered by `(match_count, average_score)`, both descending.
pub fn project_aggregates(
    projects: Vec<ProjectSpec>,
    results: &[MatchResult],
) -> Vec<ProjectMatchSummary> {
    let mut by_project: HashMap<i32, Vec<f64>> = HashMap::new();
    for r in results {
        by_project
            .entry(r.project_id)
            .or_default()
            .push(r.composite_score());
    }

    let mut summaries: Vec<ProjectMatchSummary> = projects
        .into_iter()
        .map(|project| {
            let scores = by_project.get(&project.id).map(Vec::as_slice).unwrap_or(&[]);
            ProjectMatchSummary {
                match_count: scores.len(),
                average_score: mean(scores.iter().copied()),
                project,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.match_count
            .cmp(&a.match_count)
            .then_with(|| b.average_score.total_cmp(&a.average_score))
    });
    summaries
}

pub fn statistics(
    results: &[MatchResult],
    projects: &[ProjectSpec],
    developers: &[DeveloperProfile],
) -> MatchStatistics {
    let project_names: HashMap<i32, &str> =
        projects.iter().map(|p| (p.id, p.name.as_str())).collect();
    let developer_names: HashMap<i32, &str> =
        developers.iter().map(|d| (d.id, d.name.as_str())).collect();

    let mut by_technical: Vec<&MatchResult> = results.iter().collect();
    by_technical.sort_by(|a, b| b.technical_match.total_cmp(&a.technical_match));

    let best_technical_matches = by_technical
        .into_iter()
        .take(TOP_TECHNICAL_MATCHES)
        .map(|r| TopTechnicalMatch {
            project_id: r.project_id,
            developer_id: r.developer_id,
            technical_match: r.technical_match,
            project_name: project_names
                .get(&r.project_id)
                .copied()
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            developer_name: developer_names
                .get(&r.developer_id)
                .copied()
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
        })
        .collect();

    MatchStatistics {
        total_matches: results.len(),
        best_technical_matches,
        average_technical_score: mean(results.iter().map(|r| r.technical_match)),
        average_ai_technical: mean(results.iter().map(|r| r.ai_technical_affinity as f64)),
        average_ai_motivational: mean(results.iter().map(|r| r.ai_motivational_affinity as f64)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
