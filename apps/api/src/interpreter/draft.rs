use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::TechnologyCatalog;
use crate::interpreter::extract::{extract_object, JsonObject, Strategy};
use crate::interpreter::heuristics::{
    default_follow_up_questions, default_recommendations, determine_experience_level,
    determine_project_type, extract_project_name, strip_think_blocks, summarize_description,
};
use crate::llm_client::ModelError;
use crate::models::project::{ExperienceLevel, ProjectType};
use crate::models::technology::Technology;

const MIN_RECOMMENDATIONS_CHARS: usize = 50;
const MIN_SUGGESTED_TECHNOLOGIES: usize = 2;
const MAX_MINED_QUESTIONS: usize = 3;

pub const HEURISTIC_REASONING: &str = "Information extracted from text analysis.";
pub const TIMEOUT_REASONING: &str =
    "Timeout in the AI query. A basic response was generated based on text analysis.";
pub const UNAVAILABLE_REASONING: &str =
    "The AI service could not be reached. A basic response was generated based on text analysis.";
pub const TIMEOUT_ERROR: &str = "The AI query took too long. Please try again.";

/// Structured project specification produced by one refinement turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub experience_level: ExperienceLevel,
    pub project_type: ProjectType,
    pub suggested_technologies: Vec<Technology>,
    pub reasoning: String,
    pub recommendations: String,
    pub follow_up_questions: Vec<String>,
    pub needs_more_info: bool,
    /// Set only when the model call itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct DraftContext<'a> {
    pub catalog: &'a TechnologyCatalog,
    /// The user's description, untruncated.
    pub description: &'a str,
    /// No prior turns in the conversation.
    pub first_turn: bool,
}

/// Turns a raw model reply into a `ProjectDraft`. Never fails.
pub fn interpret_draft(raw: &str, ctx: &DraftContext<'_>) -> ProjectDraft {
    let draft = match extract_object(raw) {
        Some((obj, strategy)) => {
            debug!("Draft extracted via {strategy:?}");
            from_object(&obj, raw, ctx)
        }
        None => {
            warn!(
                "No structured draft in model reply ({} chars), mining text",
                raw.len()
            );
            debug!("Draft extracted via {:?}", Strategy::Heuristic);
            mine_draft(raw, ctx)
        }
    };
    ensure_questions(draft)
}

/// Draft built from the description alone when the model call failed.
pub fn fallback_draft(ctx: &DraftContext<'_>, failure: &ModelError) -> ProjectDraft {
    let (reasoning, error) = if failure.is_timeout() {
        (TIMEOUT_REASONING.to_string(), TIMEOUT_ERROR.to_string())
    } else {
        (
            UNAVAILABLE_REASONING.to_string(),
            format!("The AI service is unavailable: {failure}"),
        )
    };

    let level = determine_experience_level(ctx.description);
    let project_type = determine_project_type(ctx.description);
    ProjectDraft {
        name: extract_project_name(ctx.description),
        description: summarize_description(ctx.description),
        experience_level: level,
        project_type,
        suggested_technologies: ctx.catalog.find_in_text(ctx.description),
        reasoning,
        recommendations: default_recommendations(project_type, level),
        follow_up_questions: default_follow_up_questions(),
        needs_more_info: true,
        error: Some(error),
    }
}

fn from_object(obj: &JsonObject, raw: &str, ctx: &DraftContext<'_>) -> ProjectDraft {
    let experience_level = string_field(obj, "experience_level")
        .and_then(|s| parse_level(&s))
        .unwrap_or_else(|| determine_experience_level(ctx.description));
    let project_type = string_field(obj, "project_type")
        .and_then(|s| parse_project_type(&s))
        .unwrap_or_else(|| determine_project_type(ctx.description));

    let mut technologies = resolve_technologies(obj.get("suggested_technologies"), ctx.catalog);
    if technologies.len() < MIN_SUGGESTED_TECHNOLOGIES {
        supplement(&mut technologies, ctx.catalog.find_in_text(raw));
        supplement(&mut technologies, ctx.catalog.find_in_text(ctx.description));
    }

    let recommendations = recommendations_field(obj.get("recommendations"))
        .filter(|r| r.chars().count() >= MIN_RECOMMENDATIONS_CHARS)
        .unwrap_or_else(|| default_recommendations(project_type, experience_level));

    let follow_up_questions = questions_field(obj.get("follow_up_questions"));
    let needs_more_info = bool_field(obj.get("needs_more_info")).unwrap_or(if ctx.first_turn {
        true
    } else {
        !follow_up_questions.is_empty()
    });

    ProjectDraft {
        name: string_field(obj, "name").unwrap_or_else(|| extract_project_name(ctx.description)),
        description: string_field(obj, "description")
            .unwrap_or_else(|| summarize_description(ctx.description)),
        experience_level,
        project_type,
        suggested_technologies: technologies,
        reasoning: string_field(obj, "reasoning")
            .unwrap_or_else(|| HEURISTIC_REASONING.to_string()),
        recommendations,
        follow_up_questions,
        needs_more_info,
        error: None,
    }
}

/// Level and type are read from the reply together with the description.
fn mine_draft(raw: &str, ctx: &DraftContext<'_>) -> ProjectDraft {
    let reply = strip_think_blocks(raw);
    let combined = format!("{reply} {}", ctx.description);
    let level = determine_experience_level(&combined);
    let project_type = determine_project_type(&combined);

    let mut technologies = ctx.catalog.find_in_text(&reply);
    dedupe_by_id(&mut technologies);
    supplement(&mut technologies, ctx.catalog.find_in_text(ctx.description));

    let questions = mine_questions(&reply);
    ProjectDraft {
        name: extract_project_name(ctx.description),
        description: summarize_description(ctx.description),
        experience_level: level,
        project_type,
        suggested_technologies: technologies,
        reasoning: HEURISTIC_REASONING.to_string(),
        recommendations: default_recommendations(project_type, level),
        needs_more_info: ctx.first_turn || !questions.is_empty(),
        follow_up_questions: questions,
        error: None,
    }
}

fn ensure_questions(mut draft: ProjectDraft) -> ProjectDraft {
    if draft.needs_more_info && draft.follow_up_questions.is_empty() {
        draft.follow_up_questions = default_follow_up_questions();
    }
    draft
}

// ────────────────────────────────────────────────────────────────────────────
// Field readers
// ────────────────────────────────────────────────────────────────────────────

fn string_field(obj: &JsonObject, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_level(value: &str) -> Option<ExperienceLevel> {
    ExperienceLevel::parse(value).or_else(|| {
        [
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
        ]
        .into_iter()
        .find(|l| l.as_str().eq_ignore_ascii_case(value.trim()))
    })
}

fn parse_project_type(value: &str) -> Option<ProjectType> {
    ProjectType::parse(value).or_else(|| {
        ProjectType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    })
}

/// The model sometimes returns recommendations as a list.
fn recommendations_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .enumerate()
                .map(|(i, s)| format!("{}. {}", i + 1, s))
                .collect();
            Some(lines.join("\n"))
        }
        _ => None,
    }
}

fn questions_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn bool_field(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Lines of free text that read as questions, list markers stripped.
fn mine_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '-' | '*' | '.' | ')' | ' ')
                })
                .trim()
        })
        .filter(|line| line.ends_with('?') && line.chars().count() > 10)
        .take(MAX_MINED_QUESTIONS)
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Technology resolution
// ────────────────────────────────────────────────────────────────────────────

/// Resolves every reference (name string, `{id}` or `{name}` object, bare id)
/// against the catalog. Unresolvable references are dropped; the result is
/// deduplicated by id in order of first mention.
fn resolve_technologies(value: Option<&Value>, catalog: &TechnologyCatalog) -> Vec<Technology> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::String(_)) => vec![single],
        _ => return Vec::new(),
    };

    let mut resolved: Vec<Technology> = items
        .into_iter()
        .filter_map(|item| resolve_reference(item, catalog))
        .cloned()
        .collect();
    dedupe_by_id(&mut resolved);
    resolved
}

fn resolve_reference<'c>(item: &Value, catalog: &'c TechnologyCatalog) -> Option<&'c Technology> {
    match item {
        Value::String(name) => catalog.resolve(name),
        Value::Number(n) => n.as_i64().and_then(|id| catalog.get(id as i32)),
        Value::Object(obj) => obj
            .get("id")
            .and_then(Value::as_i64)
            .and_then(|id| catalog.get(id as i32))
            .or_else(|| obj.get("name").and_then(Value::as_str).and_then(|n| catalog.resolve(n))),
        _ => None,
    }
}

fn dedupe_by_id(technologies: &mut Vec<Technology>) {
    let mut seen = HashSet::new();
    technologies.retain(|t| seen.insert(t.id));
}

fn supplement(technologies: &mut Vec<Technology>, extra: Vec<Technology>) {
    let mut seen: HashSet<i32> = technologies.iter().map(|t| t.id).collect();
    technologies.extend(extra.into_iter().filter(|t| seen.insert(t.id)));
}
