use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::TechnologyCatalog;
use crate::interpreter::extract::{extract_object, JsonObject, Strategy};
use crate::interpreter::heuristics::{mine_score, strip_think_blocks, truncate_with_ellipsis};
use crate::models::technology::Technology;

const COMMENT_MAX_CHARS: usize = 500;

pub const UNPARSED_COMMENT: &str =
    "The AI response could not be parsed. Scores were estimated from text analysis.";

static TECHNICAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)technical[_\s-]*affinity\W{0,5}(\d{1,3})").unwrap()
});
static MOTIVATIONAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)motivation(?:al)?[_\s-]*affinity\W{0,5}(\d{1,3})").unwrap()
});
static EXPERIENCE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)experience[_\s-]*relevance\W{0,5}(\d{1,3})").unwrap()
});

/// Semantic analysis of one project/developer pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub technical_affinity: i32,
    pub motivational_affinity: i32,
    pub experience_relevance: i32,
    pub comment: String,
}

/// What the heuristics need to know besides the raw reply.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub catalog: &'a TechnologyCatalog,
    pub project_description: &'a str,
    pub developer_skills: &'a [Technology],
}

/// Turns a raw model reply into an `AnalysisResult`. Never fails.
pub fn interpret_analysis(raw: &str, ctx: &AnalysisContext<'_>) -> AnalysisResult {
    match extract_object(raw) {
        Some((obj, strategy)) => {
            debug!("Analysis extracted via {strategy:?}");
            from_object(&obj)
        }
        None => {
            warn!(
                "No structured analysis in model reply ({} chars), mining text",
                raw.len()
            );
            debug!("Analysis extracted via {:?}", Strategy::Heuristic);
            mine_analysis(raw, ctx)
        }
    }
}

/// Analysis used when the model could not be reached at all.
pub fn heuristic_analysis(ctx: &AnalysisContext<'_>, comment: impl Into<String>) -> AnalysisResult {
    AnalysisResult {
        technical_affinity: description_affinity(ctx),
        motivational_affinity: 0,
        experience_relevance: 0,
        comment: comment.into(),
    }
}

fn from_object(obj: &JsonObject) -> AnalysisResult {
    AnalysisResult {
        technical_affinity: score_field(obj.get("technical_affinity")),
        motivational_affinity: score_field(obj.get("motivational_affinity")),
        experience_relevance: score_field(obj.get("experience_relevance")),
        comment: match obj.get("comment") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
    }
}

/// Lenient score: integers, floats (rounded), and numeric strings such as `"80%"`.
fn score_field(value: Option<&Value>) -> i32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, 100.0) as i32)
        .unwrap_or(0)
}

fn mine_analysis(raw: &str, ctx: &AnalysisContext<'_>) -> AnalysisResult {
    let cleaned = strip_think_blocks(raw);
    let cleaned = cleaned.trim();

    let comment = if cleaned.is_empty() {
        UNPARSED_COMMENT.to_string()
    } else {
        truncate_with_ellipsis(cleaned, COMMENT_MAX_CHARS)
    };

    AnalysisResult {
        technical_affinity: mine_score(cleaned, &TECHNICAL_LABEL)
            .unwrap_or_else(|| description_affinity(ctx)),
        motivational_affinity: mine_score(cleaned, &MOTIVATIONAL_LABEL).unwrap_or(0),
        experience_relevance: mine_score(cleaned, &EXPERIENCE_LABEL).unwrap_or(0),
        comment,
    }
}

/// Share of the catalog technologies named in the project description that
/// the developer has. 0 when the description names none.
fn description_affinity(ctx: &AnalysisContext<'_>) -> i32 {
    let mentioned = ctx.catalog.find_in_text(ctx.project_description);
    if mentioned.is_empty() {
        return 0;
    }
    let skills: HashSet<i32> = ctx.developer_skills.iter().map(|t| t.id).collect();
    let covered = mentioned.iter().filter(|t| skills.contains(&t.id)).count();
    (covered as f64 / mentioned.len() as f64 * 100.0).round() as i32
}
