//! Text-mining heuristics used when the model gives no usable structure,
//! and to fill any field the model left out or got wrong.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::contains_word;
use crate::models::project::{ExperienceLevel, ProjectType};

const ADVANCED_KEYWORDS: &[&str] = &[
    "advanced",
    "complex",
    "architecture",
    "microservices",
    "scalable",
    "enterprise",
    "avanzado",
    "complejo",
    "arquitectura",
    "microservicios",
];

const BEGINNER_KEYWORDS: &[&str] = &[
    "simple",
    "basic",
    "beginner",
    "easy",
    "básico",
    "principiante",
    "fácil",
];

/// Checked in order; the first vocabulary with a whole-word hit wins.
const PROJECT_TYPE_KEYWORDS: &[(ProjectType, &[&str])] = &[
    (
        ProjectType::Mobile,
        &["mobile", "móvil", "movil", "android", "ios", "iphone"],
    ),
    (
        ProjectType::Api,
        &["api", "apis", "rest", "restful", "backend", "service", "services"],
    ),
    (
        ProjectType::DataScience,
        &[
            "data",
            "analytics",
            "analysis",
            "análisis",
            "machine learning",
            "ml",
            "ai",
        ],
    ),
    (
        ProjectType::DevOps,
        &[
            "devops",
            "deploy",
            "deployment",
            "infrastructure",
            "infraestructura",
            "ci/cd",
        ],
    ),
    (ProjectType::Desktop, &["desktop", "escritorio"]),
];

pub const FALLBACK_PROJECT_NAME: &str = "New Project";
const SUMMARY_MAX_CHARS: usize = 500;

static LABELLED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*(?:#+\s*)?(?:project|platform|system|application|app|proyecto|plataforma|sistema|aplicación)(?:\s+name)?\s*:\s*(.+)$",
    )
    .unwrap()
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+(.+?)\s*$").unwrap());
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// Drops closed `<think>...</think>` reasoning blocks from a reply.
pub fn strip_think_blocks(raw: &str) -> Cow<'_, str> {
    THINK_BLOCK.replace_all(raw, "")
}

pub fn determine_experience_level(text: &str) -> ExperienceLevel {
    let text = text.to_lowercase();
    if ADVANCED_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        ExperienceLevel::Advanced
    } else if BEGINNER_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        ExperienceLevel::Beginner
    } else {
        ExperienceLevel::Intermediate
    }
}

pub fn determine_project_type(text: &str) -> ProjectType {
    let text = text.to_lowercase();
    PROJECT_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| contains_word(&text, kw)))
        .map(|(project_type, _)| *project_type)
        .unwrap_or(ProjectType::Web)
}

/// Derives a project name from the description.
///
/// Order: a labelled title (`Project: ...`), a markdown heading, the first
/// plausible plain line (up to eight words), the first five words.
pub fn extract_project_name(description: &str) -> String {
    let labelled = LABELLED_TITLE
        .captures_iter(description)
        .chain(HEADING.captures_iter(description))
        .filter_map(|c| c.get(1).map(|m| clean_title(m.as_str())))
        .find(|name| is_plausible_title(name));
    if let Some(name) = labelled {
        return name;
    }

    for line in description.lines().take(10) {
        let line = line.trim();
        let len = line.chars().count();
        if len <= 5 || len >= 100 || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let head: String = line.chars().take(20).collect();
        if head.contains(':') {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().take(8).collect();
        if words.len() >= 2 {
            return clean_title(&words.join(" "));
        }
    }

    let words: Vec<&str> = description.split_whitespace().take(5).collect();
    let name = clean_title(&words.join(" "));
    if name.is_empty() {
        FALLBACK_PROJECT_NAME.to_string()
    } else {
        name
    }
}

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '-') || c.is_whitespace())
        .to_string()
}

fn is_plausible_title(name: &str) -> bool {
    let len = name.chars().count();
    len > 3 && len < 100
}

/// Truncates to `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Short description used when the model gave none.
pub fn summarize_description(description: &str) -> String {
    truncate_with_ellipsis(description.trim(), SUMMARY_MAX_CHARS)
}

pub fn default_recommendations(project_type: ProjectType, level: ExperienceLevel) -> String {
    let mut out = format!(
        "For a {} project at {} level, here are some recommendations:\n\n",
        project_type.as_str(),
        level.as_str()
    );

    let items: &[&str] = match project_type {
        ProjectType::Web => &[
            "Consider using a modern frontend framework for better user experience and maintainability.",
            "Implement responsive design so the application works well on all devices.",
            "Set up proper authentication and authorization mechanisms for user security.",
            "Use a RESTful API architecture for scalability and separation of concerns.",
            "Implement proper error handling and logging for easier debugging and monitoring.",
        ],
        ProjectType::Mobile => &[
            "Choose between native, hybrid, or cross-platform development based on your needs.",
            "Implement offline functionality for a better user experience.",
            "Consider push notifications for user engagement.",
            "Optimize for different screen sizes and device capabilities.",
        ],
        _ => &[
            "Plan the architecture carefully to ensure scalability.",
            "Implement proper error handling and logging.",
            "Consider security best practices from the start.",
            "Set up a development workflow with version control and testing.",
        ],
    };
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, item));
    }

    out.push_str(
        "\nStart with a minimum viable product (MVP) and iterate based on user feedback.",
    );
    out
}

pub fn default_follow_up_questions() -> Vec<String> {
    vec![
        "What specific features or functionalities are most important for your project?"
            .to_string(),
        "Do you have any technical constraints or preferences?".to_string(),
        "What is your target audience or user base?".to_string(),
    ]
}

/// Finds `<label> ... N` in prose, e.g. `Technical affinity: 80` or
/// `"motivational_affinity" = 65`. Returns the value clamped to 0..=100.
pub fn mine_score(text: &str, label: &Regex) -> Option<i32> {
    label
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .map(|v| v.clamp(0, 100))
}
