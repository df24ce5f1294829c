//! Structured-object recovery from raw model text.
//!
//! Two strategies, tried in confidence order by `extract_object`:
//! 1. `bounded_span`: first `{` to last `}`, skipping reasoning preamble.
//! 2. `balanced_blocks`: every balanced `{...}` block, first parseable wins.
//!
//! The third tier (text mining) depends on the target shape and lives with
//! the analysis and draft interpreters.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    BoundedSpan,
    BalancedBlock,
    Heuristic,
}

/// Words that mark the model "thinking out loud" before its answer.
const PREAMBLE_MARKERS: &[&str] = &["think", "okay", "let me", "hmm", "alright", "first,"];

const THINK_CLOSE: &str = "</think>";

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Runs strategies 1 and 2. `None` means no structured block could be recovered.
pub fn extract_object(raw: &str) -> Option<(JsonObject, Strategy)> {
    let text = strip_json_fences(raw);
    if let Some(obj) = bounded_span(text) {
        return Some((obj, Strategy::BoundedSpan));
    }
    balanced_blocks(text).map(|obj| (obj, Strategy::BalancedBlock))
}

/// Strategy 1: parse the span between the first `{` and the last `}`.
///
/// When the text before the first `{` reads like model reasoning, the start
/// moves past any `</think>` block and then to the first `{` that opens a
/// well-formed object, so braces inside commentary are skipped.
pub fn bounded_span(text: &str) -> Option<JsonObject> {
    let mut start = text.find('{')?;
    let end = text.rfind('}')?;

    if has_preamble(&text[..start]) {
        let search_from = text.find(THINK_CLOSE).map_or(0, |i| i + THINK_CLOSE.len());
        if let Some(s) = first_well_formed_start(text, search_from) {
            start = s;
        }
    }

    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

/// Strategy 2: try every balanced-brace block in order of its opening brace.
pub fn balanced_blocks(text: &str) -> Option<JsonObject> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(|(start, _)| balanced_end(text, start).map(|end| &text[start..=end]))
        .find_map(parse_object)
}

/// Parses `candidate` as a JSON object, retrying once with trailing commas removed.
pub fn parse_object(candidate: &str) -> Option<JsonObject> {
    let parse = |s: &str| match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };
    parse(candidate).or_else(|| {
        let repaired = TRAILING_COMMA.replace_all(candidate, "$1");
        parse(&repaired)
    })
}

/// Strips a leading ```json or ``` fence and everything from the closing fence on.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => match stripped.find("```") {
            Some(close) => stripped[..close].trim(),
            None => stripped.trim(),
        },
        None => text,
    }
}

fn has_preamble(prefix: &str) -> bool {
    let prefix = prefix.to_lowercase();
    PREAMBLE_MARKERS.iter().any(|m| prefix.contains(m))
}

fn first_well_formed_start(text: &str, from: usize) -> Option<usize> {
    text[from..]
        .char_indices()
        .filter(|&(_, c)| c == '{')
        .map(|(i, _)| from + i)
        .find(|&start| {
            balanced_end(text, start)
                .and_then(|end| parse_object(&text[start..=end]))
                .is_some()
        })
}

/// Byte index of the `}` closing the `{` at `start`, honouring JSON string literals.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
