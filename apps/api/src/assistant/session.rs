//! Specification Refinement Session.
//!
//! One call = one conversation turn. The caller owns the conversation and
//! sends it back in full every time; nothing is persisted here.
//!
//! States: `Initial` (no prior turns) → `Refining` (draft still needs more
//! info) → `Complete` (`needs_more_info = false`).

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assistant::prompts::{CONTINUATION_PROMPT_TEMPLATE, FIRST_TURN_PROMPT_TEMPLATE};
use crate::catalog::TechnologyCatalog;
use crate::interpreter::heuristics::truncate_with_ellipsis;
use crate::interpreter::{fallback_draft, interpret_draft, DraftContext, ProjectDraft};
use crate::llm_client::prompts::{render_template, JSON_ONLY_INSTRUCTION, NONE_SPECIFIED};
use crate::llm_client::ModelClient;

/// Longest description embedded in a prompt, in characters.
pub const PROMPT_DESCRIPTION_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Initial,
    Refining,
    Complete,
}

impl SessionState {
    /// State a turn is processed in, given the turns before it.
    pub fn of_history(history: &[ConversationTurn]) -> Self {
        if history.is_empty() {
            SessionState::Initial
        } else {
            SessionState::Refining
        }
    }
}

/// Input of a single turn.
#[derive(Debug, Clone, Copy)]
pub struct RefinementTurn<'a> {
    pub message: &'a str,
    pub goals: Option<&'a str>,
    pub history: &'a [ConversationTurn],
}

#[derive(Debug, Clone, Serialize)]
pub struct RefinementOutcome {
    pub phase: SessionState,
    pub draft: ProjectDraft,
}

pub struct RefinementSession<'a> {
    model: &'a ModelClient,
    catalog: &'a TechnologyCatalog,
    history_window: usize,
}

impl<'a> RefinementSession<'a> {
    pub fn new(model: &'a ModelClient, catalog: &'a TechnologyCatalog, history_window: usize) -> Self {
        Self {
            model,
            catalog,
            history_window,
        }
    }

    /// Runs one turn. Model failures degrade to a heuristic draft with
    /// `error` set, so this always produces an outcome.
    pub async fn refine(&self, turn: RefinementTurn<'_>) -> RefinementOutcome {
        let state = SessionState::of_history(turn.history);
        info!(
            "Refinement turn in {:?} state ({} prior turns)",
            state,
            turn.history.len()
        );

        let full_description = user_text(&turn);
        let ctx = DraftContext {
            catalog: self.catalog,
            description: &full_description,
            first_turn: state == SessionState::Initial,
        };

        let prompt = self.build_prompt(&turn);
        let draft = match self.model.generate(&prompt).await {
            Ok(raw) => interpret_draft(&raw, &ctx),
            Err(e) => {
                warn!("Model call failed during refinement, using heuristic draft: {e}");
                fallback_draft(&ctx, &e)
            }
        };

        let phase = if draft.needs_more_info {
            state
        } else {
            SessionState::Complete
        };
        info!(
            "Refinement turn finished: phase={:?} technologies={} questions={}",
            phase,
            draft.suggested_technologies.len(),
            draft.follow_up_questions.len()
        );

        RefinementOutcome { phase, draft }
    }

    pub fn build_prompt(&self, turn: &RefinementTurn<'_>) -> String {
        let goals = turn
            .goals
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(NONE_SPECIFIED);
        let technologies = self.catalog.names().join(", ");
        let message = truncate_with_ellipsis(turn.message.trim(), PROMPT_DESCRIPTION_MAX_CHARS);

        match SessionState::of_history(turn.history) {
            SessionState::Initial => render_template(
                FIRST_TURN_PROMPT_TEMPLATE,
                &[
                    ("json_only", JSON_ONLY_INSTRUCTION),
                    ("technologies", technologies.as_str()),
                    ("goals", goals),
                    ("description", message.as_str()),
                ],
            ),
            _ => {
                let history = self.render_history(turn.history);
                render_template(
                    CONTINUATION_PROMPT_TEMPLATE,
                    &[
                        ("json_only", JSON_ONLY_INSTRUCTION),
                        ("technologies", technologies.as_str()),
                        ("goals", goals),
                        ("history", history.as_str()),
                        ("message", message.as_str()),
                    ],
                )
            }
        }
    }

    /// The last `history_window` turns, one `ROLE: content` line each.
    fn render_history(&self, history: &[ConversationTurn]) -> String {
        let skip = history.len().saturating_sub(self.history_window);
        history[skip..]
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.content.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Everything the user has said, oldest first, untruncated. Feeds the local heuristics.
fn user_text(turn: &RefinementTurn<'_>) -> String {
    turn.history
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.trim())
        .chain(std::iter::once(turn.message.trim()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
