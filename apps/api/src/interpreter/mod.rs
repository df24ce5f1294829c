//! Model Response Interpreter.
//!
//! Converts raw model text into an `AnalysisResult` or a `ProjectDraft`.
//! Extraction strategies run in confidence order (see `extract`), with
//! text-mining heuristics as the last resort and as the filler for any field
//! the model left out. Nothing here returns an error.

pub mod analysis;
pub mod draft;
pub mod extract;
pub mod heuristics;

pub use analysis::{heuristic_analysis, interpret_analysis, AnalysisContext, AnalysisResult};
pub use draft::{fallback_draft, interpret_draft, DraftContext, ProjectDraft};
