//! Matching and scoring: picks the best spike for a free-text task across
//! the combined catalog + generated universe.

mod score;
mod select;

pub use score::{alias_target, coverage_score, normalize, score, ALIASES, ALIAS_SCORE};
pub use select::{auto_select, rank, Candidate, Selection, SelectionLimits};
