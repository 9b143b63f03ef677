//! Free-text search: relevance scoring, ranking, suggestions and history.
//!
//! Matching is fuzzy but index-free: every call scores the candidate items
//! directly, which is fast enough for the collection sizes a prompt library holds.

pub mod history;
pub mod rank;
pub mod scoring;
pub mod suggest;

pub use history::SearchHistory;
pub use rank::{RankOptions, RankedResult, SortBy, rank};
pub use scoring::{Highlight, field_match_score, highlight, score};
pub use suggest::{SuggestionService, filter_tag_suggestions, suggest_terms};
