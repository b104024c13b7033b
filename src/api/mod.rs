//! API Module
//!
//! Review-assistant operations built on the dispatcher, plus the helpers that
//! shape their prompts and parse their output.

pub mod assistant;
pub mod json;
pub mod prompts;
pub mod types;

pub use assistant::ReviewAssistant;
pub use json::{extract_json, extract_json_as, strip_code_fences};
pub use types::{
    Insight, RatedTitle, RatingPrediction, SearchFilters, SentimentAnalysis, SimilarTitle,
    TasteMatch, TasteProfile, ViewingInsights,
};
