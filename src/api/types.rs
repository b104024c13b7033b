//! Review Assistant Types
//!
//! Inputs describing a viewer's taste and the structured results parsed from
//! model output. Result fields default when the model leaves them out and
//! accept camelCase spellings.

use serde::{Deserialize, Serialize};

/// A title the user has rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedTitle {
    pub title: String,

    /// Rating on a 0-10 scale
    pub rating: f32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

/// Summary of what a user watches and how they rate it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub favorite_genres: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,

    #[serde(default)]
    pub rated: Vec<RatedTitle>,
}

/// Sentiment of a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// "positive", "negative", "mixed" or "neutral"
    pub sentiment: String,

    /// -1.0 (very negative) to 1.0 (very positive)
    #[serde(default)]
    pub score: f32,

    #[serde(default)]
    pub summary: String,
}

/// Structured filters parsed from a natural-language search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default, alias = "yearFrom")]
    pub year_from: Option<i32>,

    #[serde(default, alias = "yearTo")]
    pub year_to: Option<i32>,

    #[serde(default, alias = "minRating")]
    pub min_rating: Option<f32>,

    /// "movie", "tv" or absent for both
    #[serde(default, alias = "mediaType")]
    pub media_type: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A suggested title similar to the one the user asked about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTitle {
    pub title: String,

    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub reason: String,
}

/// Predicted rating for an unseen title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPrediction {
    #[serde(alias = "predictedRating")]
    pub predicted_rating: f32,

    /// 0.0 to 1.0
    #[serde(default)]
    pub confidence: f32,

    #[serde(default)]
    pub reasoning: String,
}

impl RatingPrediction {
    /// Pull values the model may overshoot back into range
    pub fn clamped(mut self) -> Self {
        self.predicted_rating = self.predicted_rating.clamp(0.0, 10.0);
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

/// How well two users' tastes line up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteMatch {
    /// 0 to 100, whole numbers after [`TasteMatch::clamped`]
    pub score: f32,

    #[serde(default, alias = "sharedGenres")]
    pub shared_genres: Vec<String>,

    #[serde(default)]
    pub summary: String,
}

impl TasteMatch {
    /// Round the score and pull it back into 0-100
    pub fn clamped(mut self) -> Self {
        self.score = self.score.clamp(0.0, 100.0).round();
        self
    }
}

/// One observation about a user's viewing habits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,

    #[serde(default)]
    pub detail: String,
}

/// Insights generated from a taste profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewingInsights {
    #[serde(default)]
    pub headline: String,

    #[serde(default)]
    pub insights: Vec<Insight>,

    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filters_accept_camel_case() {
        let filters: SearchFilters = serde_json::from_str(
            r#"{"genres":["horror"],"yearFrom":1980,"yearTo":1989,"mediaType":"movie"}"#,
        )
        .unwrap();
        assert_eq!(filters.genres, vec!["horror"]);
        assert_eq!(filters.year_from, Some(1980));
        assert_eq!(filters.year_to, Some(1989));
        assert_eq!(filters.media_type.as_deref(), Some("movie"));
        assert!(filters.keywords.is_empty());
    }

    #[test]
    fn test_rating_prediction_clamped() {
        let prediction: RatingPrediction =
            serde_json::from_str(r#"{"predictedRating": 11.5, "confidence": 1.4}"#).unwrap();
        let prediction = prediction.clamped();
        assert_eq!(prediction.predicted_rating, 10.0);
        assert_eq!(prediction.confidence, 1.0);
        assert!(prediction.reasoning.is_empty());
    }

    #[test]
    fn test_taste_match_accepts_any_number() {
        let fractional: TasteMatch = serde_json::from_str(r#"{"score": 87.5}"#).unwrap();
        assert_eq!(fractional.clamped().score, 88.0);

        let high: TasteMatch = serde_json::from_str(r#"{"score": 300}"#).unwrap();
        assert_eq!(high.clamped().score, 100.0);

        let negative: TasteMatch =
            serde_json::from_str(r#"{"score": -12, "sharedGenres": ["noir"]}"#).unwrap();
        let negative = negative.clamped();
        assert_eq!(negative.score, 0.0);
        assert_eq!(negative.shared_genres, vec!["noir"]);
    }

    #[test]
    fn test_profile_serialization_skips_empty() {
        let profile = TasteProfile {
            favorite_genres: vec!["drama".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("username"));
        assert!(!json.contains("average_rating"));
        assert!(json.contains("drama"));
    }
}
