//! Review Assistant
//!
//! The convenience operations the route layer calls. Each builds one prompt,
//! runs it through the dispatcher and either returns the text or parses the
//! JSON it is expected to contain.

use crate::api::json::extract_json_as;
use crate::api::prompts;
use crate::api::types::{
    RatingPrediction, SearchFilters, SentimentAnalysis, SimilarTitle, TasteMatch, TasteProfile,
    ViewingInsights,
};
use crate::client::TextGenerator;
use crate::error::Result;
use crate::router::{Dispatcher, ExecuteOptions, PoolClient};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Review-writing helpers backed by the dispatcher
pub struct ReviewAssistant<G> {
    dispatcher: Arc<Dispatcher<G>>,
    model: String,
    max_retries: u32,
}

impl<G: TextGenerator> ReviewAssistant<G> {
    /// Create an assistant using `model` for every call
    pub fn new(dispatcher: Arc<Dispatcher<G>>, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            dispatcher,
            model: model.into(),
            max_retries,
        }
    }

    /// The dispatcher this assistant runs on
    pub fn dispatcher(&self) -> &Arc<Dispatcher<G>> {
        &self.dispatcher
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, prompt: String, preferred_key: Option<i64>) -> Result<String> {
        let model = self.model.as_str();
        let prompt = prompt.as_str();
        let options = ExecuteOptions::preferred(preferred_key).with_max_retries(self.max_retries);

        let text = self
            .dispatcher
            .execute(
                |client: Arc<PoolClient<G>>| async move { client.generate(model, prompt).await },
                options,
            )
            .await?;
        Ok(text.trim().to_string())
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        preferred_key: Option<i64>,
    ) -> Result<T> {
        let text = self.generate_text(prompt, preferred_key).await?;
        extract_json_as(&text)
    }

    /// Draft a review from a rating and free-form notes
    pub async fn generate_review_draft(
        &self,
        title: &str,
        rating: Option<f32>,
        notes: &str,
        preferred_key: Option<i64>,
    ) -> Result<String> {
        self.generate_text(prompts::review_draft(title, rating, notes), preferred_key)
            .await
    }

    /// Expand bullet points into prose
    pub async fn expand_bullets(
        &self,
        title: &str,
        bullets: &[String],
        preferred_key: Option<i64>,
    ) -> Result<String> {
        self.generate_text(prompts::expand_bullets(title, bullets), preferred_key)
            .await
    }

    /// Rewrite a review without spoilers
    pub async fn remove_spoilers(&self, text: &str, preferred_key: Option<i64>) -> Result<String> {
        self.generate_text(prompts::remove_spoilers(text), preferred_key)
            .await
    }

    /// Classify a review's sentiment, score clamped to -1..=1
    pub async fn analyze_sentiment(
        &self,
        text: &str,
        preferred_key: Option<i64>,
    ) -> Result<SentimentAnalysis> {
        let mut analysis: SentimentAnalysis = self
            .generate_json(prompts::sentiment(text), preferred_key)
            .await?;
        analysis.sentiment = analysis.sentiment.trim().to_lowercase();
        analysis.score = analysis.score.clamp(-1.0, 1.0);
        Ok(analysis)
    }

    /// Suggest tags; duplicates and blanks are dropped, order kept
    pub async fn suggest_tags(
        &self,
        title: &str,
        review: &str,
        genres: &[String],
        preferred_key: Option<i64>,
    ) -> Result<Vec<String>> {
        let raw: Vec<String> = self
            .generate_json(prompts::suggest_tags(title, review, genres), preferred_key)
            .await?;

        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    /// Turn "80s horror on TV rated above 7" into filters
    pub async fn parse_search_query(
        &self,
        query: &str,
        preferred_key: Option<i64>,
    ) -> Result<SearchFilters> {
        self.generate_json(prompts::search_query(query), preferred_key)
            .await
    }

    /// Suggest titles similar to `title`
    pub async fn suggest_similar(
        &self,
        title: &str,
        genres: &[String],
        preferred_key: Option<i64>,
    ) -> Result<Vec<SimilarTitle>> {
        self.generate_json(prompts::similar_titles(title, genres), preferred_key)
            .await
    }

    /// Predict a 0-10 rating for an unseen title
    pub async fn predict_rating(
        &self,
        profile: &TasteProfile,
        title: &str,
        genres: &[String],
        preferred_key: Option<i64>,
    ) -> Result<RatingPrediction> {
        let prediction: RatingPrediction = self
            .generate_json(prompts::rating_prediction(profile, title, genres), preferred_key)
            .await?;
        Ok(prediction.clamped())
    }

    /// Score how compatible two users' tastes are (0-100)
    pub async fn taste_match(
        &self,
        a: &TasteProfile,
        b: &TasteProfile,
        preferred_key: Option<i64>,
    ) -> Result<TasteMatch> {
        let matched: TasteMatch = self
            .generate_json(prompts::taste_match(a, b), preferred_key)
            .await?;
        Ok(matched.clamped())
    }

    /// Summarize a user's viewing habits
    pub async fn generate_insights(
        &self,
        profile: &TasteProfile,
        preferred_key: Option<i64>,
    ) -> Result<ViewingInsights> {
        self.generate_json(prompts::insights(profile), preferred_key)
            .await
    }
}
