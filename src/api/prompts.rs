//! Prompt Builders
//!
//! One function per assistant operation. Operations that expect JSON spell
//! out the exact shape so the extractor has something to find.

use crate::api::types::TasteProfile;

const JSON_ONLY: &str = "Respond with JSON only, no markdown and no commentary.";

fn genre_list(genres: &[String]) -> String {
    if genres.is_empty() {
        "unknown".to_string()
    } else {
        genres.join(", ")
    }
}

fn profile_json(profile: &TasteProfile) -> String {
    serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt for a first-person review draft
pub fn review_draft(title: &str, rating: Option<f32>, notes: &str) -> String {
    let rating = rating
        .map(|r| format!("{:.1}/10", r))
        .unwrap_or_else(|| "not given".to_string());
    format!(
        "Write a short, personal movie review draft for \"{title}\".\n\
         The viewer's rating: {rating}.\n\
         Their notes: {notes}\n\
         Keep it under 200 words, first person, no spoilers, and match the tone to the rating."
    )
}

/// Prompt that turns bullet points into prose
pub fn expand_bullets(title: &str, bullets: &[String]) -> String {
    let points: String = bullets.iter().map(|b| format!("- {}\n", b.trim())).collect();
    format!(
        "Turn these bullet points about \"{title}\" into a flowing review of two or three paragraphs.\n\
         Keep every point, add no new claims about the plot.\n\n{points}"
    )
}

/// Prompt that rewrites a review without spoilers
pub fn remove_spoilers(text: &str) -> String {
    format!(
        "Rewrite the following review so it contains no spoilers. Remove or vaguely \
         paraphrase plot twists, endings and character deaths; keep the opinions and tone.\n\
         Return only the rewritten review.\n\n{text}"
    )
}

/// Prompt for a sentiment object
pub fn sentiment(text: &str) -> String {
    format!(
        "Analyze the sentiment of this review.\n{JSON_ONLY}\n\
         Shape: {{\"sentiment\": \"positive|negative|mixed|neutral\", \"score\": <number from -1 to 1>, \"summary\": \"<one sentence>\"}}\n\n\
         Review:\n{text}"
    )
}

/// Prompt for a JSON array of tags
pub fn suggest_tags(title: &str, review: &str, genres: &[String]) -> String {
    format!(
        "Suggest 3 to 6 short lowercase tags for \"{title}\" (genres: {genres}) based on this review.\n\
         {JSON_ONLY}\nShape: [\"tag\", \"tag\"]\n\nReview:\n{review}",
        genres = genre_list(genres)
    )
}

/// Prompt that maps a search request to filters
pub fn search_query(query: &str) -> String {
    format!(
        "Convert this movie/TV search request into filters.\n{JSON_ONLY}\n\
         Shape: {{\"genres\": [], \"year_from\": null, \"year_to\": null, \"min_rating\": null, \
         \"media_type\": \"movie|tv|null\", \"keywords\": []}}\n\n\
         Request: {query}"
    )
}

/// Prompt for a JSON array of similar titles
pub fn similar_titles(title: &str, genres: &[String]) -> String {
    format!(
        "Suggest 5 movies or shows similar to \"{title}\" (genres: {genres}).\n{JSON_ONLY}\n\
         Shape: [{{\"title\": \"\", \"year\": 2000, \"reason\": \"<one sentence>\"}}]",
        genres = genre_list(genres)
    )
}

/// Prompt for a predicted 0-10 rating
pub fn rating_prediction(profile: &TasteProfile, title: &str, genres: &[String]) -> String {
    format!(
        "Given this viewer profile, predict how they would rate \"{title}\" (genres: {genres}) on a 0-10 scale.\n\
         {JSON_ONLY}\n\
         Shape: {{\"predicted_rating\": 7.5, \"confidence\": <0 to 1>, \"reasoning\": \"<one or two sentences>\"}}\n\n\
         Profile: {profile}",
        genres = genre_list(genres),
        profile = profile_json(profile)
    )
}

/// Prompt for a 0-100 compatibility score
pub fn taste_match(a: &TasteProfile, b: &TasteProfile) -> String {
    format!(
        "Compare the tastes of these two viewers and score their compatibility from 0 to 100.\n\
         {JSON_ONLY}\n\
         Shape: {{\"score\": 0, \"shared_genres\": [], \"summary\": \"<two sentences>\"}}\n\n\
         Viewer A: {a}\nViewer B: {b}",
        a = profile_json(a),
        b = profile_json(b)
    )
}

/// Prompt for viewing insights and recommendations
pub fn insights(profile: &TasteProfile) -> String {
    format!(
        "Write viewing insights for this user based on their ratings.\n{JSON_ONLY}\n\
         Shape: {{\"headline\": \"\", \"insights\": [{{\"title\": \"\", \"detail\": \"\"}}], \"recommendations\": [\"\"]}}\n\n\
         Profile: {profile}",
        profile = profile_json(profile)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_draft_formats_rating() {
        let prompt = review_draft("Heat", Some(8.0), "great shootout");
        assert!(prompt.contains("\"Heat\""));
        assert!(prompt.contains("8.0/10"));
        assert!(review_draft("Heat", None, "").contains("not given"));
    }

    #[test]
    fn test_expand_bullets_lists_every_point() {
        let prompt = expand_bullets("Alien", &[" tense ".to_string(), "great set design".to_string()]);
        assert!(prompt.contains("- tense\n"));
        assert!(prompt.contains("- great set design\n"));
    }

    #[test]
    fn test_json_prompts_embed_profile() {
        let profile = TasteProfile {
            favorite_genres: vec!["sci-fi".to_string()],
            ..Default::default()
        };
        let prompt = rating_prediction(&profile, "Arrival", &[]);
        assert!(prompt.contains("\"favorite_genres\":[\"sci-fi\"]"));
        assert!(prompt.contains("genres: unknown"));
        assert!(prompt.contains(JSON_ONLY));
    }
}
