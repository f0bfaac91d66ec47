use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        normalize_language, split_list, MediaType, PreferenceSpec, PreviousRecommendation,
        RecommendationResponse, YearPreference,
    },
    routes::AppState,
    services::ranking::sort_by_title_distance,
};

/// Recommendation request as sent by the web client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationRequest {
    pub content_type: Vec<String>,
    pub languages: Vec<String>,
    pub genres: Vec<String>,
    #[serde(alias = "plotPreference")]
    pub plot: Option<String>,
    /// Comma-separated reference titles
    pub similar_movies: Option<String>,
    /// `"2010"` or `"2000-2010"`
    pub preferred_year: Option<String>,
    /// Comma-separated names
    pub cast: Option<String>,
    pub rating: Option<String>,
    pub mature: bool,
    /// Re-sorts results by title closeness when present
    pub query: Option<String>,
}

impl RecommendationRequest {
    /// Validated preference spec for the service
    pub fn to_spec(&self) -> AppResult<PreferenceSpec> {
        let media_types = self
            .content_type
            .iter()
            .map(|value| {
                MediaType::parse(value).ok_or_else(|| {
                    AppError::InvalidPreferenceSpec(format!("unknown content type: {}", value))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut languages: Vec<String> = Vec::new();
        for code in self.languages.iter().map(|l| normalize_language(l)) {
            if !code.is_empty() && !languages.contains(&code) {
                languages.push(code);
            }
        }

        let year = match self.preferred_year.as_deref() {
            Some(value) => YearPreference::parse(value)?,
            None => None,
        };

        let min_rating = match self.rating.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(value.parse::<f64>().map_err(|_| {
                AppError::InvalidPreferenceSpec(format!("invalid rating: {}", value))
            })?),
            _ => None,
        };

        let spec = PreferenceSpec {
            media_types,
            languages,
            genres: self
                .genres
                .iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
            plot: self.plot.clone(),
            similar_titles: self.similar_movies.as_deref().map(split_list).unwrap_or_default(),
            year,
            cast: self.cast.as_deref().map(split_list).unwrap_or_default(),
            min_rating,
            allow_adult: self.mature,
            exclude_titles: Vec::new(),
            bias_titles: Vec::new(),
        };

        spec.validate()?;
        Ok(spec)
    }
}

/// Body for the "different" and "similar" follow-up endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowUpRequest {
    pub current_recommendations: Vec<PreviousRecommendation>,
    pub preferences: RecommendationRequest,
}

/// Handler for `POST /api/v1/recommendations`
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let spec = request.to_spec()?;
    let mut response = state.recommendations.get_recommendations(&spec, None).await?;

    if let Some(query) = request.query.as_deref() {
        sort_by_title_distance(&mut response.results, query);
    }

    Ok(Json(response))
}

/// Handler for `POST /api/v1/recommendations/different`
pub async fn different(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FollowUpRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let spec = request.preferences.to_spec()?;
    let response = state
        .recommendations
        .get_different_recommendations(&request.current_recommendations, &spec)
        .await?;
    Ok(Json(response))
}

/// Handler for `POST /api/v1/recommendations/similar`
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FollowUpRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let spec = request.preferences.to_spec()?;
    let response = state
        .recommendations
        .get_similar_recommendations(&request.current_recommendations, &spec)
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_to_spec() {
        let request: RecommendationRequest = serde_json::from_value(serde_json::json!({
            "contentType": ["movie"],
            "languages": ["Korean", "en", "ko"],
            "genres": ["Thriller", " "],
            "plot": "revenge",
            "similarMovies": "Oldboy, Memories of Murder",
            "preferredYear": "2000-2010",
            "cast": "Song Kang-ho",
            "rating": "7.5",
            "mature": true
        }))
        .unwrap();

        let spec = request.to_spec().unwrap();
        assert_eq!(spec.media_types, vec![MediaType::Movie]);
        assert_eq!(spec.languages, vec!["ko", "en"]);
        assert_eq!(spec.genres, vec!["Thriller"]);
        assert_eq!(spec.similar_titles, vec!["Oldboy", "Memories of Murder"]);
        assert_eq!(spec.year, Some(YearPreference::Range(2000, 2010)));
        assert_eq!(spec.cast, vec!["Song Kang-ho"]);
        assert_eq!(spec.min_rating, Some(7.5));
        assert!(spec.allow_adult);
    }

    #[test]
    fn test_empty_request_is_valid() {
        let request: RecommendationRequest = serde_json::from_str("{}").unwrap();
        let spec = request.to_spec().unwrap();
        assert!(spec.media_types.is_empty());
        assert_eq!(spec.year, None);
        assert_eq!(spec.min_rating, None);
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let bad_type = RecommendationRequest {
            content_type: vec!["podcast".to_string()],
            ..Default::default()
        };
        assert!(matches!(bad_type.to_spec(), Err(AppError::InvalidPreferenceSpec(_))));

        let bad_rating = RecommendationRequest {
            rating: Some("great".to_string()),
            ..Default::default()
        };
        assert!(bad_rating.to_spec().is_err());

        let bad_year = RecommendationRequest {
            preferred_year: Some("2010-2000".to_string()),
            ..Default::default()
        };
        assert!(bad_year.to_spec().is_err());
    }

    #[test]
    fn test_follow_up_accepts_plot_preference_alias() {
        let request: FollowUpRequest = serde_json::from_value(serde_json::json!({
            "currentRecommendations": [
                {"title": "Oldboy", "releaseDate": "2003-11-21", "overview": "Revenge."}
            ],
            "preferences": {"languages": ["ko"], "plotPreference": "revenge"}
        }))
        .unwrap();

        assert_eq!(request.current_recommendations.len(), 1);
        assert_eq!(request.preferences.plot.as_deref(), Some("revenge"));
    }
}
