use serde::{Deserialize, Serialize};

use super::{MatchQuality, MediaKind};

/// Coarse content type shown to users
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Movie,
    Webseries,
}

impl From<MediaKind> for ResultType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => ResultType::Movie,
            MediaKind::Tv => ResultType::Webseries,
        }
    }
}

/// A verified, enriched recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub genres: Vec<String>,
    pub original_language: String,
    pub vote_average: f64,
    pub cast: Vec<String>,
    pub director: String,
    pub imdb_id: Option<String>,
    pub tmdb_id: String,
    pub tmdb_url: String,
    pub imdb_url: Option<String>,
    pub relevance_position: usize,
    pub media_type: MediaKind,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchQuality>,
}

/// Response payload for every recommendation variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub results: Vec<EnrichedResult>,
}

/// A result the user has already seen, as sent back by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousRecommendation {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl PreviousRecommendation {
    pub fn year_label(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnrichedResult {
        EnrichedResult {
            id: "670".to_string(),
            title: "Oldboy".to_string(),
            overview: "A man seeks revenge.".to_string(),
            poster_path: None,
            release_date: Some("2003-11-21".to_string()),
            genres: vec!["Drama".to_string()],
            original_language: "ko".to_string(),
            vote_average: 8.2,
            cast: vec![],
            director: "Park Chan-wook".to_string(),
            imdb_id: Some("tt0364569".to_string()),
            tmdb_id: "670".to_string(),
            tmdb_url: "https://www.themoviedb.org/movie/670".to_string(),
            imdb_url: Some("https://www.imdb.com/title/tt0364569".to_string()),
            relevance_position: 0,
            media_type: MediaKind::Movie,
            result_type: ResultType::Movie,
            language: "ko".to_string(),
            match_type: Some(MatchQuality::Exact),
        }
    }

    #[test]
    fn test_enriched_result_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["tmdbUrl"], "https://www.themoviedb.org/movie/670");
        assert_eq!(json["relevancePosition"], 0);
        assert_eq!(json["mediaType"], "movie");
        assert_eq!(json["type"], "movie");
        assert_eq!(json["matchType"], "EXACT");
    }

    #[test]
    fn test_untagged_result_omits_match_type() {
        let mut result = sample();
        result.match_type = None;
        let json = serde_json::to_value(result).unwrap();
        assert!(json.get("matchType").is_none());
    }

    #[test]
    fn test_result_type_from_kind() {
        assert_eq!(ResultType::from(MediaKind::Tv), ResultType::Webseries);
        assert_eq!(ResultType::from(MediaKind::Movie), ResultType::Movie);
    }

    #[test]
    fn test_previous_recommendation_year_label() {
        let previous = PreviousRecommendation {
            title: "Oldboy".to_string(),
            release_date: Some("2003-11-21".to_string()),
            overview: None,
        };
        assert_eq!(previous.year_label(), "2003");

        let unknown = PreviousRecommendation {
            title: "Mystery".to_string(),
            ..Default::default()
        };
        assert_eq!(unknown.year_label(), "N/A");
    }
}
