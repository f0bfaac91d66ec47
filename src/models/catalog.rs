use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::YearPreference;

/// Catalog section a title lives in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the catalog API (`/search/movie`, `/tv/{id}`)
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

// ============================================================================
// TMDB search / discover types
// ============================================================================

/// A movie or show as returned by the catalog search and discover endpoints.
///
/// Movies and shows use different field names (`title`/`name`,
/// `release_date`/`first_air_date`); the aliases fold both into one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "original_name")]
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub adult: bool,
}

impl CatalogEntry {
    /// Release date, ignoring the empty strings the catalog sometimes sends
    pub fn release_date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.year())
            .ok()
            .or_else(|| date.get(..4).and_then(|y| y.parse().ok()))
    }

    /// Native title, falling back to the localized one
    pub fn native_title(&self) -> &str {
        if self.original_title.trim().is_empty() {
            &self.title
        } else {
            &self.original_title
        }
    }
}

/// One page of search/discover results
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<CatalogEntry>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

// ============================================================================
// TMDB detail types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastMember {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// Full detail payload for one title (`append_to_response=credits,external_ids`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDetails {
    pub id: u64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

impl CatalogDetails {
    /// First crew member credited as director
    pub fn director(&self) -> Option<&str> {
        self.credits
            .as_ref()?
            .crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name.as_str())
    }

    pub fn top_cast(&self, limit: usize) -> Vec<String> {
        self.credits
            .as_ref()
            .map(|credits| {
                credits
                    .cast
                    .iter()
                    .take(limit)
                    .map(|member| member.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// IMDb id from the movie field or, for shows, the external ids block
    pub fn imdb_id(&self) -> Option<&str> {
        self.imdb_id
            .as_deref()
            .or_else(|| self.external_ids.as_ref()?.imdb_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }
}

// ============================================================================
// Catalog queries
// ============================================================================

/// Parameters for a title search
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSearch {
    pub query: String,
    pub year: Option<i32>,
    /// Original-language filter, empty for none
    pub languages: Vec<String>,
    pub kind: MediaKind,
}

/// Parameters for one page of popularity-sorted discovery
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub kind: MediaKind,
    pub genre_ids: Vec<u32>,
    pub languages: Vec<String>,
    pub year: Option<YearPreference>,
    pub min_rating: Option<f64>,
    pub include_adult: bool,
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_entry_deserialization() {
        let json = r#"{
            "id": 670,
            "title": "Oldboy",
            "original_title": "올드보이",
            "overview": "With no clue how he came to be imprisoned...",
            "release_date": "2003-11-21",
            "popularity": 35.2,
            "vote_average": 8.2,
            "vote_count": 8900,
            "poster_path": "/pWDtjs568ZfOTMbURQBYuT4Qxka.jpg",
            "original_language": "ko",
            "genre_ids": [18, 53, 9648]
        }"#;

        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 670);
        assert_eq!(entry.title, "Oldboy");
        assert_eq!(entry.native_title(), "올드보이");
        assert_eq!(entry.release_year(), Some(2003));
        assert_eq!(entry.genre_ids, vec![18, 53, 9648]);
        assert!(!entry.adult);
    }

    #[test]
    fn test_tv_entry_deserialization() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "original_name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "original_language": "en"
        }"#;

        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.title, "Breaking Bad");
        assert_eq!(entry.release_date(), Some("2008-01-20"));
        assert_eq!(entry.release_year(), Some(2008));
        assert_eq!(entry.overview, None);
    }

    #[test]
    fn test_empty_release_date_has_no_year() {
        let entry = CatalogEntry {
            release_date: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(entry.release_date(), None);
        assert_eq!(entry.release_year(), None);
    }

    #[test]
    fn test_native_title_falls_back_to_title() {
        let entry = CatalogEntry {
            title: "Oldboy".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.native_title(), "Oldboy");
    }

    #[test]
    fn test_details_director_cast_and_imdb() {
        let json = r#"{
            "id": 496243,
            "imdb_id": "tt6751668",
            "genres": [{"id": 35, "name": "Comedy"}, {"id": 18, "name": "Drama"}],
            "credits": {
                "cast": [
                    {"name": "Song Kang-ho"}, {"name": "Lee Sun-kyun"},
                    {"name": "Cho Yeo-jeong"}, {"name": "Choi Woo-shik"},
                    {"name": "Park So-dam"}, {"name": "Lee Jung-eun"}
                ],
                "crew": [
                    {"name": "Hong Kyung-pyo", "job": "Director of Photography"},
                    {"name": "Bong Joon-ho", "job": "Director"}
                ]
            }
        }"#;

        let details: CatalogDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.director(), Some("Bong Joon-ho"));
        assert_eq!(details.top_cast(5).len(), 5);
        assert_eq!(details.top_cast(5)[0], "Song Kang-ho");
        assert_eq!(details.imdb_id(), Some("tt6751668"));
        assert_eq!(details.genre_names(), vec!["Comedy", "Drama"]);
    }

    #[test]
    fn test_details_tv_external_ids() {
        let json = r#"{
            "id": 1396,
            "external_ids": {"imdb_id": "tt0903747"}
        }"#;

        let details: CatalogDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.imdb_id(), Some("tt0903747"));
        assert_eq!(details.director(), None);
        assert!(details.top_cast(5).is_empty());
    }

    #[test]
    fn test_media_kind_paths() {
        assert_eq!(MediaKind::Movie.as_path(), "movie");
        assert_eq!(MediaKind::Tv.to_string(), "tv");
    }
}
