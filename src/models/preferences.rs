use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::MediaKind;
use crate::error::{AppError, AppResult};

/// Earliest year accepted in a year preference
const MIN_YEAR: i32 = 1870;

/// Kinds of content a user can ask for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Anime,
    Indie,
    Webseries,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Anime => "anime",
            MediaType::Indie => "indie",
            MediaType::Webseries => "webseries",
        }
    }

    /// Parses a media type name, accepting a few common spellings
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "movie" | "movies" | "film" => Some(MediaType::Movie),
            "anime" => Some(MediaType::Anime),
            "indie" => Some(MediaType::Indie),
            "webseries" | "web series" | "series" | "tv" | "show" => Some(MediaType::Webseries),
            _ => None,
        }
    }
}

/// A single preferred year or an inclusive range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum YearPreference {
    Single(i32),
    Range(i32, i32),
}

impl YearPreference {
    /// Parses `"2010"` or `"2000-2010"`. Blank input means no preference.
    pub fn parse(value: &str) -> AppResult<Option<Self>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let parse_year = |s: &str| {
            s.trim().parse::<i32>().map_err(|_| {
                AppError::InvalidPreferenceSpec(format!("invalid preferred year: {}", value))
            })
        };

        let preference = match value.split_once('-') {
            Some((start, end)) => YearPreference::Range(parse_year(start)?, parse_year(end)?),
            None => YearPreference::Single(parse_year(value)?),
        };

        preference.validate()?;
        Ok(Some(preference))
    }

    fn validate(&self) -> AppResult<()> {
        let max_year = chrono::Utc::now().year() + 5;
        let in_bounds = |y: i32| (MIN_YEAR..=max_year).contains(&y);

        match *self {
            YearPreference::Single(year) if !in_bounds(year) => Err(AppError::InvalidPreferenceSpec(
                format!("preferred year {} is out of range", year),
            )),
            YearPreference::Range(start, end) if !in_bounds(start) || !in_bounds(end) => {
                Err(AppError::InvalidPreferenceSpec(format!(
                    "preferred years {}-{} are out of range",
                    start, end
                )))
            }
            YearPreference::Range(start, end) if start > end => Err(
                AppError::InvalidPreferenceSpec(format!("year range {}-{} is reversed", start, end)),
            ),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for YearPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearPreference::Single(year) => write!(f, "{}", year),
            YearPreference::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// User-supplied search criteria for one recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreferenceSpec {
    pub media_types: Vec<MediaType>,
    /// ISO-639-1 codes in priority order
    pub languages: Vec<String>,
    pub genres: Vec<String>,
    pub plot: Option<String>,
    /// Reference titles the user likes
    pub similar_titles: Vec<String>,
    pub year: Option<YearPreference>,
    pub cast: Vec<String>,
    pub min_rating: Option<f64>,
    pub allow_adult: bool,
    /// Titles that must not come back ("different" requests)
    pub exclude_titles: Vec<String>,
    /// Titles the results should resemble but not repeat ("similar" requests)
    pub bias_titles: Vec<String>,
}

impl PreferenceSpec {
    /// Catalog media kind searched for this request
    pub fn media_kind(&self) -> MediaKind {
        match self.media_types.first() {
            Some(MediaType::Webseries) => MediaKind::Tv,
            _ => MediaKind::Movie,
        }
    }

    /// Plot text, if the user gave any
    pub fn plot_text(&self) -> Option<&str> {
        self.plot.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Titles the pipeline must not return
    pub fn blocked_titles(&self) -> impl Iterator<Item = &String> {
        self.exclude_titles.iter().chain(self.bias_titles.iter())
    }

    /// Rejects specs that cannot produce a sensible request
    pub fn validate(&self) -> AppResult<()> {
        if let Some(rating) = self.min_rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(AppError::InvalidPreferenceSpec(
                    "minimum rating must be between 0 and 10".to_string(),
                ));
            }
        }

        if let Some(year) = &self.year {
            year.validate()?;
        }

        if let Some(code) = self
            .languages
            .iter()
            .find(|code| code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()))
        {
            return Err(AppError::InvalidPreferenceSpec(format!(
                "unsupported language: {}",
                code
            )));
        }

        Ok(())
    }
}

/// Maps a language name or code to an ISO-639-1 code
pub fn normalize_language(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    let code = match lower.as_str() {
        "english" => "en",
        "spanish" => "es",
        "french" => "fr",
        "german" => "de",
        "italian" => "it",
        "japanese" => "ja",
        "korean" => "ko",
        "chinese" => "zh",
        "hindi" => "hi",
        "portuguese" => "pt",
        "russian" => "ru",
        "arabic" => "ar",
        "turkish" => "tr",
        "urdu" => "ur",
        _ => return lower,
    };
    code.to_string()
}

/// Splits a comma-separated user list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
