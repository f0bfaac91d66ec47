use serde::{Deserialize, Serialize};

/// Confidence tag the model attaches to a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchQuality {
    Exact,
    Close,
}

impl MatchQuality {
    /// Sort rank: exact, then close, then untagged
    pub fn rank(quality: Option<MatchQuality>) -> u8 {
        match quality {
            Some(MatchQuality::Exact) => 0,
            Some(MatchQuality::Close) => 1,
            None => 2,
        }
    }
}

/// One recommendation parsed out of the model's text, not yet verified
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    /// Title in its original language/script
    pub title: String,
    /// English or localized title given in parentheses
    pub secondary_title: Option<String>,
    pub year: String,
    pub description: String,
    pub genres: Vec<String>,
    /// Resolved ISO-639-1 code
    pub language: String,
    pub match_quality: Option<MatchQuality>,
    /// Zero-based order among accepted candidates
    pub position: usize,
}

impl RawCandidate {
    pub fn year_number(&self) -> Option<i32> {
        self.year.parse().ok()
    }

    /// Key used to drop repeated recommendations
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.title.to_lowercase(), self.year)
    }
}
