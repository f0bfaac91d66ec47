//! Resolves a parsed candidate to a real catalog entry.
//!
//! Scoring combines normalized Levenshtein similarity between titles with
//! year proximity. An entry is accepted when its language is wanted and it is
//! either a good title match from roughly the right year or a very strong
//! title match regardless of year.

use std::sync::Arc;

use crate::{
    models::{CatalogEntry, MediaKind, RawCandidate, TitleSearch},
    services::providers::CatalogProvider,
};

/// Year difference assigned when either side has no usable year
pub const UNKNOWN_YEAR_DIFF: i32 = 9999;

/// Similarities closer than this are compared by year instead
const SIMILARITY_TIE_WINDOW: f64 = 0.1;
const CONTAINMENT_BONUS: f64 = 0.2;
const YEAR_BONUS: f64 = 0.2;
const YEAR_BONUS_MAX_DIFF: i32 = 1;

const GOOD_SIMILARITY: f64 = 0.6;
const GOOD_MAX_YEAR_DIFF: i32 = 2;
const STRONG_SIMILARITY: f64 = 0.8;

/// What the matcher looks for
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub title: String,
    pub secondary_title: Option<String>,
    pub year: Option<i32>,
    pub kind: MediaKind,
    /// Accepted original languages, empty for any
    pub languages: Vec<String>,
}

impl MatchQuery {
    /// Query for one candidate, filtered to the candidate's own language
    pub fn for_candidate(candidate: &RawCandidate, kind: MediaKind) -> Self {
        Self {
            title: candidate.title.clone(),
            secondary_title: candidate.secondary_title.clone(),
            year: candidate.year_number(),
            kind,
            languages: vec![candidate.language.clone()],
        }
    }

    fn language_matches(&self, language: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language)
    }
}

/// How well one catalog entry fits a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub similarity: f64,
    pub year_diff: i32,
    pub language_match: bool,
    /// Position of the scored entry in the search results
    pub index: usize,
}

impl MatchScore {
    /// Ordering used to pick the best entry.
    ///
    /// Language match first, then similarity. Within the tie window the closer
    /// year wins. Not transitive, so only use it for a linear scan.
    pub fn outranks(&self, other: &MatchScore) -> bool {
        if self.language_match != other.language_match {
            return self.language_match;
        }

        let gap = self.similarity - other.similarity;
        if gap.abs() < SIMILARITY_TIE_WINDOW && self.year_diff != other.year_diff {
            return self.year_diff < other.year_diff;
        }

        gap > 0.0
    }

    pub fn is_acceptable(&self) -> bool {
        self.language_match
            && ((self.similarity > GOOD_SIMILARITY && self.year_diff <= GOOD_MAX_YEAR_DIFF)
                || self.similarity > STRONG_SIMILARITY)
    }
}

/// Strips `.!?…` and collapses whitespace
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '.' | '!' | '?' | '…'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn pair_similarity(a: &str, b: &str) -> f64 {
    let a = clean_title(a).to_lowercase();
    let b = clean_title(b).to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let mut similarity = strsim::normalized_levenshtein(&a, &b);
    if a.contains(&b) || b.contains(&a) {
        similarity = (similarity + CONTAINMENT_BONUS).min(1.0);
    }
    similarity
}

/// Scores a catalog entry against a query
pub fn score_entry(query: &MatchQuery, entry: &CatalogEntry, index: usize) -> MatchScore {
    let mut similarity = pair_similarity(&query.title, entry.native_title());
    match &query.secondary_title {
        Some(secondary) => {
            similarity = similarity.max(pair_similarity(secondary, &entry.title));
        }
        None => {
            similarity = similarity.max(pair_similarity(&query.title, &entry.title));
        }
    }

    let year_diff = match (query.year, entry.release_year()) {
        (Some(wanted), Some(actual)) => (wanted - actual).abs(),
        _ => UNKNOWN_YEAR_DIFF,
    };

    if year_diff <= YEAR_BONUS_MAX_DIFF {
        similarity = (similarity + YEAR_BONUS).min(1.0);
    }

    MatchScore {
        similarity,
        year_diff,
        language_match: query.language_matches(&entry.original_language),
        index,
    }
}

/// Best score by [`MatchScore::outranks`]; earlier entries win exact ties
pub fn select_best(scores: &[MatchScore]) -> Option<&MatchScore> {
    let mut best: Option<&MatchScore> = None;
    for score in scores {
        match best {
            Some(current) if !score.outranks(current) => {}
            _ => best = Some(score),
        }
    }
    best
}

/// Searches the catalog and picks the entry a candidate refers to
#[derive(Clone)]
pub struct CatalogMatcher {
    catalog: Arc<dyn CatalogProvider>,
}

impl CatalogMatcher {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    /// Returns the accepted entry, or `None` when nothing clears the bar.
    ///
    /// Catalog failures are logged and treated as no match.
    pub async fn find_best_match(&self, query: &MatchQuery) -> Option<CatalogEntry> {
        let native = clean_title(&query.title);
        let mut results = self.search(&native, query).await;

        if results.is_empty() {
            if let Some(secondary) = &query.secondary_title {
                results = self.search(&clean_title(secondary), query).await;
            }
        }

        if results.is_empty() {
            tracing::debug!(title = %query.title, "No catalog results for candidate");
            return None;
        }

        let entries: Vec<CatalogEntry> = results
            .into_iter()
            .filter(|entry| query.language_matches(&entry.original_language))
            .collect();

        if entries.is_empty() {
            tracing::debug!(
                title = %query.title,
                languages = ?query.languages,
                "No catalog results in the requested language"
            );
            return None;
        }

        let scores: Vec<MatchScore> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| score_entry(query, entry, index))
            .collect();

        let best = select_best(&scores)?;
        let entry = &entries[best.index];

        if !best.is_acceptable() {
            tracing::debug!(
                title = %query.title,
                closest = %entry.title,
                similarity = best.similarity,
                year_diff = best.year_diff,
                "Best catalog match rejected"
            );
            return None;
        }

        tracing::info!(
            title = %query.title,
            matched = %entry.title,
            tmdb_id = entry.id,
            similarity = best.similarity,
            year_diff = best.year_diff,
            "Matched candidate to catalog entry"
        );

        Some(entry.clone())
    }

    async fn search(&self, title: &str, query: &MatchQuery) -> Vec<CatalogEntry> {
        if title.is_empty() {
            return Vec::new();
        }

        let search = TitleSearch {
            query: title.to_string(),
            year: query.year,
            languages: query.languages.clone(),
            kind: query.kind,
        };

        match self.catalog.search_titles(&search).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    provider = self.catalog.name(),
                    title = %title,
                    error = %e,
                    "Catalog search failed"
                );
                Vec::new()
            }
        }
    }
}
