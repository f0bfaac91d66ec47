//! Recommendation pipeline
//!
//! One request runs: build prompt, ask the completion chain, parse candidates,
//! match and enrich them against the catalog, dedupe and rank. When the model
//! output yields nothing usable the popularity fallback answers instead.

use std::{collections::HashSet, sync::Arc};

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogEntry, DiscoverQuery, EnrichedResult, Genre, MediaKind, PreferenceSpec,
        PreviousRecommendation, RawCandidate, RecommendationResponse, YearPreference,
        MAX_RESULTS,
    },
    services::{
        completion::CompletionChain,
        enricher::{DetailEnricher, EnrichmentContext},
        extractor::extract_candidates,
        matcher::{clean_title, CatalogMatcher, MatchQuery},
        prompt::{follow_up_prompt, recommendation_prompt, FollowUp},
        providers::{discover_pages, CatalogProvider},
        ranking::{dedupe_by_id, rank_results},
    },
};

/// Discover pages scanned by the popularity fallback
const FALLBACK_PAGES: std::ops::RangeInclusive<u32> = 1..=3;
/// Allowed distance from a single preferred year in the fallback
const FALLBACK_YEAR_WINDOW: i32 = 2;

/// Extra catalog genre names tried for common user spellings
const GENRE_ALIASES: &[(&str, &[&str])] = &[
    ("sci-fi", &["Science Fiction", "Sci-Fi & Fantasy"]),
    ("scifi", &["Science Fiction", "Sci-Fi & Fantasy"]),
    ("science fiction", &["Sci-Fi & Fantasy"]),
    ("fantasy", &["Sci-Fi & Fantasy"]),
    ("action", &["Action & Adventure"]),
    ("adventure", &["Action & Adventure"]),
    ("war", &["War & Politics"]),
    ("politics", &["War & Politics"]),
    ("romcom", &["Romance", "Comedy"]),
];

/// Runs recommendation requests end to end
#[derive(Clone)]
pub struct RecommendationService {
    completion: CompletionChain,
    catalog: Arc<dyn CatalogProvider>,
    matcher: CatalogMatcher,
    enricher: DetailEnricher,
}

impl RecommendationService {
    pub fn new(
        completion: CompletionChain,
        catalog: Arc<dyn CatalogProvider>,
        image_base_url: String,
    ) -> Self {
        Self {
            completion,
            matcher: CatalogMatcher::new(catalog.clone()),
            enricher: DetailEnricher::new(catalog.clone(), image_base_url),
            catalog,
        }
    }

    /// Recommendations for a preference spec.
    ///
    /// `prompt_override` replaces the generated prompt when non-blank.
    #[instrument(skip_all, fields(languages = ?spec.languages, genres = ?spec.genres))]
    pub async fn get_recommendations(
        &self,
        spec: &PreferenceSpec,
        prompt_override: Option<&str>,
    ) -> AppResult<RecommendationResponse> {
        spec.validate()?;

        let prompt = match prompt_override.map(str::trim).filter(|p| !p.is_empty()) {
            Some(custom) => custom.to_string(),
            None => recommendation_prompt(spec),
        };

        let text = self.completion.complete(&prompt).await?;

        let matched = match extract_candidates(&text, &spec.languages, &spec.media_types) {
            Ok(candidates) => {
                tracing::info!(candidates = candidates.len(), "Parsed candidates");
                self.match_and_enrich(candidates, spec).await
            }
            Err(AppError::ParseFailure(reason)) => {
                tracing::warn!(reason = %reason, "Model output not parseable, using popularity fallback");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let results = rank_results(dedupe_by_id(matched), &spec.languages);
        if !results.is_empty() {
            tracing::info!(results = results.len(), "Recommendations ready");
            return Ok(RecommendationResponse { results });
        }

        tracing::info!("No verified candidates, trying popularity fallback");
        let fallback = self.popularity_fallback(spec).await;
        if fallback.is_empty() {
            return Err(AppError::NoMatchesFound);
        }

        tracing::info!(results = fallback.len(), "Fallback recommendations ready");
        Ok(RecommendationResponse { results: fallback })
    }

    /// Recommendations that steer away from titles the user has already seen
    pub async fn get_different_recommendations(
        &self,
        previous: &[PreviousRecommendation],
        spec: &PreferenceSpec,
    ) -> AppResult<RecommendationResponse> {
        self.follow_up(FollowUp::Different, previous, spec).await
    }

    /// Recommendations that resemble titles the user has already seen
    pub async fn get_similar_recommendations(
        &self,
        previous: &[PreviousRecommendation],
        spec: &PreferenceSpec,
    ) -> AppResult<RecommendationResponse> {
        self.follow_up(FollowUp::Similar, previous, spec).await
    }

    async fn follow_up(
        &self,
        mode: FollowUp,
        previous: &[PreviousRecommendation],
        spec: &PreferenceSpec,
    ) -> AppResult<RecommendationResponse> {
        if previous.is_empty() {
            return Err(AppError::InvalidPreferenceSpec(
                "No current recommendations provided".to_string(),
            ));
        }

        let titles = previous.iter().map(|p| p.title.clone());
        let mut spec = spec.clone();
        match mode {
            FollowUp::Different => spec.exclude_titles.extend(titles),
            FollowUp::Similar => spec.bias_titles.extend(titles),
        }

        let prompt = follow_up_prompt(mode, previous, &spec);
        self.get_recommendations(&spec, Some(&prompt)).await
    }

    /// Matches and enriches every candidate concurrently, preserving order
    async fn match_and_enrich(
        &self,
        candidates: Vec<RawCandidate>,
        spec: &PreferenceSpec,
    ) -> Vec<EnrichedResult> {
        let kind = spec.media_kind();
        let blocked = blocked_titles(spec);

        let tasks = candidates
            .iter()
            .map(|candidate| self.resolve_candidate(candidate, kind, spec, &blocked));

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn resolve_candidate(
        &self,
        candidate: &RawCandidate,
        kind: MediaKind,
        spec: &PreferenceSpec,
        blocked: &HashSet<String>,
    ) -> Option<EnrichedResult> {
        let candidate_blocked = std::iter::once(&candidate.title)
            .chain(candidate.secondary_title.as_ref())
            .any(|title| is_blocked(blocked, title));
        if candidate_blocked {
            tracing::debug!(candidate = %candidate.title, "Skipping excluded title");
            return None;
        }

        let query = MatchQuery::for_candidate(candidate, kind);
        let entry = self.matcher.find_best_match(&query).await?;

        if !self.entry_allowed(&entry, spec, blocked) {
            return None;
        }

        let context = EnrichmentContext {
            language: candidate.language.clone(),
            match_type: candidate.match_quality,
            position: candidate.position,
        };

        self.enricher
            .enrich(&entry, kind, &candidate.description, &context)
            .await
    }

    /// Post-filters shared by the AI path and the fallback
    fn entry_allowed(
        &self,
        entry: &CatalogEntry,
        spec: &PreferenceSpec,
        blocked: &HashSet<String>,
    ) -> bool {
        if entry.adult && !spec.allow_adult {
            tracing::debug!(tmdb_id = entry.id, "Skipping adult title");
            return false;
        }

        if is_blocked(blocked, &entry.title) || is_blocked(blocked, entry.native_title()) {
            tracing::debug!(tmdb_id = entry.id, title = %entry.title, "Skipping excluded title");
            return false;
        }

        true
    }

    /// Popular catalog titles in the requested genres, languages and years
    #[instrument(skip_all)]
    async fn popularity_fallback(&self, spec: &PreferenceSpec) -> Vec<EnrichedResult> {
        if spec.genres.is_empty() {
            tracing::info!("No genres requested, fallback has nothing to search");
            return Vec::new();
        }

        let kind = spec.media_kind();
        let genres = match self.catalog.list_genres(kind).await {
            Ok(genres) => genres,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load catalog genres");
                return Vec::new();
            }
        };

        let genre_ids = resolve_genre_ids(&spec.genres, &genres);
        if genre_ids.is_empty() {
            tracing::info!(genres = ?spec.genres, "No matching catalog genres");
            return Vec::new();
        }

        let base = DiscoverQuery {
            kind,
            genre_ids,
            languages: spec.languages.clone(),
            year: spec.year,
            min_rating: spec.min_rating,
            include_adult: spec.allow_adult,
            page: *FALLBACK_PAGES.start(),
        };

        let entries = discover_pages(self.catalog.as_ref(), &base, FALLBACK_PAGES).await;
        let blocked = blocked_titles(spec);
        let mut seen = HashSet::new();

        let mut entries: Vec<CatalogEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .filter(|entry| within_year_window(entry, spec.year))
            .filter(|entry| self.entry_allowed(entry, spec, &blocked))
            .collect();

        entries.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        entries.truncate(MAX_RESULTS);

        tracing::info!(entries = entries.len(), "Fallback entries selected");

        let tasks = entries.iter().enumerate().map(|(position, entry)| {
            let context = EnrichmentContext {
                language: fallback_language(entry, &spec.languages),
                match_type: None,
                position,
            };
            async move { self.enricher.enrich(entry, kind, "", &context).await }
        });

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

fn blocked_titles(spec: &PreferenceSpec) -> HashSet<String> {
    spec.blocked_titles()
        .map(|title| normalize_title(title))
        .filter(|title| !title.is_empty())
        .collect()
}

fn normalize_title(title: &str) -> String {
    clean_title(title).to_lowercase()
}

fn is_blocked(blocked: &HashSet<String>, title: &str) -> bool {
    !blocked.is_empty() && blocked.contains(&normalize_title(title))
}

/// Entries without a release date never qualify; a single preferred year
/// keeps entries within the window
fn within_year_window(entry: &CatalogEntry, year: Option<YearPreference>) -> bool {
    let Some(release_year) = entry.release_year() else {
        return false;
    };

    match year {
        Some(YearPreference::Single(wanted)) => {
            (release_year - wanted).abs() <= FALLBACK_YEAR_WINDOW
        }
        _ => true,
    }
}

/// Catalog genre ids for user genre names, matched case-insensitively
fn resolve_genre_ids(requested: &[String], genres: &[Genre]) -> Vec<u32> {
    let mut ids = Vec::new();

    for name in requested {
        let lower = name.trim().to_lowercase();
        let aliases = GENRE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map(|(_, names)| *names)
            .unwrap_or(&[]);

        let matched = genres.iter().filter(|genre| {
            genre.name.eq_ignore_ascii_case(&lower)
                || aliases.iter().any(|alias| genre.name.eq_ignore_ascii_case(alias))
        });

        for genre in matched {
            if !ids.contains(&genre.id) {
                ids.push(genre.id);
            }
        }
    }

    ids
}

fn fallback_language(entry: &CatalogEntry, requested: &[String]) -> String {
    if requested.is_empty() || requested.contains(&entry.original_language) {
        entry.original_language.clone()
    } else {
        requested[0].clone()
    }
}
