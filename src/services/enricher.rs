use std::sync::Arc;

use crate::{
    models::{CatalogEntry, EnrichedResult, MatchQuality, MediaKind, ResultType},
    services::providers::CatalogProvider,
};

const TMDB_WEB_URL: &str = "https://www.themoviedb.org";
const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";
const CAST_LIMIT: usize = 5;

/// Per-candidate values carried onto the enriched result
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentContext {
    pub language: String,
    pub match_type: Option<MatchQuality>,
    pub position: usize,
}

/// Turns a matched catalog entry into a client-facing result
#[derive(Clone)]
pub struct DetailEnricher {
    catalog: Arc<dyn CatalogProvider>,
    image_base_url: String,
}

impl DetailEnricher {
    pub fn new(catalog: Arc<dyn CatalogProvider>, image_base_url: String) -> Self {
        Self {
            catalog,
            image_base_url,
        }
    }

    /// Fetches details and builds the result; `None` if the fetch fails.
    ///
    /// A non-blank `ai_description` replaces the catalog overview.
    pub async fn enrich(
        &self,
        entry: &CatalogEntry,
        kind: MediaKind,
        ai_description: &str,
        context: &EnrichmentContext,
    ) -> Option<EnrichedResult> {
        let details = match self.catalog.get_details(entry.id, kind).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    provider = self.catalog.name(),
                    tmdb_id = entry.id,
                    title = %entry.title,
                    error = %e,
                    "Failed to fetch catalog details"
                );
                return None;
            }
        };

        let overview = [
            Some(ai_description),
            entry.overview.as_deref(),
            details.overview.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string();

        let poster_path = details
            .poster_path
            .as_deref()
            .or(entry.poster_path.as_deref())
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p));

        let imdb_id = details.imdb_id().map(str::to_string);
        let imdb_url = imdb_id
            .as_ref()
            .map(|id| format!("{}/{}", IMDB_TITLE_URL, id));

        let title = if entry.title.is_empty() {
            entry.native_title().to_string()
        } else {
            entry.title.clone()
        };

        Some(EnrichedResult {
            id: entry.id.to_string(),
            title,
            overview,
            poster_path,
            release_date: entry.release_date().map(str::to_string),
            genres: details.genre_names(),
            original_language: entry.original_language.clone(),
            vote_average: entry.vote_average,
            cast: details.top_cast(CAST_LIMIT),
            director: details.director().unwrap_or_default().to_string(),
            imdb_id,
            tmdb_id: entry.id.to_string(),
            tmdb_url: format!("{}/{}/{}", TMDB_WEB_URL, kind, entry.id),
            imdb_url,
            relevance_position: context.position,
            media_type: kind,
            result_type: ResultType::from(kind),
            language: context.language.clone(),
            match_type: context.match_type,
        })
    }
}
