//! Movie metadata catalog abstraction
//!
//! The matcher, the enricher and the popularity fallback all talk to the
//! catalog through this trait, so tests can swap TMDB for a mock.

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{CatalogDetails, CatalogEntry, DiscoverQuery, Genre, MediaKind, TitleSearch},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for metadata catalogs
///
/// Implementations own their transport retry policy; callers treat an `Err`
/// as final.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search titles by name, optionally narrowed by year and original language
    async fn search_titles(&self, search: &TitleSearch) -> AppResult<Vec<CatalogEntry>>;

    /// Fetch the detail payload (credits and external ids included)
    async fn get_details(&self, id: u64, kind: MediaKind) -> AppResult<CatalogDetails>;

    /// One page of popularity-sorted discovery
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<CatalogEntry>>;

    /// Genre id/name table for a media kind
    async fn list_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Runs `discover` over several pages concurrently.
///
/// Failed pages are logged and skipped; results keep page order.
#[instrument(skip(provider, base), fields(provider = provider.name()))]
pub async fn discover_pages(
    provider: &dyn CatalogProvider,
    base: &DiscoverQuery,
    pages: std::ops::RangeInclusive<u32>,
) -> Vec<CatalogEntry> {
    let queries: Vec<DiscoverQuery> = pages
        .map(|page| DiscoverQuery {
            page,
            ..base.clone()
        })
        .collect();

    let responses =
        futures::future::join_all(queries.iter().map(|query| provider.discover(query))).await;

    let mut entries = Vec::new();
    let mut failed = 0usize;

    for (query, response) in queries.iter().zip(responses) {
        match response {
            Ok(page) => entries.extend(page),
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "Discover page failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        tracing::warn!(
            success_count = queries.len() - failed,
            error_count = failed,
            "Partial discover failure"
        );
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn base_query() -> DiscoverQuery {
        DiscoverQuery {
            kind: MediaKind::Movie,
            genre_ids: vec![878],
            languages: vec![],
            year: None,
            min_rating: None,
            include_adult: false,
            page: 1,
        }
    }

    #[tokio::test]
    async fn test_discover_pages_skips_failed_pages() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_discover().times(3).returning(|query| {
            if query.page == 2 {
                Err(AppError::CatalogLookup("boom".to_string()))
            } else {
                Ok(vec![CatalogEntry {
                    id: u64::from(query.page),
                    ..Default::default()
                }])
            }
        });

        let entries = discover_pages(&provider, &base_query(), 1..=3).await;
        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
