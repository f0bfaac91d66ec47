//! TMDB (The Movie Database) catalog provider
//!
//! Plain GETs authenticated with the `api_key` query parameter. Every call
//! goes through one retry loop: 5xx, 429, timeouts and connection errors are
//! retried with exponential backoff, anything else fails immediately.
//!
//! Endpoints:
//! - `/search/{movie|tv}` for title lookups
//! - `/{movie|tv}/{id}?append_to_response=credits,external_ids` for details
//! - `/discover/{movie|tv}` for the popularity fallback
//! - `/genre/{movie|tv}/list` for genre name resolution

use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        CatalogDetails, CatalogEntry, CatalogPage, DiscoverQuery, Genre, GenreList, MediaKind,
        TitleSearch, YearPreference,
    },
    services::providers::CatalogProvider,
};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_MS: u64 = 1000;
const RESPONSE_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    max_attempts: u32,
    retry_base: Duration,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
        }
    }

    /// Builds a provider with the configured timeout and retry policy
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.catalog_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.tmdb_api_key.clone(),
            api_url: config.tmdb_api_url.clone(),
            max_attempts: config.catalog_max_attempts.max(1),
            retry_base: Duration::from_millis(config.catalog_retry_base_ms),
        })
    }

    /// Overrides the retry policy (attempts are clamped to at least one)
    pub fn with_retry(mut self, max_attempts: u32, retry_base: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_base = retry_base;
        self
    }

    /// GET `path` and decode the JSON body, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), path);
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.retry_base * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            let result = self
                .http_client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(params)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    return response.json::<T>().await.map_err(|e| {
                        AppError::CatalogLookup(format!("Invalid TMDB response for {}: {}", path, e))
                    });
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    last_error = format!("TMDB API returned status {}: {}", status, body);

                    if !is_retryable_status(status) {
                        return Err(AppError::CatalogLookup(last_error));
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_error = format!("TMDB request failed: {}", e);
                }
                Err(e) => {
                    return Err(AppError::CatalogLookup(format!("TMDB request failed: {}", e)));
                }
            }

            tracing::warn!(
                path = %path,
                attempt = attempt + 1,
                max_attempts = self.max_attempts,
                error = %last_error,
                "TMDB request failed"
            );
        }

        Err(AppError::CatalogLookup(last_error))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn search_params(search: &TitleSearch) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("query", search.query.clone()),
        ("language", RESPONSE_LANGUAGE.to_string()),
        ("include_adult", "false".to_string()),
        ("page", "1".to_string()),
    ];

    if let Some(year) = search.year {
        let key = match search.kind {
            MediaKind::Movie => "year",
            MediaKind::Tv => "first_air_date_year",
        };
        params.push((key, year.to_string()));
    }

    if !search.languages.is_empty() {
        params.push(("with_original_language", search.languages.join("|")));
    }

    params
}

fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("language", RESPONSE_LANGUAGE.to_string()),
        ("sort_by", "popularity.desc".to_string()),
        ("include_adult", query.include_adult.to_string()),
        ("page", query.page.to_string()),
    ];

    if !query.genre_ids.is_empty() {
        let ids: Vec<String> = query.genre_ids.iter().map(u32::to_string).collect();
        params.push(("with_genres", ids.join("|")));
    }

    if !query.languages.is_empty() {
        params.push(("with_original_language", query.languages.join("|")));
    }

    match (query.year, query.kind) {
        (Some(YearPreference::Single(year)), MediaKind::Movie) => {
            params.push(("primary_release_year", year.to_string()));
        }
        (Some(YearPreference::Single(year)), MediaKind::Tv) => {
            params.push(("first_air_date_year", year.to_string()));
        }
        (Some(YearPreference::Range(start, end)), kind) => {
            let (gte, lte) = match kind {
                MediaKind::Movie => ("primary_release_date.gte", "primary_release_date.lte"),
                MediaKind::Tv => ("first_air_date.gte", "first_air_date.lte"),
            };
            params.push((gte, format!("{}-01-01", start)));
            params.push((lte, format!("{}-12-31", end)));
        }
        (None, _) => {}
    }

    if let Some(rating) = query.min_rating {
        params.push(("vote_average.gte", rating.to_string()));
    }

    params
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_titles(&self, search: &TitleSearch) -> AppResult<Vec<CatalogEntry>> {
        if search.query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let path = format!("search/{}", search.kind);
        let page: CatalogPage = self.get_json(&path, &search_params(search)).await?;

        tracing::debug!(
            query = %search.query,
            year = ?search.year,
            results_count = page.results.len(),
            "TMDB title search completed"
        );

        Ok(page.results)
    }

    async fn get_details(&self, id: u64, kind: MediaKind) -> AppResult<CatalogDetails> {
        let path = format!("{}/{}", kind, id);
        let params = [
            ("language", RESPONSE_LANGUAGE.to_string()),
            ("append_to_response", "credits,external_ids".to_string()),
        ];

        self.get_json(&path, &params).await
    }

    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<CatalogEntry>> {
        let path = format!("discover/{}", query.kind);
        let page: CatalogPage = self.get_json(&path, &discover_params(query)).await?;

        tracing::debug!(
            page = query.page,
            total_pages = page.total_pages,
            results_count = page.results.len(),
            "TMDB discover page fetched"
        );

        Ok(page.results)
    }

    async fn list_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        let path = format!("genre/{}/list", kind);
        let params = [("language", RESPONSE_LANGUAGE.to_string())];
        let list: GenreList = self.get_json(&path, &params).await?;
        Ok(list.genres)
    }

    fn name(&self) -> &'static str {
        "TMDB"
    }
}
