/// HTTP backend
///
/// Talks to the movie API host:
/// 1. Options: `GET /options` → `{genres, actors, directors}`
/// 2. Search: `GET /search?title=..&genre=..` → `[movie]`
/// 3. Similar: `GET /similar?id=<movie id>` → `[movie]` with `similarity`
///
/// Movie identifiers are URIs, so they travel as a query parameter rather than
/// a path segment.
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{FilterOptions, FilterSet, MovieResult},
    services::backend::SearchBackend,
};

#[derive(Clone)]
pub struct HttpSearchBackend {
    http_client: HttpClient,
    api_url: String,
    search_limit: Option<u32>,
}

impl HttpSearchBackend {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            search_limit: None,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(&config.backend_url, config.backend_timeout())?
            .with_search_limit(config.search_limit))
    }

    /// Cap on the number of results the backend returns per search
    pub fn with_search_limit(mut self, limit: Option<u32>) -> Self {
        self.search_limit = limit;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn search_params(&self, filters: &FilterSet) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = filters
            .query_pairs()
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();

        if let Some(limit) = self.search_limit {
            params.push(("limit", limit.to_string()));
        }

        params
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl SearchBackend for HttpSearchBackend {
    #[instrument(skip(self), fields(backend = "http"))]
    async fn fetch_options(&self) -> AppResult<FilterOptions> {
        let response = self.http_client.get(self.endpoint("options")).send().await?;
        let options: FilterOptions = Self::decode(response).await?;

        tracing::info!(
            genres = options.genres.len(),
            directors = options.directors.len(),
            actors = options.actors.len(),
            "Filter options fetched"
        );

        Ok(options)
    }

    #[instrument(skip(self, filters), fields(backend = "http", filter_count = filters.len()))]
    async fn search(&self, filters: &FilterSet) -> AppResult<Vec<MovieResult>> {
        let response = self
            .http_client
            .get(self.endpoint("search"))
            .query(&self.search_params(filters))
            .send()
            .await?;
        let movies: Vec<MovieResult> = Self::decode(response).await?;

        tracing::info!(results = movies.len(), "Search completed");

        Ok(movies)
    }

    #[instrument(skip(self), fields(backend = "http"))]
    async fn fetch_similar(&self, movie_id: &str) -> AppResult<Vec<MovieResult>> {
        let response = self
            .http_client
            .get(self.endpoint("similar"))
            .query(&[("id", movie_id)])
            .send()
            .await?;
        let movies: Vec<MovieResult> = Self::decode(response).await?;

        tracing::info!(results = movies.len(), "Similar movies fetched");

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
