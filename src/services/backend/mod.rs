/// Search backend abstraction
///
/// The explorer never ranks or matches anything itself. Option lists, filtered
/// search and similarity lookups are all delegated to an implementation of
/// [`SearchBackend`], which makes the transport pluggable (HTTP in production,
/// in-memory fakes in tests).
use crate::{
    error::AppResult,
    models::{FilterOptions, FilterSet, MovieResult},
};

pub mod http;

pub use http::HttpSearchBackend;

/// Trait for the search/recommendation service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch the selectable genres, directors and actors
    async fn fetch_options(&self) -> AppResult<FilterOptions>;

    /// Run a filtered search
    ///
    /// Only the fields present in `filters` are sent. An empty set asks for the
    /// backend's default result list.
    async fn search(&self, filters: &FilterSet) -> AppResult<Vec<MovieResult>>;

    /// Fetch items similar to `movie_id`; each may carry a similarity score
    async fn fetch_similar(&self, movie_id: &str) -> AppResult<Vec<MovieResult>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
