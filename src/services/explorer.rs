use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{FilterField, FilterOptions, FilterSet, FilterState, OptionChoice},
    services::{
        backend::SearchBackend,
        recommendations::{RecommendationBoard, RecommendationView, ToggleOutcome, ToggleStep},
        search_session::{SearchOutcome, SearchSession, SearchTicket, SessionView},
    },
};

/// Client-side interaction engine for the movie explorer
///
/// Owns the filter state, the single active search session and the
/// recommendation cards of the displayed results. All state sits behind one
/// lock; backend calls are awaited outside of it and their responses are
/// applied only if they still belong to the current submission or card.
#[derive(Clone)]
pub struct Explorer {
    backend: Arc<dyn SearchBackend>,
    inner: Arc<RwLock<ExplorerState>>,
}

#[derive(Default)]
struct ExplorerState {
    options: FilterOptions,
    options_loaded: bool,
    options_error: Option<String>,
    filters: FilterState,
    session: SearchSession,
    board: RecommendationBoard,
}

impl ExplorerState {
    fn begin_search(&mut self) -> (SearchTicket, FilterSet) {
        let filters = self.filters.snapshot();
        let ticket = self.session.begin(filters.clone());
        (ticket, filters)
    }
}

/// Dropdown data plus whether it has been loaded
#[derive(Debug, Clone, Serialize)]
pub struct OptionsView {
    pub loaded: bool,
    pub error: Option<String>,
    pub genres: Vec<OptionChoice>,
    pub directors: Vec<OptionChoice>,
    pub actors: Vec<OptionChoice>,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerView {
    pub options: OptionsView,
    pub filters: FilterSet,
    pub session: SessionView,
    pub cards: Vec<RecommendationView>,
}

impl Explorer {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(RwLock::new(ExplorerState::default())),
        }
    }

    /// Fetches the filter option lists.
    ///
    /// A failure is not fatal: the options stay empty and filter entry and
    /// search keep working.
    pub async fn load_options(&self) -> FilterOptions {
        match self.backend.fetch_options().await {
            Ok(options) => {
                let mut state = self.inner.write().await;
                state.options = options.clone();
                state.options_loaded = true;
                state.options_error = None;
                options
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.backend.name(),
                    "Failed to fetch filter options"
                );
                let mut state = self.inner.write().await;
                state.options_error = Some(e.to_string());
                state.options.clone()
            }
        }
    }

    pub async fn options(&self) -> OptionsView {
        let state = self.inner.read().await;
        Self::options_view(&state)
    }

    fn options_view(state: &ExplorerState) -> OptionsView {
        OptionsView {
            loaded: state.options_loaded,
            error: state.options_error.clone(),
            genres: state.options.choices(FilterField::Genre),
            directors: state.options.choices(FilterField::Director),
            actors: state.options.choices(FilterField::Actor),
        }
    }

    pub async fn set_filter(&self, field: FilterField, value: impl Into<String>) {
        self.inner.write().await.filters.set(field, value);
    }

    pub async fn clear_filter(&self, field: FilterField) {
        self.inner.write().await.filters.clear(field);
    }

    /// Current filter selections
    pub async fn filters(&self) -> FilterSet {
        self.inner.read().await.filters.snapshot()
    }

    /// Submits the current filters as a new search.
    ///
    /// Never fails: the outcome says whether the response was displayed,
    /// reported as a failure, or disregarded because a newer submission was
    /// issued before it arrived.
    pub async fn submit(&self) -> SearchOutcome {
        let (ticket, filters) = self.inner.write().await.begin_search();
        self.run_search(ticket, filters).await
    }

    /// Re-seeds `field` from a name shown inside a result and searches
    /// immediately.
    ///
    /// `value` is used verbatim (underscore-encoded). Card expansion state is
    /// left alone.
    pub async fn quick_search(
        &self,
        field: FilterField,
        value: impl Into<String>,
    ) -> AppResult<SearchOutcome> {
        if !field.is_person() {
            return Err(AppError::InvalidInput(format!(
                "Quick search is only available for director and actor, not {}",
                field
            )));
        }

        let value = value.into();
        tracing::info!(field = %field, value = %value, "Quick search");

        let (ticket, filters) = {
            let mut state = self.inner.write().await;
            state.filters.set(field, value);
            state.begin_search()
        };

        Ok(self.run_search(ticket, filters).await)
    }

    /// Backend call and completion run on a spawned task: the session leaves
    /// `pending` even when the caller is dropped mid-flight.
    async fn run_search(&self, ticket: SearchTicket, filters: FilterSet) -> SearchOutcome {
        tracing::info!(
            seq = ticket.seq(),
            filter_count = filters.len(),
            "Search submitted"
        );

        let explorer = self.clone();
        let task = tokio::spawn(async move { explorer.settle_search(ticket, filters).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(seq = ticket.seq(), error = %e, "Search task failed");
                self.inner
                    .write()
                    .await
                    .session
                    .complete(ticket, Err(AppError::Internal(e.to_string())))
            }
        }
    }

    async fn settle_search(&self, ticket: SearchTicket, filters: FilterSet) -> SearchOutcome {
        let result = self.backend.search(&filters).await;
        if let Err(e) = &result {
            tracing::warn!(
                seq = ticket.seq(),
                error = %e,
                backend = self.backend.name(),
                "Search failed"
            );
        }

        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        let outcome = state.session.complete(ticket, result);

        if let SearchOutcome::Succeeded { count } = outcome {
            state.board.replace(ticket.seq(), state.session.results());
            tracing::info!(seq = ticket.seq(), results = count, "Search results displayed");
        }

        outcome
    }

    pub async fn session(&self) -> SessionView {
        self.inner.read().await.session.view()
    }

    /// Shows or hides the recommendations of one displayed result.
    ///
    /// The first reveal runs the similarity lookup; later toggles reuse the
    /// cached list. Toggling while the lookup is in flight is ignored. The
    /// lookup settles on its own task and the card leaves `loading` even when
    /// the caller is dropped.
    pub async fn toggle(&self, movie_id: &str) -> AppResult<ToggleOutcome> {
        let (generation, step) = {
            let mut state = self.inner.write().await;
            let generation = state.board.generation();
            (generation, state.board.get_mut(movie_id)?.toggle())
        };

        match step {
            ToggleStep::Done(outcome) => Ok(outcome),
            ToggleStep::Fetch => {
                let explorer = self.clone();
                let id = movie_id.to_string();
                let task =
                    tokio::spawn(async move { explorer.settle_similar(generation, &id).await });

                match task.await {
                    Ok(outcome) => Ok(outcome),
                    Err(e) => {
                        tracing::error!(movie_id = %movie_id, error = %e, "Similarity task failed");
                        let mut state = self.inner.write().await;
                        state.board.complete_fetch(
                            generation,
                            movie_id,
                            Err(AppError::Internal(e.to_string())),
                        );
                        Ok(ToggleOutcome::Stale)
                    }
                }
            }
        }
    }

    async fn settle_similar(&self, generation: u64, movie_id: &str) -> ToggleOutcome {
        tracing::debug!(movie_id = %movie_id, "Fetching similar movies");
        let result = self.backend.fetch_similar(movie_id).await;
        if let Err(e) = &result {
            tracing::warn!(
                movie_id = %movie_id,
                error = %e,
                backend = self.backend.name(),
                "Similarity lookup failed, caching empty recommendations"
            );
        }

        let mut state = self.inner.write().await;
        if state.board.complete_fetch(generation, movie_id, result) {
            ToggleOutcome::Shown
        } else {
            tracing::debug!(movie_id = %movie_id, "Dropping lookup for unmounted card");
            ToggleOutcome::Stale
        }
    }

    pub async fn expand(&self, movie_id: &str, recommendation_id: &str) -> AppResult<()> {
        self.inner
            .write()
            .await
            .board
            .get_mut(movie_id)?
            .expand(recommendation_id)
    }

    pub async fn collapse(&self, movie_id: &str) -> AppResult<()> {
        self.inner.write().await.board.get_mut(movie_id)?.collapse();
        Ok(())
    }

    pub async fn card(&self, movie_id: &str) -> AppResult<RecommendationView> {
        Ok(self.inner.read().await.board.get(movie_id)?.view())
    }

    pub async fn cards(&self) -> Vec<RecommendationView> {
        self.inner.read().await.board.views()
    }

    pub async fn view(&self) -> ExplorerView {
        let state = self.inner.read().await;
        ExplorerView {
            options: Self::options_view(&state),
            filters: state.filters.snapshot(),
            session: state.session.view(),
            cards: state.board.views(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::MovieResult,
        services::{
            backend::MockSearchBackend, recommendations::RecommendationStatus,
            search_session::SearchStatus,
        },
    };
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    fn movie(id: &str) -> MovieResult {
        MovieResult {
            id: id.to_string(),
            title: format!("Movie {}", id),
            year: Some("1999".to_string()),
            runtime: Some("136".to_string()),
            genres: vec!["Drama".to_string()],
            directors: vec!["John_Doe".to_string()],
            actors: vec!["Jane_Roe".to_string()],
            similarity: None,
        }
    }

    fn explorer(mock: MockSearchBackend) -> Explorer {
        Explorer::new(Arc::new(mock))
    }

    fn mock_backend() -> MockSearchBackend {
        let mut mock = MockSearchBackend::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn test_options_load_single_genre() {
        let mut mock = mock_backend();
        mock.expect_fetch_options().times(1).returning(|| {
            Ok(FilterOptions {
                genres: vec!["Drama".to_string()],
                directors: vec![],
                actors: vec![],
            })
        });
        let explorer = explorer(mock);

        explorer.load_options().await;
        let options = explorer.options().await;

        assert!(options.loaded);
        assert_eq!(options.genres.len(), 1);
        assert_eq!(options.genres[0].value, "Drama");
        assert!(options.directors.is_empty());
        assert!(options.actors.is_empty());
    }

    #[tokio::test]
    async fn test_options_failure_degrades_to_empty() {
        let mut mock = mock_backend();
        mock.expect_fetch_options()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));
        mock.expect_search().times(1).returning(|_| Ok(vec![movie("tt001")]));
        let explorer = explorer(mock);

        let options = explorer.load_options().await;
        assert_eq!(options, FilterOptions::default());

        let view = explorer.options().await;
        assert!(!view.loaded);
        assert!(view.error.is_some());

        explorer.set_filter(FilterField::Title, "Matrix").await;
        assert_eq!(
            explorer.submit().await,
            SearchOutcome::Succeeded { count: 1 }
        );
    }

    #[tokio::test]
    async fn test_empty_submit_sends_no_filters() {
        let mut mock = mock_backend();
        mock.expect_search()
            .withf(|filters: &FilterSet| filters.is_empty())
            .times(1)
            .returning(|_| Ok(vec![movie("tt001"), movie("tt002")]));
        let explorer = explorer(mock);

        let outcome = explorer.submit().await;

        assert_eq!(outcome, SearchOutcome::Succeeded { count: 2 });
        let session = explorer.session().await;
        assert_eq!(session.status, SearchStatus::Succeeded);
        assert_eq!(session.results.len(), 2);
        assert_eq!(session.summary, "Found 2 movies");
        assert_eq!(explorer.cards().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_search_is_reported_not_fabricated() {
        let mut mock = mock_backend();
        mock.expect_search()
            .returning(|_| Err(AppError::ExternalApi("API returned status 500".to_string())));
        let explorer = explorer(mock);

        let outcome = explorer.submit().await;

        assert!(matches!(outcome, SearchOutcome::Failed { .. }));
        let session = explorer.session().await;
        assert_eq!(session.status, SearchStatus::Failed);
        assert!(session.results.is_empty());
        assert!(explorer.cards().await.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_fetched_at_most_once() {
        let mut mock = mock_backend();
        mock.expect_search().returning(|_| Ok(vec![movie("tt001")]));
        mock.expect_fetch_similar()
            .with(eq("tt001"))
            .times(1)
            .returning(|_| Ok(vec![movie("tt100"), movie("tt200")]));
        let explorer = explorer(mock);
        explorer.submit().await;

        assert_eq!(assert_ok!(explorer.toggle("tt001").await), ToggleOutcome::Shown);
        assert_ok!(explorer.expand("tt001", "tt100").await);
        assert_eq!(assert_ok!(explorer.toggle("tt001").await), ToggleOutcome::Collapsed);
        assert_ok!(explorer.collapse("tt001").await);
        assert_eq!(assert_ok!(explorer.toggle("tt001").await), ToggleOutcome::Shown);
        assert_ok!(explorer.expand("tt001", "tt200").await);
        assert_eq!(assert_ok!(explorer.toggle("tt001").await), ToggleOutcome::Collapsed);

        let card = explorer.card("tt001").await.unwrap();
        assert_eq!(card.recommendations.len(), 2);
        assert_eq!(card.expanded.as_deref(), Some("tt200"));
    }

    #[tokio::test]
    async fn test_empty_similarity_result_is_cached() {
        let mut mock = mock_backend();
        mock.expect_search().returning(|_| Ok(vec![movie("tt001")]));
        mock.expect_fetch_similar()
            .with(eq("tt001"))
            .times(1)
            .returning(|_| Ok(vec![]));
        let explorer = explorer(mock);
        explorer.submit().await;

        assert_eq!(explorer.toggle("tt001").await.unwrap(), ToggleOutcome::Shown);
        let card = explorer.card("tt001").await.unwrap();
        assert_eq!(card.status, RecommendationStatus::Shown);
        assert!(card.recommendations.is_empty());

        assert_eq!(explorer.toggle("tt001").await.unwrap(), ToggleOutcome::Collapsed);
        assert_eq!(explorer.toggle("tt001").await.unwrap(), ToggleOutcome::Shown);
        assert!(explorer.card("tt001").await.unwrap().recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_failure_cached_without_retry() {
        let mut mock = mock_backend();
        mock.expect_search().returning(|_| Ok(vec![movie("tt001")]));
        mock.expect_fetch_similar()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("timeout".to_string())));
        let explorer = explorer(mock);
        explorer.submit().await;

        assert_eq!(explorer.toggle("tt001").await.unwrap(), ToggleOutcome::Shown);
        let card = explorer.card("tt001").await.unwrap();
        assert!(card.recommendations.is_empty());
        assert!(card.error.unwrap().contains("timeout"));

        explorer.toggle("tt001").await.unwrap();
        assert_eq!(explorer.toggle("tt001").await.unwrap(), ToggleOutcome::Shown);
    }

    #[tokio::test]
    async fn test_toggle_unknown_card_is_not_found() {
        let explorer = explorer(mock_backend());

        assert!(matches!(
            explorer.toggle("nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_quick_search_keeps_encoded_value() {
        let mut mock = mock_backend();
        mock.expect_search()
            .withf(|filters: &FilterSet| {
                filters.len() == 2
                    && filters.get(FilterField::Director) == Some("John_Doe")
                    && filters.get(FilterField::Genre) == Some("Drama")
            })
            .times(1)
            .returning(|_| Ok(vec![movie("tt009")]));
        let explorer = explorer(mock);
        explorer.set_filter(FilterField::Genre, "Drama").await;

        let outcome = explorer
            .quick_search(FilterField::Director, "John_Doe")
            .await
            .unwrap();

        assert_eq!(outcome, SearchOutcome::Succeeded { count: 1 });
        assert_eq!(
            explorer.filters().await.get(FilterField::Director),
            Some("John_Doe")
        );
    }

    #[tokio::test]
    async fn test_quick_search_rejects_non_person_fields() {
        let mut mock = mock_backend();
        mock.expect_search().never();
        let explorer = explorer(mock);

        assert!(matches!(
            explorer.quick_search(FilterField::Genre, "Drama").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(explorer.filters().await.is_empty());
    }
}
