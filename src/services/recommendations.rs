//! Per-card similarity recommendations.
//!
//! Each displayed result owns a [`RecommendationEntry`]. The similarity lookup
//! runs at most once per card; afterwards `toggle` only flips visibility over
//! the cached list. A failed lookup is cached as an empty list for the rest of
//! the card's lifetime and is never retried.
//!
//! Entries live on a [`RecommendationBoard`] that is rebuilt wholesale whenever
//! a new result list is displayed. The board's generation tags in-flight
//! lookups so a response for an unmounted card is dropped on arrival.
use serde::Serialize;
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::MovieResult,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Collapsed,
    Loading,
    Shown,
}

/// Result of a `toggle` as seen by the caller
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Shown,
    Collapsed,
    /// A lookup for this card is already in flight
    Ignored,
    /// The card was unmounted before its lookup settled
    Stale,
}

/// Next step after a state transition on one card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    Done(ToggleOutcome),
    /// The card moved to `loading`; the caller must run the lookup
    Fetch,
}

#[derive(Debug, Clone)]
pub struct RecommendationEntry {
    movie_id: String,
    status: RecommendationStatus,
    /// `None` until the first lookup settles
    cached: Option<Vec<MovieResult>>,
    expanded: Option<String>,
    error: Option<String>,
}

impl RecommendationEntry {
    pub fn new(movie_id: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            status: RecommendationStatus::Collapsed,
            cached: None,
            expanded: None,
            error: None,
        }
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub fn status(&self) -> RecommendationStatus {
        self.status
    }

    pub fn recommendations(&self) -> &[MovieResult] {
        self.cached.as_deref().unwrap_or_default()
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toggle(&mut self) -> ToggleStep {
        match self.status {
            RecommendationStatus::Shown => {
                self.status = RecommendationStatus::Collapsed;
                ToggleStep::Done(ToggleOutcome::Collapsed)
            }
            RecommendationStatus::Loading => ToggleStep::Done(ToggleOutcome::Ignored),
            RecommendationStatus::Collapsed if self.cached.is_some() => {
                self.status = RecommendationStatus::Shown;
                ToggleStep::Done(ToggleOutcome::Shown)
            }
            RecommendationStatus::Collapsed => {
                self.status = RecommendationStatus::Loading;
                ToggleStep::Fetch
            }
        }
    }

    /// Stores the settled lookup and shows the list. A failure is cached as
    /// "no recommendations".
    pub fn complete_fetch(&mut self, result: AppResult<Vec<MovieResult>>) {
        if self.status != RecommendationStatus::Loading {
            return;
        }

        match result {
            Ok(recommendations) => self.cached = Some(recommendations),
            Err(e) => {
                self.error = Some(e.to_string());
                self.cached = Some(Vec::new());
            }
        }
        self.status = RecommendationStatus::Shown;
    }

    /// Expands one recommendation, collapsing whichever was expanded before
    pub fn expand(&mut self, recommendation_id: &str) -> AppResult<()> {
        if !self.recommendations().iter().any(|r| r.id == recommendation_id) {
            return Err(AppError::InvalidInput(format!(
                "{} is not a recommendation of {}",
                recommendation_id, self.movie_id
            )));
        }

        self.expanded = Some(recommendation_id.to_string());
        Ok(())
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    pub fn view(&self) -> RecommendationView {
        RecommendationView {
            movie_id: self.movie_id.clone(),
            status: self.status,
            recommendations: self.recommendations().to_vec(),
            expanded: self.expanded.clone(),
            error: self.error.clone(),
        }
    }
}

/// Serializable card state for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub movie_id: String,
    pub status: RecommendationStatus,
    pub recommendations: Vec<MovieResult>,
    pub expanded: Option<String>,
    pub error: Option<String>,
}

/// Recommendation entries for the currently displayed result list
#[derive(Debug, Default)]
pub struct RecommendationBoard {
    generation: u64,
    order: Vec<String>,
    entries: HashMap<String, RecommendationEntry>,
}

impl RecommendationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discards every card and mounts a fresh collapsed one per result
    pub fn replace(&mut self, generation: u64, results: &[MovieResult]) {
        self.generation = generation;
        self.order.clear();
        self.entries.clear();

        for result in results {
            if self.entries.contains_key(&result.id) {
                continue;
            }
            self.order.push(result.id.clone());
            self.entries
                .insert(result.id.clone(), RecommendationEntry::new(&result.id));
        }
    }

    pub fn get(&self, movie_id: &str) -> AppResult<&RecommendationEntry> {
        self.entries
            .get(movie_id)
            .ok_or_else(|| AppError::NotFound(format!("No result card for {}", movie_id)))
    }

    pub fn get_mut(&mut self, movie_id: &str) -> AppResult<&mut RecommendationEntry> {
        self.entries
            .get_mut(movie_id)
            .ok_or_else(|| AppError::NotFound(format!("No result card for {}", movie_id)))
    }

    /// Applies a settled lookup. Returns `false` when the card it was issued
    /// for has been unmounted in the meantime.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        movie_id: &str,
        result: AppResult<Vec<MovieResult>>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        match self.entries.get_mut(movie_id) {
            Some(entry) => {
                entry.complete_fetch(result);
                true
            }
            None => false,
        }
    }

    pub fn views(&self) -> Vec<RecommendationView> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(RecommendationEntry::view)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str) -> MovieResult {
        MovieResult {
            id: id.to_string(),
            title: format!("Movie {}", id),
            year: Some("2001".to_string()),
            runtime: None,
            genres: vec!["Drama".to_string()],
            directors: vec!["John_Doe".to_string()],
            actors: vec![],
            similarity: Some(0.5),
        }
    }

    #[test]
    fn test_first_toggle_requests_lookup() {
        let mut entry = RecommendationEntry::new("tt001");
        assert_eq!(entry.status(), RecommendationStatus::Collapsed);

        assert_eq!(entry.toggle(), ToggleStep::Fetch);
        assert_eq!(entry.status(), RecommendationStatus::Loading);
    }

    #[test]
    fn test_toggle_while_loading_is_ignored() {
        let mut entry = RecommendationEntry::new("tt001");
        entry.toggle();

        assert_eq!(entry.toggle(), ToggleStep::Done(ToggleOutcome::Ignored));
        assert_eq!(entry.status(), RecommendationStatus::Loading);
    }

    #[test]
    fn test_cached_list_is_reused_across_toggles() {
        let mut entry = RecommendationEntry::new("tt001");
        entry.toggle();
        entry.complete_fetch(Ok(vec![movie("tt002"), movie("tt003")]));
        assert_eq!(entry.status(), RecommendationStatus::Shown);

        assert_eq!(entry.toggle(), ToggleStep::Done(ToggleOutcome::Collapsed));
        assert_eq!(entry.recommendations().len(), 2);

        assert_eq!(entry.toggle(), ToggleStep::Done(ToggleOutcome::Shown));
        assert_eq!(entry.recommendations().len(), 2);
    }

    #[test]
    fn test_failed_lookup_is_cached_as_empty() {
        let mut entry = RecommendationEntry::new("tt001");
        entry.toggle();
        entry.complete_fetch(Err(AppError::ExternalApi("500".to_string())));

        assert_eq!(entry.status(), RecommendationStatus::Shown);
        assert!(entry.is_cached());
        assert!(entry.recommendations().is_empty());
        assert!(entry.error().is_some());

        entry.toggle();
        assert_eq!(entry.toggle(), ToggleStep::Done(ToggleOutcome::Shown));
    }

    #[test]
    fn test_expand_keeps_at_most_one_open() {
        let mut entry = RecommendationEntry::new("tt001");
        entry.toggle();
        entry.complete_fetch(Ok(vec![movie("x"), movie("y")]));

        entry.expand("x").unwrap();
        entry.expand("y").unwrap();
        assert_eq!(entry.expanded(), Some("y"));

        entry.collapse();
        assert_eq!(entry.expanded(), None);
    }

    #[test]
    fn test_expand_unknown_recommendation_is_rejected() {
        let mut entry = RecommendationEntry::new("tt001");
        assert!(entry.expand("missing").is_err());
        assert_eq!(entry.expanded(), None);
    }

    #[test]
    fn test_board_replace_discards_previous_cards() {
        let mut board = RecommendationBoard::new();
        board.replace(1, &[movie("a"), movie("b")]);
        board.get_mut("a").unwrap().toggle();

        board.replace(2, &[movie("a")]);

        assert_eq!(board.len(), 1);
        assert_eq!(
            board.get("a").unwrap().status(),
            RecommendationStatus::Collapsed
        );
        assert!(matches!(board.get("b"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_board_drops_lookup_for_unmounted_generation() {
        let mut board = RecommendationBoard::new();
        board.replace(1, &[movie("a")]);
        board.get_mut("a").unwrap().toggle();
        board.replace(2, &[movie("a")]);

        assert!(!board.complete_fetch(1, "a", Ok(vec![movie("z")])));
        assert!(!board.get("a").unwrap().is_cached());
    }

    #[test]
    fn test_board_views_follow_result_order() {
        let mut board = RecommendationBoard::new();
        board.replace(1, &[movie("c"), movie("a"), movie("c"), movie("b")]);

        let ids: Vec<String> = board.views().into_iter().map(|v| v.movie_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
