use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{FilterSet, MovieResult},
};

/// Lifecycle of the displayed search
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Token handed out for each issued search.
///
/// Tickets are strictly increasing in issuance order; only the newest one may
/// update the session when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// What happened to a submission once its response arrived
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Succeeded { count: usize },
    Failed { error: String },
    /// A newer submission was issued first; the response was disregarded
    Superseded,
}

/// The single search session the explorer displays
#[derive(Debug, Clone)]
pub struct SearchSession {
    filters: FilterSet,
    status: SearchStatus,
    results: Vec<MovieResult>,
    error: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
    last_issued: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            filters: FilterSet::default(),
            status: SearchStatus::Idle,
            results: Vec::new(),
            error: None,
            submitted_at: None,
            settled_at: None,
            last_issued: 0,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn results(&self) -> &[MovieResult] {
        &self.results
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a submission. Any earlier ticket stops being current.
    pub fn begin(&mut self, filters: FilterSet) -> SearchTicket {
        self.last_issued += 1;
        self.filters = filters;
        self.status = SearchStatus::Pending;
        self.error = None;
        self.submitted_at = Some(Utc::now());

        SearchTicket(self.last_issued)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.last_issued
    }

    /// Applies a settled response if `ticket` is still the newest submission.
    ///
    /// On failure the previously displayed results are kept untouched.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: AppResult<Vec<MovieResult>>,
    ) -> SearchOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                seq = ticket.0,
                latest = self.last_issued,
                "Discarding superseded search response"
            );
            return SearchOutcome::Superseded;
        }

        self.settled_at = Some(Utc::now());

        match result {
            Ok(results) => {
                let count = results.len();
                self.results = results;
                self.status = SearchStatus::Succeeded;
                SearchOutcome::Succeeded { count }
            }
            Err(e) => {
                let error = e.to_string();
                self.error = Some(error.clone());
                self.status = SearchStatus::Failed;
                SearchOutcome::Failed { error }
            }
        }
    }

    /// Headline for the results pane
    pub fn summary(&self) -> String {
        match self.status {
            SearchStatus::Failed if self.results.is_empty() => "Search failed".to_string(),
            SearchStatus::Failed => format!(
                "Search failed, showing {} earlier movies",
                self.results.len()
            ),
            _ if self.settled_at.is_none() => "Ready to search".to_string(),
            _ => format!("Found {} movies", self.results.len()),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.status,
            filters: self.filters.clone(),
            results: self.results.clone(),
            error: self.error.clone(),
            summary: self.summary(),
            submitted_at: self.submitted_at,
            settled_at: self.settled_at,
        }
    }
}

/// Serializable session state for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub status: SearchStatus,
    pub filters: FilterSet,
    pub results: Vec<MovieResult>,
    pub error: Option<String>,
    pub summary: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
}
