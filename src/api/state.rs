use std::sync::Arc;

use crate::services::{Explorer, SearchBackend};

/// Shared application state
///
/// One explorer per process: the presentation layer drives a single logical
/// search session.
#[derive(Clone)]
pub struct AppState {
    pub explorer: Explorer,
}

impl AppState {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            explorer: Explorer::new(backend),
        }
    }
}
