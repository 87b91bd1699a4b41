pub mod backend;
pub mod explorer;
pub mod recommendations;
pub mod search_session;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use explorer::{Explorer, ExplorerView, OptionsView};
pub use recommendations::{RecommendationStatus, RecommendationView, ToggleOutcome};
pub use search_session::{SearchOutcome, SearchStatus, SessionView};
