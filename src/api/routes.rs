use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/state", get(handlers::get_state))
        // Filters
        .route("/options", get(handlers::get_options))
        .route("/filters", get(handlers::get_filters))
        .route(
            "/filters/:field",
            put(handlers::set_filter).delete(handlers::clear_filter),
        )
        // Search session
        .route("/search", post(handlers::search))
        .route("/session", get(handlers::get_session))
        .route("/quick-search", post(handlers::quick_search))
        // Result cards
        .route("/cards", get(handlers::get_cards))
        .route("/cards/toggle", post(handlers::toggle_card))
        .route("/cards/expand", post(handlers::expand_card))
        .route("/cards/collapse", post(handlers::collapse_card))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
