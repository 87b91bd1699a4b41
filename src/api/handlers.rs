use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{FilterField, FilterSet},
    services::{
        ExplorerView, OptionsView, RecommendationView, SearchOutcome, SessionView, ToggleOutcome,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SetFilterRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub movie_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub movie_id: String,
    pub recommendation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuickSearchRequest {
    pub field: FilterField,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
    pub card: RecommendationView,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Full explorer state
pub async fn get_state(State(state): State<AppState>) -> Json<ExplorerView> {
    Json(state.explorer.view().await)
}

/// Filter option lists for the dropdowns
pub async fn get_options(State(state): State<AppState>) -> Json<OptionsView> {
    Json(state.explorer.options().await)
}

/// Current filter selections
pub async fn get_filters(State(state): State<AppState>) -> Json<FilterSet> {
    Json(state.explorer.filters().await)
}

/// Set one filter field; a blank value clears it
pub async fn set_filter(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(request): Json<SetFilterRequest>,
) -> AppResult<Json<FilterSet>> {
    let field: FilterField = field.parse()?;
    state.explorer.set_filter(field, request.value).await;
    Ok(Json(state.explorer.filters().await))
}

/// Clear one filter field
pub async fn clear_filter(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> AppResult<Json<FilterSet>> {
    let field: FilterField = field.parse()?;
    state.explorer.clear_filter(field).await;
    Ok(Json(state.explorer.filters().await))
}

/// Submit the current filters
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<SearchResponse> {
    tracing::info!(request_id = %request_id, "Processing search request");

    let outcome = state.explorer.submit().await;
    let session = state.explorer.session().await;

    Json(SearchResponse { outcome, session })
}

/// Current search session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.explorer.session().await)
}

/// Recommendation state of every displayed result
pub async fn get_cards(State(state): State<AppState>) -> Json<Vec<RecommendationView>> {
    Json(state.explorer.cards().await)
}

/// Show or hide one card's recommendations
pub async fn toggle_card(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let outcome = state.explorer.toggle(&request.movie_id).await?;
    let card = state.explorer.card(&request.movie_id).await?;
    Ok(Json(ToggleResponse { outcome, card }))
}

/// Expand one recommendation inside a card
pub async fn expand_card(
    State(state): State<AppState>,
    Json(request): Json<ExpandRequest>,
) -> AppResult<Json<RecommendationView>> {
    state
        .explorer
        .expand(&request.movie_id, &request.recommendation_id)
        .await?;
    Ok(Json(state.explorer.card(&request.movie_id).await?))
}

/// Collapse whichever recommendation is expanded inside a card
pub async fn collapse_card(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> AppResult<Json<RecommendationView>> {
    state.explorer.collapse(&request.movie_id).await?;
    Ok(Json(state.explorer.card(&request.movie_id).await?))
}

/// Re-seed a person filter from a result and search immediately
pub async fn quick_search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<QuickSearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    tracing::info!(
        request_id = %request_id,
        field = %request.field,
        "Processing quick search request"
    );

    let outcome = state
        .explorer
        .quick_search(request.field, request.value)
        .await?;
    let session = state.explorer.session().await;

    Ok(Json(SearchResponse { outcome, session }))
}
