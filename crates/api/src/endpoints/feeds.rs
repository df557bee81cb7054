//! Feed endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use pulse_common::AppResult;
use pulse_core::{AggregatedActivity, FeedPage};
use serde::{Deserialize, Serialize};

use crate::{extractors::TenantContext, middleware::AppState, response::MessageResponse};

/// Feed pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    25
}

/// Aggregated feed response.
#[derive(Debug, Serialize)]
pub struct AggregatedFeedResponse {
    pub activities: Vec<AggregatedActivity>,
    pub count: usize,
}

/// Mark seen/read request.
#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    pub item_ids: Vec<String>,
}

/// Get a user's feed page.
async fn get_feed(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedPage>> {
    let limit = query.limit.min(100);
    let feed = state
        .feed_service
        .get_feed_items(&tenant.id, &user_id, query.page, limit)
        .await?;

    Ok(Json(feed))
}

/// Get a user's feed page grouped by verb.
async fn get_aggregated_feed(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<AggregatedFeedResponse>> {
    let limit = query.limit.min(100);
    let activities = state
        .feed_service
        .get_aggregated_feed(&tenant.id, &user_id, query.page, limit)
        .await?;

    Ok(Json(AggregatedFeedResponse {
        count: activities.len(),
        activities,
    }))
}

/// Mark feed items as seen.
async fn mark_seen(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<MarkRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .feed_service
        .mark_seen(&tenant.id, &user_id, &req.item_ids)
        .await?;

    Ok(Json(MessageResponse::new("Items marked as seen")))
}

/// Mark feed items as read.
async fn mark_read(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<MarkRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .feed_service
        .mark_read(&tenant.id, &user_id, &req.item_ids)
        .await?;

    Ok(Json(MessageResponse::new("Items marked as read")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_feed))
        .route("/{user_id}/aggregated", get(get_aggregated_feed))
        .route("/{user_id}/seen", post(mark_seen))
        .route("/{user_id}/read", post(mark_read))
}
