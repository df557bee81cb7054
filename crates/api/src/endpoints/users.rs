//! Follow graph endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use pulse_common::AppResult;
use pulse_core::FollowStats;
use pulse_db::entities::follow;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::TenantContext, middleware::AppState, response::MessageResponse};

/// Follow request body.
#[derive(Debug, Deserialize, Validate)]
pub struct FollowRequest {
    #[validate(length(min = 1, message = "follower is required"))]
    pub follower: String,
}

/// Unfollow query parameters.
#[derive(Debug, Deserialize)]
pub struct UnfollowQuery {
    pub follower: String,
}

/// Follow list pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    50
}

/// Follow edge response.
#[derive(Debug, Serialize)]
pub struct FollowItemResponse {
    pub id: String,
    pub follower: String,
    pub following: String,
    pub created_at: String,
}

impl From<follow::Model> for FollowItemResponse {
    fn from(f: follow::Model) -> Self {
        Self {
            id: f.id,
            follower: f.follower_id,
            following: f.followee_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Created follow envelope.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub follow: FollowItemResponse,
}

/// Followers listing response.
#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    pub followers: Vec<FollowItemResponse>,
    pub count: usize,
}

/// Following listing response.
#[derive(Debug, Serialize)]
pub struct FollowingResponse {
    pub following: Vec<FollowItemResponse>,
    pub count: usize,
}

/// Follow a user.
async fn follow(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<FollowRequest>,
) -> AppResult<(StatusCode, Json<FollowResponse>)> {
    req.validate()?;

    let follow = state
        .follow_service
        .follow(&tenant.id, &req.follower, &user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FollowResponse {
            message: "Successfully followed user".to_string(),
            follow: follow.into(),
        }),
    ))
}

/// Unfollow a user.
async fn unfollow(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<UnfollowQuery>,
) -> AppResult<Json<MessageResponse>> {
    state
        .follow_service
        .unfollow(&tenant.id, &query.follower, &user_id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully unfollowed user")))
}

/// Get followers of a user.
async fn followers(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<Json<FollowersResponse>> {
    let limit = query.limit.min(100);
    let followers = state
        .follow_service
        .get_followers(&tenant.id, &user_id, query.page, limit)
        .await?;

    Ok(Json(FollowersResponse {
        count: followers.len(),
        followers: followers.into_iter().map(Into::into).collect(),
    }))
}

/// Get users that a user is following.
async fn following(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<Json<FollowingResponse>> {
    let limit = query.limit.min(100);
    let following = state
        .follow_service
        .get_following(&tenant.id, &user_id, query.page, limit)
        .await?;

    Ok(Json(FollowingResponse {
        count: following.len(),
        following: following.into_iter().map(Into::into).collect(),
    }))
}

/// Get follower/following statistics.
async fn follow_stats(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<FollowStats>> {
    let stats = state.follow_service.follow_stats(&tenant.id, &user_id).await?;

    Ok(Json(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/follow", post(follow).delete(unfollow))
        .route("/{user_id}/followers", get(followers))
        .route("/{user_id}/following", get(following))
        .route("/{user_id}/follow-stats", get(follow_stats))
}
