//! Activity endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use chrono::{DateTime, Utc};
use pulse_common::AppResult;
use pulse_core::CreateActivityInput;
use pulse_db::entities::activity::{self, ActivityVerb};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::TenantContext, middleware::AppState, response::MessageResponse};

/// Create activity request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, message = "actor is required"))]
    pub actor: String,
    pub verb: ActivityVerb,
    #[validate(length(min = 1, message = "object is required"))]
    pub object: String,
    pub target: Option<String>,
    pub foreign_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// Activity response.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: String,
    pub actor: String,
    pub verb: ActivityVerb,
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
    pub occurred_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

impl From<activity::Model> for ActivityResponse {
    fn from(a: activity::Model) -> Self {
        Self {
            id: a.id,
            actor: a.actor,
            verb: a.verb,
            object: a.object,
            target: a.target,
            foreign_id: a.foreign_id,
            occurred_at: a.occurred_at.to_rfc3339(),
            metadata: a.metadata,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Created activity envelope.
#[derive(Debug, Serialize)]
pub struct CreateActivityResponse {
    pub message: String,
    pub activity: ActivityResponse,
}

/// Create an activity and hand it to fan-out.
async fn create_activity(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Json(req): Json<CreateActivityRequest>,
) -> AppResult<(StatusCode, Json<CreateActivityResponse>)> {
    req.validate()?;

    let input = CreateActivityInput {
        actor: req.actor,
        verb: req.verb,
        object: req.object,
        target: req.target,
        foreign_id: req.foreign_id,
        occurred_at: req.occurred_at,
        metadata: req.metadata,
    };

    let activity = state.activity_service.create(&tenant.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateActivityResponse {
            message: "Activity created successfully".to_string(),
            activity: activity.into(),
        }),
    ))
}

/// Delete an activity and its feed items.
async fn delete_activity(
    TenantContext(tenant): TenantContext,
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.activity_service.delete(&tenant.id, &activity_id).await?;

    Ok(Json(MessageResponse::new("Activity deleted successfully")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_activity))
        .route("/{activity_id}", delete(delete_activity))
}
