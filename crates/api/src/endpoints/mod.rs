//! API endpoints.

mod activities;
mod feeds;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/activities", activities::router())
        .nest("/feeds", feeds::router())
        .nest("/users", users::router())
}
