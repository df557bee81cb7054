//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use pulse_core::{ActivityService, FeedService, FollowService};

use crate::extractors::Tenant;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub activity_service: ActivityService,
    pub follow_service: FollowService,
    pub feed_service: FeedService,
}

/// Tenant injection middleware.
///
/// The excluded auth layer resolves API keys to a tenant and forwards the
/// result in `X-Tenant-Id`; this middleware lifts it into the request
/// extensions where [`crate::extractors::TenantContext`] picks it up.
/// Requests without a resolved tenant fail at extraction with 401.
pub async fn tenant_middleware(mut req: Request<Body>, next: Next) -> Response {
    let tenant_id = req
        .headers()
        .get("X-Tenant-Id")
        .and_then(|header| header.to_str().ok())
        .filter(|tenant_id| !tenant_id.is_empty())
        .map(ToString::to_string);

    if let Some(id) = tenant_id {
        req.extensions_mut().insert(Tenant { id });
    }

    next.run(req).await
}
