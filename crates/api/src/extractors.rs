//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

/// The tenant a request runs under, resolved by the upstream auth layer.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Tenant (project) identifier.
    pub id: String,
}

/// Resolved tenant extractor.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Tenant);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get tenant from request extensions (set by tenant middleware)
        parts
            .extensions
            .get::<Tenant>()
            .cloned()
            .map(TenantContext)
            .ok_or((StatusCode::UNAUTHORIZED, "Missing tenant context"))
    }
}
