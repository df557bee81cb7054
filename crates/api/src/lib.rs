//! HTTP API layer for pulse-feed.
//!
//! This crate provides the REST surface of the feed engine:
//!
//! - **Endpoints**: activity writes, feed reads, follow graph mutations
//! - **Extractors**: resolved tenant context
//! - **Middleware**: tenant injection, application state
//!
//! Built on Axum 0.8 with Tower middleware stack. Authentication and
//! API-key resolution live upstream; by the time a request reaches this
//! crate its tenant has already been resolved.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use extractors::{Tenant, TenantContext};
pub use middleware::{AppState, tenant_middleware};
