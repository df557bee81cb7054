//! Fan-out dispatch seam.
//!
//! Provides an abstraction for handing an activity off to the fan-out
//! workers. The actual implementation is provided by the queue crate.

use async_trait::async_trait;
use pulse_common::AppResult;
use std::sync::Arc;

/// Trait for queueing fan-out work.
///
/// This allows the core services to enqueue fan-out jobs without directly
/// depending on the queue implementation. Delivery is at-least-once: a job
/// may run more than once, and the feed-item unique key absorbs the repeats.
#[async_trait]
pub trait FanOutDispatch: Send + Sync {
    /// Queue write-time fan-out for a freshly committed activity.
    ///
    /// # Arguments
    /// * `tenant_id` - The tenant the activity belongs to
    /// * `activity_id` - The ID of the committed activity
    /// * `actor` - The user who performed the activity
    async fn queue_fan_out(&self, tenant_id: &str, activity_id: &str, actor: &str)
    -> AppResult<()>;
}

/// Shared handle to a fan-out dispatcher.
pub type FanOutDispatcher = Arc<dyn FanOutDispatch>;

/// Dispatcher that drops every job.
///
/// Used when the queue backend is disabled (tests, offline tooling).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

#[async_trait]
impl FanOutDispatch for NullDispatcher {
    async fn queue_fan_out(
        &self,
        tenant_id: &str,
        activity_id: &str,
        _actor: &str,
    ) -> AppResult<()> {
        tracing::debug!(
            tenant_id = %tenant_id,
            activity_id = %activity_id,
            "Fan-out dispatch disabled; dropping job"
        );
        Ok(())
    }
}
