//! Redis-backed fan-out dispatch implementation.
//!
//! This module provides a Redis-based implementation of the `FanOutDispatch`
//! trait that queues jobs for the apalis worker to process.

use async_trait::async_trait;
use pulse_common::{AppError, AppResult};
use pulse_core::FanOutDispatch;

use crate::jobs::FanOutJob;

/// Redis-backed fan-out dispatcher.
///
/// Queues fan-out jobs to Redis for processing by the apalis fan-out
/// worker.
#[derive(Clone)]
pub struct RedisFanOutDispatcher {
    /// Redis storage for job queue (apalis-redis).
    storage: apalis_redis::RedisStorage<FanOutJob>,
}

impl RedisFanOutDispatcher {
    /// Create a new Redis fan-out dispatcher.
    #[must_use]
    pub const fn new(storage: apalis_redis::RedisStorage<FanOutJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl FanOutDispatch for RedisFanOutDispatcher {
    async fn queue_fan_out(
        &self,
        tenant_id: &str,
        activity_id: &str,
        actor: &str,
    ) -> AppResult<()> {
        use apalis::prelude::*;

        let job = FanOutJob::new(
            tenant_id.to_string(),
            activity_id.to_string(),
            actor.to_string(),
        );

        self.storage
            .clone()
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to queue fan-out job: {e}")))?;

        tracing::debug!(
            tenant_id = %tenant_id,
            activity_id = %activity_id,
            "Queued fan-out job"
        );

        Ok(())
    }
}
