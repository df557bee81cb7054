//! Fan-out worker.

use apalis::prelude::*;
use pulse_core::FanOutService;
use tracing::{error, info};

use crate::jobs::FanOutJob;

/// Context for the fan-out worker.
#[derive(Clone)]
pub struct FanOutContext {
    pub fan_out_service: FanOutService,
}

impl FanOutContext {
    /// Create a new fan-out context.
    #[must_use]
    pub const fn new(fan_out_service: FanOutService) -> Self {
        Self { fan_out_service }
    }
}

/// Worker function for fanning activities out into follower feeds.
///
/// A returned error puts the job back on the queue for retry; the feed-item
/// unique key keeps the re-run from duplicating rows already written.
///
/// # Errors
/// Returns an error if any fan-out page fails.
pub async fn fan_out_worker(job: FanOutJob, ctx: Data<FanOutContext>) -> Result<(), Error> {
    info!(
        tenant_id = %job.tenant_id,
        activity_id = %job.activity_id,
        actor = %job.actor,
        "Fanning out activity"
    );

    match ctx
        .fan_out_service
        .fan_out(&job.tenant_id, &job.activity_id)
        .await
    {
        Ok(inserted) => {
            info!(
                activity_id = %job.activity_id,
                inserted = %inserted,
                "Fan-out finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                activity_id = %job.activity_id,
                error = %e,
                "Fan-out failed; job will be retried"
            );
            let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            Err(Error::Failed(boxed.into()))
        }
    }
}
