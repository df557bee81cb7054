//! Fan-out job.

use serde::{Deserialize, Serialize};

/// Job to fan a committed activity out into its followers' feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutJob {
    /// Tenant the activity belongs to.
    pub tenant_id: String,

    /// The committed activity to fan out.
    pub activity_id: String,

    /// The user who performed the activity.
    pub actor: String,
}

impl FanOutJob {
    /// Create a new fan-out job.
    #[must_use]
    pub const fn new(tenant_id: String, activity_id: String, actor: String) -> Self {
        Self {
            tenant_id,
            activity_id,
            actor,
        }
    }
}
