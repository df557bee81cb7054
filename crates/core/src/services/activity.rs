//! Activity log service.

use crate::services::dispatch::FanOutDispatcher;
use chrono::{DateTime, Utc};
use pulse_common::{AppError, AppResult, FanOutConfig, IdGenerator};
use pulse_db::{
    entities::activity::{self, ActivityVerb},
    repositories::{ActivityRepository, FeedItemRepository, FollowRepository},
};
use sea_orm::Set;

/// Input for creating an activity.
#[derive(Debug, Clone)]
pub struct CreateActivityInput {
    pub actor: String,
    pub verb: ActivityVerb,
    pub object: String,
    pub target: Option<String>,
    pub foreign_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// Activity log service for business logic.
///
/// The log is the source of truth: an activity commit always stands on its
/// own, and fan-out into follower feeds is a best-effort side effect handed
/// to the queue.
#[derive(Clone)]
pub struct ActivityService {
    activity_repo: ActivityRepository,
    follow_repo: FollowRepository,
    feed_item_repo: FeedItemRepository,
    dispatcher: Option<FanOutDispatcher>,
    fanout: FanOutConfig,
    id_gen: IdGenerator,
}

impl ActivityService {
    /// Create a new activity service without a fan-out dispatcher.
    #[must_use]
    pub fn new(
        activity_repo: ActivityRepository,
        follow_repo: FollowRepository,
        feed_item_repo: FeedItemRepository,
        fanout: FanOutConfig,
    ) -> Self {
        Self {
            activity_repo,
            follow_repo,
            feed_item_repo,
            dispatcher: None,
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new activity service with queue-backed fan-out.
    #[must_use]
    pub fn with_dispatcher(
        activity_repo: ActivityRepository,
        follow_repo: FollowRepository,
        feed_item_repo: FeedItemRepository,
        fanout: FanOutConfig,
        dispatcher: FanOutDispatcher,
    ) -> Self {
        Self {
            activity_repo,
            follow_repo,
            feed_item_repo,
            dispatcher: Some(dispatcher),
            fanout,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append an activity and hand it to the fan-out dispatcher.
    ///
    /// Strategy selection happens here: actors below the configured follower
    /// threshold get write-time fan-out via the queue; actors at or above it
    /// are left for read-time merging and nothing is enqueued. A dispatch
    /// failure is logged and swallowed so the committed activity is always
    /// returned to the caller.
    pub async fn create(
        &self,
        tenant_id: &str,
        input: CreateActivityInput,
    ) -> AppResult<activity::Model> {
        let now = Utc::now();
        let occurred_at = input.occurred_at.unwrap_or(now);

        let model = activity::ActiveModel {
            id: Set(self.id_gen.generate()),
            tenant_id: Set(tenant_id.to_string()),
            actor: Set(input.actor.clone()),
            verb: Set(input.verb),
            object: Set(input.object),
            target: Set(input.target),
            foreign_id: Set(input.foreign_id),
            occurred_at: Set(occurred_at.into()),
            metadata: Set(input.metadata),
            created_at: Set(now.into()),
        };

        let activity = self.activity_repo.create(model).await?;

        // A count failure must not take the committed activity down with it;
        // fall back to the write path
        let follower_count = match self
            .follow_repo
            .count_followers(tenant_id, &input.actor)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    actor = %input.actor,
                    error = %e,
                    "Failed to count followers; assuming write-time fan-out"
                );
                0
            }
        };

        if follower_count < self.fanout.threshold {
            if let Some(ref dispatcher) = self.dispatcher
                && let Err(e) = dispatcher
                    .queue_fan_out(tenant_id, &activity.id, &activity.actor)
                    .await
            {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    activity_id = %activity.id,
                    error = %e,
                    "Failed to queue fan-out"
                );
            }
        } else {
            tracing::info!(
                tenant_id = %tenant_id,
                activity_id = %activity.id,
                actor = %activity.actor,
                follower_count = %follower_count,
                threshold = %self.fanout.threshold,
                "Skipping write-time fan-out; activity served at read time"
            );
        }

        Ok(activity)
    }

    /// Get an activity by ID.
    pub async fn get(&self, tenant_id: &str, activity_id: &str) -> AppResult<activity::Model> {
        self.activity_repo
            .find_in_tenant(tenant_id, activity_id)
            .await?
            .ok_or_else(|| AppError::ActivityNotFound(activity_id.to_string()))
    }

    /// Delete an activity and cascade into the feed items referencing it.
    ///
    /// The two deletes run against independent stores and are not atomic; a
    /// crash in between leaves orphaned feed items, which the reader
    /// tolerates by rendering an unavailable placeholder.
    pub async fn delete(&self, tenant_id: &str, activity_id: &str) -> AppResult<()> {
        let activity = self
            .activity_repo
            .find_in_tenant(tenant_id, activity_id)
            .await?
            .ok_or_else(|| AppError::ActivityNotFound(activity_id.to_string()))?;

        self.activity_repo.delete(&activity.id).await?;

        let removed = self.feed_item_repo.delete_by_activity(&activity.id).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            activity_id = %activity.id,
            feed_items_removed = %removed,
            "Deleted activity and cascaded feed items"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dispatch::FanOutDispatch;
    use async_trait::async_trait;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::{Arc, Mutex};

    /// Records queued jobs instead of pushing them anywhere.
    #[derive(Debug, Clone, Default)]
    struct RecordingDispatcher {
        jobs: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    #[async_trait]
    impl FanOutDispatch for RecordingDispatcher {
        async fn queue_fan_out(
            &self,
            tenant_id: &str,
            activity_id: &str,
            actor: &str,
        ) -> AppResult<()> {
            self.jobs.lock().unwrap().push((
                tenant_id.to_string(),
                activity_id.to_string(),
                actor.to_string(),
            ));
            Ok(())
        }
    }

    fn create_test_activity(id: &str, actor: &str) -> activity::Model {
        activity::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            actor: actor.to_string(),
            verb: ActivityVerb::Post,
            object: "doc-42".to_string(),
            target: None,
            foreign_id: None,
            occurred_at: Utc::now().into(),
            metadata: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_input(actor: &str) -> CreateActivityInput {
        CreateActivityInput {
            actor: actor.to_string(),
            verb: ActivityVerb::Post,
            object: "doc-42".to_string(),
            target: None,
            foreign_id: None,
            occurred_at: None,
            metadata: None,
        }
    }

    fn service_with_follower_count(
        activity: activity::Model,
        follower_count: i64,
        dispatcher: RecordingDispatcher,
    ) -> ActivityService {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[activity]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! { "num_items" => Value::from(follower_count) },
                ]])
                .into_connection(),
        );
        let feed_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        ActivityService::with_dispatcher(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
            Arc::new(dispatcher),
        )
    }

    #[tokio::test]
    async fn test_create_below_threshold_queues_fan_out() {
        let dispatcher = RecordingDispatcher::default();
        let service =
            service_with_follower_count(create_test_activity("a1", "u1"), 2, dispatcher.clone());

        let activity = service.create("t1", test_input("u1")).await.unwrap();
        assert_eq!(activity.id, "a1");

        let jobs = dispatcher.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0], ("t1".to_string(), "a1".to_string(), "u1".to_string()));
    }

    #[tokio::test]
    async fn test_create_at_threshold_skips_fan_out() {
        let dispatcher = RecordingDispatcher::default();
        let service = service_with_follower_count(
            create_test_activity("a1", "celebrity"),
            10_000,
            dispatcher.clone(),
        );

        let activity = service.create("t1", test_input("celebrity")).await.unwrap();
        assert_eq!(activity.id, "a1");

        assert!(dispatcher.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<activity::Model>::new()])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let feed_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ActivityService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        let result = service.get("t1", "nonexistent").await;
        assert!(matches!(result, Err(AppError::ActivityNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_feed_items() {
        let activity = create_test_activity("a1", "u1");

        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[activity]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let feed_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let service = ActivityService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        assert!(service.delete("t1", "a1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_returns_not_found() {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<activity::Model>::new()])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let feed_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ActivityService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        let result = service.delete("t1", "nonexistent").await;
        assert!(matches!(result, Err(AppError::ActivityNotFound(_))));
    }
}
