//! Write-time fan-out executor.

use pulse_common::{AppError, AppResult, FanOutConfig, IdGenerator};
use pulse_db::{
    entities::feed_item,
    repositories::{ActivityRepository, FeedItemRepository, FollowRepository},
};
use sea_orm::Set;
use std::time::Duration;

/// Executes write-time fan-out for a single activity.
///
/// Runs on the queue workers, off the request path. Followers are
/// enumerated in pages to bound memory, each page is bulk-inserted with the
/// (tenant, owner, activity) unique key absorbing rows an earlier attempt
/// already wrote, and a failed page errors the job so the queue retries it.
/// Pages inserted before the failure are never rolled back.
#[derive(Clone)]
pub struct FanOutService {
    activity_repo: ActivityRepository,
    follow_repo: FollowRepository,
    feed_item_repo: FeedItemRepository,
    config: FanOutConfig,
    id_gen: IdGenerator,
}

impl FanOutService {
    /// Create a new fan-out service.
    #[must_use]
    pub fn new(
        activity_repo: ActivityRepository,
        follow_repo: FollowRepository,
        feed_item_repo: FeedItemRepository,
        config: FanOutConfig,
    ) -> Self {
        Self {
            activity_repo,
            follow_repo,
            feed_item_repo,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Fan an activity out into every follower's feed.
    ///
    /// Returns the number of feed items inserted. An activity that no
    /// longer exists is a successful no-op: it was deleted between commit
    /// and job execution, and fanning it out would only recreate rows the
    /// cascade delete already removed.
    pub async fn fan_out(&self, tenant_id: &str, activity_id: &str) -> AppResult<u64> {
        let Some(activity) = self
            .activity_repo
            .find_in_tenant(tenant_id, activity_id)
            .await?
        else {
            tracing::info!(
                tenant_id = %tenant_id,
                activity_id = %activity_id,
                "Activity gone before fan-out; nothing to do"
            );
            return Ok(0);
        };

        // Frozen copy; feed items never see later changes to the activity
        let snapshot = serde_json::to_value(&activity)
            .map_err(|e| AppError::Internal(format!("Failed to snapshot activity: {e}")))?;
        let score = activity.occurred_at.timestamp();

        let page_timeout = Duration::from_secs(self.config.page_timeout_secs);
        let mut offset = 0u64;
        let mut inserted = 0u64;

        loop {
            let page = tokio::time::timeout(
                page_timeout,
                self.follow_repo.followers_page(
                    tenant_id,
                    &activity.actor,
                    self.config.page_size,
                    offset,
                ),
            )
            .await
            .map_err(|_| {
                AppError::Unavailable(format!(
                    "Fan-out follower page timed out after {}s",
                    self.config.page_timeout_secs
                ))
            })??;

            if page.is_empty() {
                break;
            }

            let now = chrono::Utc::now();
            let models: Vec<feed_item::ActiveModel> = page
                .iter()
                .map(|edge| feed_item::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    tenant_id: Set(tenant_id.to_string()),
                    owner_id: Set(edge.follower_id.clone()),
                    activity_id: Set(activity.id.clone()),
                    activity_snapshot: Set(snapshot.clone()),
                    score: Set(score),
                    is_seen: Set(false),
                    is_read: Set(false),
                    created_at: Set(now.into()),
                })
                .collect();

            let page_len = models.len();
            inserted += tokio::time::timeout(page_timeout, self.feed_item_repo.insert_many(models))
                .await
                .map_err(|_| {
                    AppError::Unavailable(format!(
                        "Fan-out insert page timed out after {}s",
                        self.config.page_timeout_secs
                    ))
                })??;

            if (page_len as u64) < self.config.page_size {
                break;
            }
            offset += self.config.page_size;
        }

        tracing::debug!(
            tenant_id = %tenant_id,
            activity_id = %activity.id,
            actor = %activity.actor,
            inserted = %inserted,
            "Fan-out complete"
        );

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_db::entities::activity::{self, ActivityVerb};
    use pulse_db::entities::follow;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

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

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_fan_out_inserts_one_item_per_follower() {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_activity("a1", "u1")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_follow("f1", "u2", "u1"),
                    create_test_follow("f2", "u3", "u1"),
                ]])
                .into_connection(),
        );
        let feed_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let service = FanOutService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        let inserted = service.fan_out("t1", "a1").await.unwrap();
        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_fan_out_missing_activity_is_noop() {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<activity::Model>::new()])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let feed_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FanOutService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        let inserted = service.fan_out("t1", "deleted").await.unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_fan_out_no_followers() {
        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_activity("a1", "loner")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );
        let feed_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FanOutService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            FanOutConfig::default(),
        );

        let inserted = service.fan_out("t1", "a1").await.unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_fan_out_pages_through_followers() {
        // Two followers with a page size of one forces two full pages and a
        // final empty probe
        let config = FanOutConfig {
            page_size: 1,
            ..FanOutConfig::default()
        };

        let activity_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_activity("a1", "u1")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![create_test_follow("f1", "u2", "u1")],
                    vec![create_test_follow("f2", "u3", "u1")],
                    Vec::<follow::Model>::new(),
                ])
                .into_connection(),
        );
        let feed_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = FanOutService::new(
            ActivityRepository::new(activity_db),
            FollowRepository::new(follow_db),
            FeedItemRepository::new(feed_db),
            config,
        );

        let inserted = service.fan_out("t1", "a1").await.unwrap();
        assert_eq!(inserted, 2);
    }
}
