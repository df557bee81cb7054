//! Follow graph service.

use pulse_common::{AppError, AppResult, IdGenerator};
use pulse_db::{entities::follow, repositories::FollowRepository};
use sea_orm::Set;
use serde::Serialize;

/// Follower/following statistics, computed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct FollowStats {
    pub user_id: String,
    pub followers_count: u64,
    pub following_count: u64,
}

/// Follow graph service for business logic.
///
/// Edges are tenant-scoped and directed (follower -> followee). Self-follow
/// is permitted: a self-edge is how an actor's own activities land in their
/// own feed.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository) -> Self {
        Self {
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// Fails with [`AppError::AlreadyFollowing`] if the edge exists. The
    /// pre-check keeps the common case cheap; two racing follows of the same
    /// pair are settled by the store's unique constraint, which the
    /// repository maps to the same error.
    pub async fn follow(
        &self,
        tenant_id: &str,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<follow::Model> {
        if self
            .follow_repo
            .is_following(tenant_id, follower_id, followee_id)
            .await?
        {
            return Err(AppError::AlreadyFollowing);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            tenant_id: Set(tenant_id.to_string()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.follow_repo.create(model).await
    }

    /// Unfollow a user.
    ///
    /// Fails with [`AppError::NotFollowing`] if no edge exists.
    pub async fn unfollow(
        &self,
        tenant_id: &str,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<()> {
        let removed = self
            .follow_repo
            .delete_by_pair(tenant_id, follower_id, followee_id)
            .await?;

        if removed == 0 {
            return Err(AppError::NotFollowing);
        }

        Ok(())
    }

    /// Get followers of a user (paginated, newest edge first).
    pub async fn get_followers(
        &self,
        tenant_id: &str,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<follow::Model>> {
        let offset = page.max(1).saturating_sub(1) * limit;
        self.follow_repo
            .find_followers(tenant_id, user_id, limit, offset)
            .await
    }

    /// Get users that a user is following (paginated, newest edge first).
    pub async fn get_following(
        &self,
        tenant_id: &str,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<follow::Model>> {
        let offset = page.max(1).saturating_sub(1) * limit;
        self.follow_repo
            .find_following(tenant_id, user_id, limit, offset)
            .await
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, tenant_id: &str, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(tenant_id, user_id).await
    }

    /// Get follower/following statistics for a user.
    pub async fn follow_stats(&self, tenant_id: &str, user_id: &str) -> AppResult<FollowStats> {
        let followers_count = self.follow_repo.count_followers(tenant_id, user_id).await?;
        let following_count = self.follow_repo.count_following(tenant_id, user_id).await?;

        Ok(FollowStats {
            user_id: user_id.to_string(),
            followers_count,
            following_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

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
    async fn test_follow_already_following_returns_conflict() {
        let existing = create_test_follow("f1", "u4", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        let result = service.follow("t1", "u4", "u1").await;
        assert!(matches!(result, Err(AppError::AlreadyFollowing)));
    }

    #[tokio::test]
    async fn test_follow_creates_edge() {
        let created = create_test_follow("f1", "u4", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // pre-check finds nothing
                .append_query_results([Vec::<follow::Model>::new()])
                // insert returns the new edge
                .append_query_results([[created]])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        let follow = service.follow("t1", "u4", "u1").await.unwrap();
        assert_eq!(follow.follower_id, "u4");
        assert_eq!(follow.followee_id, "u1");
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge_returns_not_following() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        let result = service.unfollow("t1", "u4", "u1").await;
        assert!(matches!(result, Err(AppError::NotFollowing)));
    }

    #[tokio::test]
    async fn test_unfollow_removes_edge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        assert!(service.unfollow("t1", "u4", "u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_follow_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![btreemap! { "num_items" => Value::from(3i64) }],
                    vec![btreemap! { "num_items" => Value::from(7i64) }],
                ])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        let stats = service.follow_stats("t1", "u1").await.unwrap();
        assert_eq!(stats.user_id, "u1");
        assert_eq!(stats.followers_count, 3);
        assert_eq!(stats.following_count, 7);
    }

    #[tokio::test]
    async fn test_get_followers_page_offset() {
        let f1 = create_test_follow("f1", "u2", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[f1]])
                .into_connection(),
        );

        let service = FollowService::new(FollowRepository::new(db));

        // Page 0 is clamped to page 1 rather than underflowing the offset
        let result = service.get_followers("t1", "u1", 0, 50).await.unwrap();
        assert_eq!(result.len(), 1);
    }
}
