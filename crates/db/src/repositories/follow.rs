//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use pulse_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and followee.
    pub async fn find_by_pair(
        &self,
        tenant_id: &str,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(
        &self,
        tenant_id: &str,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_pair(tenant_id, follower_id, followee_id)
            .await?
            .is_some())
    }

    /// Create a new follow edge.
    ///
    /// The (tenant, follower, followee) unique constraint is the arbiter for
    /// concurrent duplicate follows; a violation surfaces as
    /// [`AppError::AlreadyFollowing`].
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::AlreadyFollowing
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a follow edge by pair. Returns the number of rows removed.
    pub async fn delete_by_pair(
        &self,
        tenant_id: &str,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<u64> {
        let result = Follow::delete_many()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Get users that are following a user, newest edge first.
    pub async fn find_followers(
        &self,
        tenant_id: &str,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FolloweeId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get users that a user is following, newest edge first.
    pub async fn find_following(
        &self,
        tenant_id: &str,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a stable page of followers for fan-out enumeration.
    ///
    /// Ordered by edge ID so pages stay disjoint while new follows arrive
    /// mid-enumeration.
    pub async fn followers_page(
        &self,
        tenant_id: &str,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FolloweeId.eq(user_id))
            .order_by_asc(follow::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, tenant_id: &str, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FolloweeId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user is following.
    pub async fn count_following(&self, tenant_id: &str, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::TenantId.eq(tenant_id))
            .filter(follow::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
