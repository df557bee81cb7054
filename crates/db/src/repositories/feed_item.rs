//! Feed item repository.

use std::sync::Arc;

use crate::entities::{FeedItem, feed_item};
use pulse_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Feed item repository for database operations.
#[derive(Clone)]
pub struct FeedItemRepository {
    db: Arc<DatabaseConnection>,
}

impl FeedItemRepository {
    /// Create a new feed item repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Bulk-insert feed items, skipping rows whose (tenant, owner, activity)
    /// key already exists.
    ///
    /// This is what makes a retried fan-out page safe: rows from an earlier
    /// attempt are left untouched and only missing rows are added. Returns
    /// the number of rows actually inserted.
    pub async fn insert_many(&self, models: Vec<feed_item::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        let result = FeedItem::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    feed_item::Column::TenantId,
                    feed_item::Column::OwnerId,
                    feed_item::Column::ActivityId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await;

        match result {
            Ok(rows) => Ok(rows),
            // Every row conflicted; the page was already fanned out
            Err(DbErr::RecordNotInserted) => Ok(0),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Get a page of feed items for an owner, highest score first.
    pub async fn find_by_owner(
        &self,
        tenant_id: &str,
        owner_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<feed_item::Model>> {
        FeedItem::find()
            .filter(feed_item::Column::TenantId.eq(tenant_id))
            .filter(feed_item::Column::OwnerId.eq(owner_id))
            .order_by_desc(feed_item::Column::Score)
            .order_by_desc(feed_item::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count feed items owned by a user.
    pub async fn count_by_owner(&self, tenant_id: &str, owner_id: &str) -> AppResult<u64> {
        FeedItem::find()
            .filter(feed_item::Column::TenantId.eq(tenant_id))
            .filter(feed_item::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark the given items as seen.
    ///
    /// Only rows owned by `owner_id` match; ids that do not exist or belong
    /// to someone else are skipped without error. Returns the number of rows
    /// updated.
    pub async fn mark_seen(
        &self,
        tenant_id: &str,
        owner_id: &str,
        item_ids: &[String],
    ) -> AppResult<u64> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let result = FeedItem::update_many()
            .filter(feed_item::Column::TenantId.eq(tenant_id))
            .filter(feed_item::Column::OwnerId.eq(owner_id))
            .filter(feed_item::Column::Id.is_in(item_ids.iter().map(String::as_str)))
            .col_expr(feed_item::Column::IsSeen, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Mark the given items as read. Read implies seen.
    ///
    /// Same silent-ignore semantics as [`Self::mark_seen`].
    pub async fn mark_read(
        &self,
        tenant_id: &str,
        owner_id: &str,
        item_ids: &[String],
    ) -> AppResult<u64> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let result = FeedItem::update_many()
            .filter(feed_item::Column::TenantId.eq(tenant_id))
            .filter(feed_item::Column::OwnerId.eq(owner_id))
            .filter(feed_item::Column::Id.is_in(item_ids.iter().map(String::as_str)))
            .col_expr(feed_item::Column::IsRead, true.into())
            .col_expr(feed_item::Column::IsSeen, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete every feed item that references an activity. Returns the
    /// number of rows removed.
    pub async fn delete_by_activity(&self, activity_id: &str) -> AppResult<u64> {
        let result = FeedItem::delete_many()
            .filter(feed_item::Column::ActivityId.eq(activity_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_item(id: &str, owner_id: &str, activity_id: &str, score: i64) -> feed_item::Model {
        feed_item::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            owner_id: owner_id.to_string(),
            activity_id: activity_id.to_string(),
            activity_snapshot: json!({
                "id": activity_id,
                "actor": "u1",
                "verb": "post",
                "object": "doc-42",
            }),
            score,
            is_seen: false,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_insert_many_empty_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = FeedItemRepository::new(db);
        let inserted = repo.insert_many(vec![]).await.unwrap();

        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let i1 = create_test_item("i1", "user2", "a1", 200);
        let i2 = create_test_item("i2", "user2", "a2", 100);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[i1, i2]])
                .into_connection(),
        );

        let repo = FeedItemRepository::new(db);
        let result = repo.find_by_owner("t1", "user2", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].score, 200);
    }

    #[tokio::test]
    async fn test_mark_seen_empty_ids_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = FeedItemRepository::new(db);
        let updated = repo.mark_seen("t1", "user2", &[]).await.unwrap();

        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn test_mark_read_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = FeedItemRepository::new(db);
        let updated = repo
            .mark_read("t1", "user2", &["i1".to_string(), "i2".to_string()])
            .await
            .unwrap();

        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_delete_by_activity() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = FeedItemRepository::new(db);
        let removed = repo.delete_by_activity("a1").await.unwrap();

        assert_eq!(removed, 3);
    }
}
