//! Activity repository.

use std::sync::Arc;

use crate::entities::{Activity, activity};
use pulse_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Activity repository for database operations.
#[derive(Clone)]
pub struct ActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityRepository {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an activity by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<activity::Model>> {
        Activity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an activity by ID within a tenant.
    pub async fn find_in_tenant(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> AppResult<Option<activity::Model>> {
        Activity::find_by_id(id)
            .filter(activity::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a new activity.
    pub async fn create(&self, model: activity::ActiveModel) -> AppResult<activity::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an activity. Returns the number of rows removed.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Activity::delete_many()
            .filter(activity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::activity::ActivityVerb;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_activity(id: &str, tenant_id: &str, actor: &str) -> activity::Model {
        activity::Model {
            id: id.to_string(),
            tenant_id: tenant_id.to_string(),
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

    #[tokio::test]
    async fn test_find_by_id_found() {
        let activity = create_test_activity("a1", "t1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[activity.clone()]])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let result = repo.find_by_id("a1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "a1");
        assert_eq!(found.actor, "u1");
        assert_eq!(found.verb, ActivityVerb::Post);
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<activity::Model>::new()])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let result = repo.find_by_id("nonexistent").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let rows = repo.delete("a1").await.unwrap();

        assert_eq!(rows, 1);
    }
}
