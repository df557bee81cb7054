//! Create follow table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Follow::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Follow::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(Follow::FollowerId).string_len(256).not_null())
                    .col(ColumnDef::new(Follow::FolloweeId).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Follow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (tenant_id, follower_id, followee_id) - at most one
        // edge per pair; concurrent duplicate follows resolve here
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_tenant_follower_followee")
                    .table(Follow::Table)
                    .col(Follow::TenantId)
                    .col(Follow::FollowerId)
                    .col(Follow::FolloweeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (tenant_id, followee_id) - listing/counting followers
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_tenant_followee")
                    .table(Follow::Table)
                    .col(Follow::TenantId)
                    .col(Follow::FolloweeId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for pagination)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_created_at")
                    .table(Follow::Table)
                    .col(Follow::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follow {
    Table,
    Id,
    TenantId,
    FollowerId,
    FolloweeId,
    CreatedAt,
}
