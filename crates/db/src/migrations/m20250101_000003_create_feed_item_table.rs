//! Create feed item table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedItem::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedItem::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(FeedItem::OwnerId).string_len(256).not_null())
                    .col(ColumnDef::new(FeedItem::ActivityId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(FeedItem::ActivitySnapshot)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedItem::Score).big_integer().not_null())
                    .col(
                        ColumnDef::new(FeedItem::IsSeen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FeedItem::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FeedItem::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (tenant_id, owner_id, activity_id) - makes retried
        // fan-out a no-op for already-inserted rows
        manager
            .create_index(
                Index::create()
                    .name("idx_feed_item_tenant_owner_activity")
                    .table(FeedItem::Table)
                    .col(FeedItem::TenantId)
                    .col(FeedItem::OwnerId)
                    .col(FeedItem::ActivityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (tenant_id, owner_id, score) - the feed read path
        manager
            .create_index(
                Index::create()
                    .name("idx_feed_item_tenant_owner_score")
                    .table(FeedItem::Table)
                    .col(FeedItem::TenantId)
                    .col(FeedItem::OwnerId)
                    .col(FeedItem::Score)
                    .to_owned(),
            )
            .await?;

        // Index: activity_id (for cascade delete)
        manager
            .create_index(
                Index::create()
                    .name("idx_feed_item_activity_id")
                    .table(FeedItem::Table)
                    .col(FeedItem::ActivityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedItem::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FeedItem {
    Table,
    Id,
    TenantId,
    OwnerId,
    ActivityId,
    ActivitySnapshot,
    Score,
    IsSeen,
    IsRead,
    CreatedAt,
}
