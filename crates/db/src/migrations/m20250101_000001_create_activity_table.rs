//! Create activity table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activity::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activity::TenantId).string_len(64).not_null())
                    .col(ColumnDef::new(Activity::Actor).string_len(256).not_null())
                    .col(ColumnDef::new(Activity::Verb).string_len(16).not_null())
                    .col(ColumnDef::new(Activity::Object).string_len(1024).not_null())
                    .col(ColumnDef::new(Activity::Target).string_len(1024))
                    .col(ColumnDef::new(Activity::ForeignId).string_len(256))
                    .col(
                        ColumnDef::new(Activity::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activity::Metadata).json_binary())
                    .col(
                        ColumnDef::new(Activity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (tenant_id, actor) - fan-out looks up activities per actor
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_tenant_actor")
                    .table(Activity::Table)
                    .col(Activity::TenantId)
                    .col(Activity::Actor)
                    .to_owned(),
            )
            .await?;

        // Index: occurred_at (for chronological scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_occurred_at")
                    .table(Activity::Table)
                    .col(Activity::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Activity {
    Table,
    Id,
    TenantId,
    Actor,
    Verb,
    Object,
    Target,
    ForeignId,
    OccurredAt,
    Metadata,
    CreatedAt,
}
