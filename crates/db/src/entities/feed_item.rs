//! Feed item entity (denormalized per-owner copy of an activity).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feed_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant the item belongs to
    #[sea_orm(indexed)]
    pub tenant_id: String,

    /// The user whose feed this item lives in
    pub owner_id: String,

    /// Source activity ID
    #[sea_orm(indexed)]
    pub activity_id: String,

    /// Frozen copy of the activity taken at fan-out time. Later edits to
    /// the source activity are never reflected here.
    #[sea_orm(column_type = "JsonBinary")]
    pub activity_snapshot: Json,

    /// Activity `occurred_at` as epoch seconds; feeds sort on this
    pub score: i64,

    #[sea_orm(default_value = false)]
    pub is_seen: bool,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
