//! Activity entity (append-only event log).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ActivityVerb {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "share")]
    Share,
    #[sea_orm(string_value = "follow")]
    Follow,
    #[sea_orm(string_value = "reaction")]
    Reaction,
}

impl ActivityVerb {
    /// The wire representation of this verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Share => "share",
            Self::Follow => "follow",
            Self::Reaction => "reaction",
        }
    }
}

/// An activity is written once and never updated; the only mutation is a
/// hard delete that cascades into denormalized feed items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant the activity belongs to
    #[sea_orm(indexed)]
    pub tenant_id: String,

    /// User who performed the activity
    pub actor: String,

    /// What the actor did
    pub verb: ActivityVerb,

    /// What the activity is about
    pub object: String,

    /// Optional target of the activity
    #[sea_orm(nullable)]
    pub target: Option<String>,

    /// External correlation ID
    #[sea_orm(nullable)]
    pub foreign_id: Option<String>,

    /// When the activity happened (drives feed ordering)
    pub occurred_at: DateTimeWithTimeZone,

    /// Opaque client-supplied metadata
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
