//! Notification entity - a message for one user, created as a side effect of
//! other operations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Source of the notification (e.g., `"ORDER"`, `"VERIFICATION"`)
    pub kind: String,
    /// Flipped by the recipient
    pub is_read: bool,
    /// When it was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification has one recipient
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
