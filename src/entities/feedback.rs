//! Feedback entity - a rating and comment about the platform.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feedback database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedback")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Author
    pub user_id: i64,
    /// 1 to 5 stars
    pub rating: i32,
    /// Comment
    pub message: String,
    /// When it was submitted
    pub created_at: DateTimeUtc,
}

/// `Feedback` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
