//! Verification entity - an identity check request tied to a user.

use super::status::ReviewStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verifications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User asking to be verified
    pub user_id: i64,
    /// Kind of document (e.g., "NATIONAL_ID", "LAND_RECORD")
    pub document_type: String,
    /// Number printed on the document
    pub document_number: String,
    /// Link to a scan of the document
    pub document_url: Option<String>,
    /// Review state
    pub status: ReviewStatus,
    /// Reviewer's remarks
    pub remarks: Option<String>,
    /// Admin who reviewed it
    pub reviewed_by: Option<i64>,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
    /// When the request was reviewed
    pub reviewed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Verification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to one user
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
