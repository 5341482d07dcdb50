//! Complaint entity - an issue raised by a user for admins to handle.

use super::status::ComplaintStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Complaint database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaints")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Who filed it
    pub user_id: i64,
    /// One-line summary
    pub subject: String,
    /// Full description
    pub description: String,
    /// User the complaint is about, if any
    pub against_user_id: Option<i64>,
    /// Order the complaint is about, if any
    pub order_id: Option<i64>,
    /// Handling state
    pub status: ComplaintStatus,
    /// Admin's answer
    pub admin_response: Option<String>,
    /// When it was filed
    pub created_at: DateTimeUtc,
    /// When it was last updated
    pub updated_at: DateTimeUtc,
}

/// `Complaint` references users and orders by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
