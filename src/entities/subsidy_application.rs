//! Subsidy application entity - a farmer's request against a subsidy.

use super::status::ReviewStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subsidy application database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subsidy_applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the application
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Program applied to
    pub subsidy_id: i64,
    /// Applicant
    pub farmer_id: i64,
    /// Applicant's note to the reviewer
    pub note: Option<String>,
    /// Review state
    pub status: ReviewStatus,
    /// Reviewer's reply
    pub reply: Option<String>,
    /// Official who reviewed it
    pub reviewed_by: Option<i64>,
    /// When the farmer applied
    pub created_at: DateTimeUtc,
    /// When the application was last touched
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between SubsidyApplication and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each application targets one subsidy
    #[sea_orm(
        belongs_to = "super::subsidy::Entity",
        from = "Column::SubsidyId",
        to = "super::subsidy::Column::Id"
    )]
    Subsidy,
}

impl Related<super::subsidy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsidy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
