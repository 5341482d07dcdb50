//! Subsidy entity - a government support program farmers can apply to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subsidy database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subsidies")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the subsidy
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Program name
    pub title: String,
    /// What the program offers
    pub description: String,
    /// Support amount per approved application
    pub amount: f64,
    /// Who may apply, as free text
    pub eligibility: Option<String>,
    /// Applications close at this instant, if set
    pub deadline: Option<DateTimeUtc>,
    /// Switched off programs accept no applications
    pub is_active: bool,
    /// Official who published it
    pub created_by: i64,
    /// When the subsidy was published
    pub created_at: DateTimeUtc,
    /// When the subsidy was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Subsidy and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One subsidy receives many applications
    #[sea_orm(has_many = "super::subsidy_application::Entity")]
    Applications,
}

impl Related<super::subsidy_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
