//! Course entity - a training course made of ordered lessons.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Course title
    pub title: String,
    /// What the course covers
    pub description: String,
    /// Topic (e.g., "irrigation", "soil health")
    pub category: String,
    /// Unpublished courses are visible to admins only
    pub is_published: bool,
    /// Admin who created it
    pub created_by: i64,
    /// When it was created
    pub created_at: DateTimeUtc,
    /// When it was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Course and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One course has many lessons
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lessons,
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
