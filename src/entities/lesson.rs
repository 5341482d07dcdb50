//! Lesson entity - one step of a course.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lesson database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lessons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent course
    pub course_id: i64,
    /// Lesson title
    pub title: String,
    /// Lesson body
    pub content: String,
    /// Optional video link
    pub video_url: Option<String>,
    /// Sort key within the course
    pub position: i32,
    /// When it was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Lesson and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each lesson belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
