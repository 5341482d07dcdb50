//! Education content entity - standalone articles, videos and guides.

use super::status::ContentType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Education content database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "education_content")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline
    pub title: String,
    /// Body text or summary
    pub body: String,
    /// Article, video or guide
    pub content_type: ContentType,
    /// Link to the video or attachment
    pub media_url: Option<String>,
    /// Comma-separated tags
    pub tags: Option<String>,
    /// Admin who published it
    pub author_id: i64,
    /// When it was published
    pub created_at: DateTimeUtc,
    /// When it was last edited
    pub updated_at: DateTimeUtc,
}

/// `EducationContent` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
