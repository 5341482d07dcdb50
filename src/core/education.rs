//! Educational articles, videos and guides.

use crate::{
    entities::{ContentType, EducationContent, education_content},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields for new content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    /// Headline
    pub title: String,
    /// Text, or a description for videos
    pub body: String,
    /// Kind of material
    pub content_type: ContentType,
    /// Link to media
    #[serde(default)]
    pub media_url: Option<String>,
    /// Comma-separated tags
    #[serde(default)]
    pub tags: Option<String>,
}

/// Partial edit of content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<ContentType>,
    pub media_url: Option<String>,
    pub tags: Option<String>,
}

fn clean_tags(tags: &str) -> Option<String> {
    let joined = tags
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    Some(joined).filter(|t| !t.is_empty())
}

/// Publishes new content authored by `author_id`.
pub async fn create_content(
    db: &DatabaseConnection,
    author_id: i64,
    input: ContentInput,
) -> Result<education_content::Model> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::validation("Title cannot be empty"));
    }
    let missing_media = input
        .media_url
        .as_deref()
        .is_none_or(|u| u.trim().is_empty());
    if input.content_type == ContentType::Video && missing_media {
        return Err(Error::validation("Video content needs a media URL"));
    }

    let now = chrono::Utc::now();
    let created = education_content::ActiveModel {
        title: Set(title),
        body: Set(input.body.trim().to_string()),
        content_type: Set(input.content_type),
        media_url: Set(input.media_url.filter(|u| !u.trim().is_empty())),
        tags: Set(input.tags.as_deref().and_then(clean_tags)),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(content_id = created.id, content_type = ?created.content_type, "Published content");
    Ok(created)
}

/// Lists content, newest first, optionally of one type.
pub async fn list_content(
    db: &DatabaseConnection,
    content_type: Option<ContentType>,
) -> Result<Vec<education_content::Model>> {
    let mut query = EducationContent::find().order_by_desc(education_content::Column::Id);
    if let Some(content_type) = content_type {
        query = query.filter(education_content::Column::ContentType.eq(content_type));
    }
    query.all(db).await.map_err(Into::into)
}

/// Finds content by id.
pub async fn get_content(
    db: &DatabaseConnection,
    content_id: i64,
) -> Result<education_content::Model> {
    EducationContent::find_by_id(content_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("education content", content_id))
}

/// Applies a partial edit.
pub async fn update_content(
    db: &DatabaseConnection,
    content_id: i64,
    update: ContentUpdate,
) -> Result<education_content::Model> {
    let mut active: education_content::ActiveModel = get_content(db, content_id).await?.into();

    if let Some(title) = update.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(Error::validation("Title cannot be empty"));
        }
        active.title = Set(title);
    }
    if let Some(body) = update.body {
        active.body = Set(body.trim().to_string());
    }
    if let Some(content_type) = update.content_type {
        active.content_type = Set(content_type);
    }
    if let Some(media_url) = update.media_url {
        active.media_url = Set(Some(media_url.trim().to_string()).filter(|u| !u.is_empty()));
    }
    if let Some(tags) = update.tags {
        active.tags = Set(clean_tags(&tags));
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes content.
pub async fn delete_content(db: &DatabaseConnection, content_id: i64) -> Result<()> {
    let existing = get_content(db, content_id).await?;
    existing.delete(db).await?;
    info!(content_id, "Deleted content");
    Ok(())
}
