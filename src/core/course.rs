//! Training courses and their lessons.

use crate::{
    entities::{Course, Lesson, course, lesson},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fields for a new course.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    /// Course title
    pub title: String,
    /// Summary
    pub description: String,
    /// Topic, e.g. `"irrigation"`
    pub category: String,
    /// Visible to non-admins
    #[serde(default)]
    pub is_published: bool,
}

/// Partial edit of a course.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

/// Fields for a new lesson.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInput {
    /// Lesson title
    pub title: String,
    /// Lesson text
    pub content: String,
    /// Optional video link
    #[serde(default)]
    pub video_url: Option<String>,
    /// Sort key; appended after the last lesson when absent
    #[serde(default)]
    pub position: Option<i32>,
}

/// A course together with its ordered lessons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithLessons {
    /// The course
    #[serde(flatten)]
    pub course: course::Model,
    /// Lessons ordered by position
    pub lessons: Vec<lesson::Model>,
}

fn non_empty(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

/// Creates a course.
pub async fn create_course(
    db: &DatabaseConnection,
    created_by: i64,
    input: CourseInput,
) -> Result<course::Model> {
    let now = chrono::Utc::now();
    let created = course::ActiveModel {
        title: Set(non_empty(&input.title, "Title")?),
        description: Set(input.description.trim().to_string()),
        category: Set(non_empty(&input.category, "Category")?.to_lowercase()),
        is_published: Set(input.is_published),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(course_id = created.id, "Created course");
    Ok(created)
}

/// Lists courses, newest first. Unpublished ones only when `include_unpublished`.
pub async fn list_courses(
    db: &DatabaseConnection,
    include_unpublished: bool,
) -> Result<Vec<course::Model>> {
    let mut query = Course::find().order_by_desc(course::Column::Id);
    if !include_unpublished {
        query = query.filter(course::Column::IsPublished.eq(true));
    }
    query.all(db).await.map_err(Into::into)
}

/// Loads a course with its lessons. Unpublished courses look missing unless
/// `include_unpublished` is set.
pub async fn get_course(
    db: &DatabaseConnection,
    course_id: i64,
    include_unpublished: bool,
) -> Result<CourseWithLessons> {
    let found = Course::find_by_id(course_id)
        .one(db)
        .await?
        .filter(|c| include_unpublished || c.is_published)
        .ok_or_else(|| Error::not_found("course", course_id))?;

    let lessons = found
        .find_related(Lesson)
        .order_by_asc(lesson::Column::Position)
        .order_by_asc(lesson::Column::Id)
        .all(db)
        .await?;

    Ok(CourseWithLessons {
        course: found,
        lessons,
    })
}

/// Applies a partial edit to a course.
pub async fn update_course(
    db: &DatabaseConnection,
    course_id: i64,
    update: CourseUpdate,
) -> Result<course::Model> {
    let existing = Course::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))?;
    let mut active: course::ActiveModel = existing.into();

    if let Some(title) = update.title {
        active.title = Set(non_empty(&title, "Title")?);
    }
    if let Some(description) = update.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(category) = update.category {
        active.category = Set(non_empty(&category, "Category")?.to_lowercase());
    }
    if let Some(is_published) = update.is_published {
        active.is_published = Set(is_published);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a course and its lessons.
pub async fn delete_course(db: &DatabaseConnection, course_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Course::find_by_id(course_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))?;

    let removed = Lesson::delete_many()
        .filter(lesson::Column::CourseId.eq(course_id))
        .exec(&txn)
        .await?
        .rows_affected;
    existing.delete(&txn).await?;

    txn.commit().await?;
    info!(course_id, lessons = removed, "Deleted course");
    Ok(())
}

/// Adds a lesson to a course.
pub async fn add_lesson(
    db: &DatabaseConnection,
    course_id: i64,
    input: LessonInput,
) -> Result<lesson::Model> {
    let parent = Course::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))?;

    let position = match input.position {
        Some(position) if position < 0 => {
            return Err(Error::validation("Position cannot be negative"));
        }
        Some(position) => position,
        None => {
            let last = parent
                .find_related(Lesson)
                .order_by_desc(lesson::Column::Position)
                .one(db)
                .await?;
            last.map_or(1, |l| l.position + 1)
        }
    };

    let created = lesson::ActiveModel {
        course_id: Set(course_id),
        title: Set(non_empty(&input.title, "Title")?),
        content: Set(input.content.trim().to_string()),
        video_url: Set(input.video_url.filter(|u| !u.trim().is_empty())),
        position: Set(position),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(course_id, lesson_id = created.id, position, "Added lesson");
    Ok(created)
}

/// Removes one lesson.
pub async fn delete_lesson(db: &DatabaseConnection, course_id: i64, lesson_id: i64) -> Result<()> {
    let result = Lesson::delete_many()
        .filter(lesson::Column::Id.eq(lesson_id))
        .filter(lesson::Column::CourseId.eq(course_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("lesson", lesson_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;

    fn course_input(title: &str, is_published: bool) -> CourseInput {
        CourseInput {
            title: title.to_string(),
            description: "Basics".to_string(),
            category: "Soil".to_string(),
            is_published,
        }
    }

    fn lesson_input(title: &str, position: Option<i32>) -> LessonInput {
        LessonInput {
            title: title.to_string(),
            content: "Read this".to_string(),
            video_url: None,
            position,
        }
    }

    #[tokio::test]
    async fn test_published_filter() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "Admin", Role::Admin).await?;
        let draft = create_course(&db, admin.id, course_input("Draft", false)).await?;
        create_course(&db, admin.id, course_input("Soil health", true)).await?;

        assert_eq!(list_courses(&db, false).await?.len(), 1);
        assert_eq!(list_courses(&db, true).await?.len(), 2);

        let hidden = get_course(&db, draft.id, false).await;
        assert!(matches!(hidden, Err(Error::NotFound { .. })));
        assert_eq!(get_course(&db, draft.id, true).await?.course.category, "soil");

        let published = update_course(
            &db,
            draft.id,
            CourseUpdate {
                is_published: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert!(published.is_published);
        Ok(())
    }

    #[tokio::test]
    async fn test_lessons_ordered_by_position() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "Admin", Role::Admin).await?;
        let soil = create_course(&db, admin.id, course_input("Soil health", true)).await?;

        add_lesson(&db, soil.id, lesson_input("Third", Some(3))).await?;
        add_lesson(&db, soil.id, lesson_input("First", Some(1))).await?;
        let appended = add_lesson(&db, soil.id, lesson_input("Fourth", None)).await?;
        assert_eq!(appended.position, 4);

        let full = get_course(&db, soil.id, false).await?;
        let titles: Vec<_> = full.lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["First", "Third", "Fourth"]);

        let negative = add_lesson(&db, soil.id, lesson_input("Bad", Some(-1))).await;
        assert!(matches!(negative, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_course_removes_lessons() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "Admin", Role::Admin).await?;
        let soil = create_course(&db, admin.id, course_input("Soil health", true)).await?;
        let first = add_lesson(&db, soil.id, lesson_input("First", None)).await?;
        add_lesson(&db, soil.id, lesson_input("Second", None)).await?;

        delete_lesson(&db, soil.id, first.id).await?;
        assert!(matches!(
            delete_lesson(&db, soil.id, first.id).await,
            Err(Error::NotFound { .. })
        ));

        delete_course(&db, soil.id).await?;
        assert!(list_courses(&db, true).await?.is_empty());
        assert_eq!(Lesson::find().count(&db).await?, 0);
        Ok(())
    }
}
