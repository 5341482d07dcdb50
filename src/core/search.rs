//! Cross-resource text search.

use crate::{
    entities::{Course, Crop, EducationContent, course, crop, education_content},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// Maximum hits returned per resource.
pub const MAX_RESULTS_PER_KIND: u64 = 20;

/// Matches grouped by resource.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Listed crops whose name, category or location matches
    pub crops: Vec<crop::Model>,
    /// Published courses whose title or category matches
    pub courses: Vec<course::Model>,
    /// Education content whose title or tags match
    pub content: Vec<education_content::Model>,
}

/// Case-insensitive substring search across crops, courses and education content.
pub async fn search(db: &DatabaseConnection, query: &str) -> Result<SearchResults> {
    let needle = query.trim();
    if needle.is_empty() {
        return Err(Error::validation("Search query cannot be empty"));
    }

    let crops = Crop::find()
        .filter(crop::Column::IsListed.eq(true))
        .filter(
            Condition::any()
                .add(crop::Column::Name.contains(needle))
                .add(crop::Column::Category.contains(needle))
                .add(crop::Column::Location.contains(needle)),
        )
        .order_by_desc(crop::Column::Id)
        .limit(MAX_RESULTS_PER_KIND)
        .all(db)
        .await?;

    let courses = Course::find()
        .filter(course::Column::IsPublished.eq(true))
        .filter(
            Condition::any()
                .add(course::Column::Title.contains(needle))
                .add(course::Column::Category.contains(needle)),
        )
        .order_by_desc(course::Column::Id)
        .limit(MAX_RESULTS_PER_KIND)
        .all(db)
        .await?;

    let content = EducationContent::find()
        .filter(
            Condition::any()
                .add(education_content::Column::Title.contains(needle))
                .add(education_content::Column::Tags.contains(needle)),
        )
        .order_by_desc(education_content::Column::Id)
        .limit(MAX_RESULTS_PER_KIND)
        .all(db)
        .await?;

    Ok(SearchResults {
        crops,
        courses,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{course as course_ops, crop as crop_ops, education};
    use crate::entities::{ContentType, Role};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_search_spans_resources() -> Result<()> {
        let db = setup_test_db().await?;
        let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;
        let admin = create_test_user(&db, "Admin", Role::Admin).await?;

        let wheat =
            crop_ops::create_crop(&db, farmer.id, crop_input("Durum Wheat", 30.0, 50.0)).await?;
        crop_ops::create_crop(&db, farmer.id, crop_input("Tomato", 20.0, 5.0)).await?;
        let hidden =
            crop_ops::create_crop(&db, farmer.id, crop_input("Wheat Straw", 2.0, 9.0)).await?;
        crop_ops::set_listed(&db, hidden.id, false).await?;

        let course_input = |title: &str, is_published| course_ops::CourseInput {
            title: title.to_string(),
            description: String::new(),
            category: "grains".to_string(),
            is_published,
        };
        course_ops::create_course(&db, admin.id, course_input("Growing wheat", true)).await?;
        course_ops::create_course(&db, admin.id, course_input("Wheat rust (draft)", false)).await?;

        education::create_content(
            &db,
            admin.id,
            education::ContentInput {
                title: "Harvest timing".to_string(),
                body: String::new(),
                content_type: ContentType::Guide,
                media_url: None,
                tags: Some("wheat,harvest".to_string()),
            },
        )
        .await?;

        let hits = search(&db, "WHEAT").await?;
        assert_eq!(hits.crops.len(), 1);
        assert_eq!(hits.crops[0].id, wheat.id);
        assert_eq!(hits.courses.len(), 1);
        assert_eq!(hits.content.len(), 1);

        assert!(matches!(search(&db, "  ").await, Err(Error::Validation { .. })));
        Ok(())
    }
}
