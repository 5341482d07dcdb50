//! Platform feedback.

use crate::{
    entities::{Feedback, feedback},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Allowed rating range, inclusive.
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// A feedback submission.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackInput {
    /// 1 to 5
    pub rating: i32,
    /// Free text
    pub message: String,
}

/// Stores feedback from `user_id`.
pub async fn submit_feedback(
    db: &DatabaseConnection,
    user_id: i64,
    input: FeedbackInput,
) -> Result<feedback::Model> {
    if !RATING_RANGE.contains(&input.rating) {
        return Err(Error::validation(format!(
            "Rating must be between {} and {}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )));
    }
    let message = input.message.trim().to_string();
    if message.is_empty() {
        return Err(Error::validation("Message cannot be empty"));
    }

    let saved = feedback::ActiveModel {
        user_id: Set(user_id),
        rating: Set(input.rating),
        message: Set(message),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(feedback_id = saved.id, user_id, rating = saved.rating, "Feedback received");
    Ok(saved)
}

/// All feedback, newest first.
pub async fn list_feedback(db: &DatabaseConnection) -> Result<Vec<feedback::Model>> {
    Feedback::find()
        .order_by_desc(feedback::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
