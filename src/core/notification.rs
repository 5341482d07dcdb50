//! Notification business logic.
//!
//! Other modules call [`notify`] as a side effect, usually inside their own
//! database transaction, so the function is generic over the connection.

use crate::{
    entities::{Notification, notification},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*, sea_query::Expr};

/// Source tags stored in `notification.kind`.
pub mod kind {
    /// Order placed or moved along its lifecycle
    pub const ORDER: &str = "ORDER";
    /// Subsidy application reviewed
    pub const SUBSIDY: &str = "SUBSIDY";
    /// Verification reviewed
    pub const VERIFICATION: &str = "VERIFICATION";
    /// Complaint answered
    pub const COMPLAINT: &str = "COMPLAINT";
}

/// Creates an unread notification for `user_id`.
pub async fn notify<C>(
    db: &C,
    user_id: i64,
    kind: &str,
    title: impl Into<String>,
    message: impl Into<String>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    notification::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.into()),
        message: Set(message.into()),
        kind: Set(kind.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Lists a user's notifications, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts a user's unread notifications.
pub async fn unread_count(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks one notification read. Only the recipient may do this.
pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i64,
    notification_id: i64,
) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("notification", notification_id))?;

    if existing.user_id != user_id {
        return Err(Error::forbidden("Notification belongs to another user"));
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Marks every notification of a user read and returns how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
