//! Complaint filing and admin handling.

use crate::{
    core::notification,
    entities::{Complaint, ComplaintStatus, complaint},
    errors::{Error, Result},
};
use sea_orm::{ActiveEnum, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// A new complaint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintInput {
    /// One-line summary
    pub subject: String,
    /// Full description
    pub description: String,
    /// User the complaint is about, if any
    #[serde(default)]
    pub against_user_id: Option<i64>,
    /// Order the complaint is about, if any
    #[serde(default)]
    pub order_id: Option<i64>,
}

/// Admin handling of a complaint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    /// New status
    pub status: ComplaintStatus,
    /// Response shown to the filer
    #[serde(default)]
    pub admin_response: Option<String>,
}

/// Files a complaint as `user_id`.
pub async fn file_complaint(
    db: &DatabaseConnection,
    user_id: i64,
    input: ComplaintInput,
) -> Result<complaint::Model> {
    let subject = input.subject.trim().to_string();
    let description = input.description.trim().to_string();
    if subject.is_empty() || description.is_empty() {
        return Err(Error::validation("Subject and description are required"));
    }
    if input.against_user_id == Some(user_id) {
        return Err(Error::validation("You cannot file a complaint against yourself"));
    }

    let now = chrono::Utc::now();
    let filed = complaint::ActiveModel {
        user_id: Set(user_id),
        subject: Set(subject),
        description: Set(description),
        against_user_id: Set(input.against_user_id),
        order_id: Set(input.order_id),
        status: Set(ComplaintStatus::Open),
        admin_response: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(complaint_id = filed.id, user_id, "Complaint filed");
    Ok(filed)
}

/// Complaints filed by a user, newest first.
pub async fn list_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<complaint::Model>> {
    Complaint::find()
        .filter(complaint::Column::UserId.eq(user_id))
        .order_by_desc(complaint::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All complaints, optionally in one status, newest first.
pub async fn list_all(
    db: &DatabaseConnection,
    status: Option<ComplaintStatus>,
) -> Result<Vec<complaint::Model>> {
    let mut query = Complaint::find().order_by_desc(complaint::Column::Id);
    if let Some(status) = status {
        query = query.filter(complaint::Column::Status.eq(status));
    }
    query.all(db).await.map_err(Into::into)
}

/// Sets status and response, then notifies the filer.
pub async fn update_complaint(
    db: &DatabaseConnection,
    complaint_id: i64,
    update: ComplaintUpdate,
) -> Result<complaint::Model> {
    let txn = db.begin().await?;

    let existing = Complaint::find_by_id(complaint_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("complaint", complaint_id))?;

    let filer = existing.user_id;
    let mut active: complaint::ActiveModel = existing.into();
    active.status = Set(update.status);
    if let Some(response) = update.admin_response {
        active.admin_response = Set(Some(response.trim().to_string()).filter(|r| !r.is_empty()));
    }
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    notification::notify(
        &txn,
        filer,
        notification::kind::COMPLAINT,
        "Complaint updated",
        format!(
            "Your complaint \"{}\" is now {}",
            updated.subject,
            updated.status.to_value()
        ),
    )
    .await?;

    txn.commit().await?;
    info!(complaint_id, status = ?updated.status, "Complaint updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;

    fn late_delivery() -> ComplaintInput {
        ComplaintInput {
            subject: "Late delivery".to_string(),
            description: "Order arrived a week late".to_string(),
            against_user_id: None,
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_file_and_list_complaints() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_user(&db, "Buyer", Role::Buyer).await?;
        let other = create_test_user(&db, "Other", Role::Buyer).await?;

        let filed = file_complaint(&db, buyer.id, late_delivery()).await?;
        assert_eq!(filed.status, ComplaintStatus::Open);
        file_complaint(&db, other.id, late_delivery()).await?;

        assert_eq!(list_for_user(&db, buyer.id).await?.len(), 1);
        assert_eq!(list_all(&db, None).await?.len(), 2);
        assert_eq!(list_all(&db, Some(ComplaintStatus::Resolved)).await?.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_complaint_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_user(&db, "Buyer", Role::Buyer).await?;

        let mut blank = late_delivery();
        blank.subject = " ".to_string();
        assert!(matches!(
            file_complaint(&db, buyer.id, blank).await,
            Err(Error::Validation { .. })
        ));

        let mut against_self = late_delivery();
        against_self.against_user_id = Some(buyer.id);
        assert!(matches!(
            file_complaint(&db, buyer.id, against_self).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_complaint_notifies_filer() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_user(&db, "Buyer", Role::Buyer).await?;
        let filed = file_complaint(&db, buyer.id, late_delivery()).await?;

        let update = ComplaintUpdate {
            status: ComplaintStatus::Resolved,
            admin_response: Some("Refund issued".to_string()),
        };
        let resolved = update_complaint(&db, filed.id, update).await?;
        assert_eq!(resolved.status, ComplaintStatus::Resolved);
        assert_eq!(resolved.admin_response.as_deref(), Some("Refund issued"));

        let notes = notification::list_for_user(&db, buyer.id).await?;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("RESOLVED"));

        let missing = update_complaint(
            &db,
            999,
            ComplaintUpdate {
                status: ComplaintStatus::Dismissed,
                admin_response: None,
            },
        )
        .await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }
}
