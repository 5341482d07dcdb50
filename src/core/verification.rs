//! Identity verification workflow.
//!
//! A user holds at most one pending request. Submitting marks the user
//! `PENDING`; an admin review flips the request and mirrors the outcome onto the
//! user in the same transaction, together with one notification and a ledger entry.

use crate::{
    core::{ledger, notification},
    entities::{ReviewStatus, User, Verification, VerificationStatus, user, verification},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Documents a user submits for review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// e.g. `"AADHAAR"`, `"LAND_RECORD"`
    pub document_type: String,
    /// Number printed on the document
    pub document_number: String,
    /// Link to an uploaded scan
    #[serde(default)]
    pub document_url: Option<String>,
}

/// An admin's decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReview {
    /// `APPROVED` or `REJECTED`
    pub status: ReviewStatus,
    /// Note for the user
    #[serde(default)]
    pub remarks: Option<String>,
}

async fn set_user_status<C>(db: &C, user_id: i64, status: VerificationStatus) -> Result<()>
where
    C: ConnectionTrait,
{
    let found = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;
    let mut active: user::ActiveModel = found.into();
    active.verification_status = Set(status);
    active.is_verified = Set(status == VerificationStatus::Verified);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await?;
    Ok(())
}

/// Files a verification request for `user_id`.
///
/// # Errors
/// - Empty document type or number
/// - [`Error::Conflict`] if a request is already pending or the user is already verified
pub async fn submit(
    db: &DatabaseConnection,
    user_id: i64,
    request: VerificationRequest,
) -> Result<verification::Model> {
    let document_type = request.document_type.trim().to_uppercase();
    let document_number = request.document_number.trim().to_string();
    if document_type.is_empty() || document_number.is_empty() {
        return Err(Error::validation("Document type and number are required"));
    }

    let txn = db.begin().await?;

    let owner = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;
    if owner.verification_status == VerificationStatus::Verified {
        return Err(Error::conflict("Account is already verified"));
    }

    let pending = Verification::find()
        .filter(verification::Column::UserId.eq(user_id))
        .filter(verification::Column::Status.eq(ReviewStatus::Pending))
        .count(&txn)
        .await?;
    if pending > 0 {
        return Err(Error::conflict("A verification request is already pending"));
    }

    let created = verification::ActiveModel {
        user_id: Set(user_id),
        document_type: Set(document_type),
        document_number: Set(document_number),
        document_url: Set(request.document_url.filter(|u| !u.trim().is_empty())),
        status: Set(ReviewStatus::Pending),
        remarks: Set(None),
        reviewed_by: Set(None),
        created_at: Set(chrono::Utc::now()),
        reviewed_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    set_user_status(&txn, user_id, VerificationStatus::Pending).await?;

    txn.commit().await?;
    info!(verification_id = created.id, user_id, "Verification submitted");
    Ok(created)
}

/// A user's own requests, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<verification::Model>> {
    Verification::find()
        .filter(verification::Column::UserId.eq(user_id))
        .order_by_desc(verification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Requests in one status (all when `None`), oldest first so reviewers work in order.
pub async fn list_by_status(
    db: &DatabaseConnection,
    status: Option<ReviewStatus>,
) -> Result<Vec<verification::Model>> {
    let mut query = Verification::find().order_by_asc(verification::Column::Id);
    if let Some(status) = status {
        query = query.filter(verification::Column::Status.eq(status));
    }
    query.all(db).await.map_err(Into::into)
}

/// Approves or rejects a pending request.
pub async fn review(
    db: &DatabaseConnection,
    verification_id: i64,
    reviewer_id: i64,
    decision: VerificationReview,
) -> Result<verification::Model> {
    let user_status = match decision.status {
        ReviewStatus::Approved => VerificationStatus::Verified,
        ReviewStatus::Rejected => VerificationStatus::Rejected,
        ReviewStatus::Pending => {
            return Err(Error::validation("Review status must be APPROVED or REJECTED"));
        }
    };

    let txn = db.begin().await?;

    let existing = Verification::find_by_id(verification_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("verification", verification_id))?;
    if existing.status != ReviewStatus::Pending {
        return Err(Error::conflict(format!(
            "Verification {verification_id} has already been reviewed"
        )));
    }

    let user_id = existing.user_id;
    let now = chrono::Utc::now();
    let mut active: verification::ActiveModel = existing.into();
    active.status = Set(decision.status);
    active.remarks = Set(decision
        .remarks
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty()));
    active.reviewed_by = Set(Some(reviewer_id));
    active.reviewed_at = Set(Some(now));
    let reviewed = active.update(&txn).await?;

    set_user_status(&txn, user_id, user_status).await?;

    let message = match (user_status, reviewed.remarks.as_deref()) {
        (VerificationStatus::Verified, _) => "Your account has been verified".to_string(),
        (_, Some(remarks)) => format!("Your verification was rejected: {remarks}"),
        (_, None) => "Your verification was rejected".to_string(),
    };
    notification::notify(
        &txn,
        user_id,
        notification::kind::VERIFICATION,
        "Verification reviewed",
        message,
    )
    .await?;

    ledger::append(
        &txn,
        ledger::event::VERIFICATION_REVIEWED,
        verification_id,
        reviewer_id,
        &json!({ "userId": user_id, "status": decision.status }),
    )
    .await?;

    txn.commit().await?;
    info!(
        verification_id,
        user_id,
        reviewer_id,
        status = ?decision.status,
        "Reviewed verification"
    );
    Ok(reviewed)
}
