//! Subsidy programs and farmers' applications to them.

use crate::{
    core::{ledger, notification},
    entities::{ReviewStatus, Subsidy, SubsidyApplication, subsidy, subsidy_application},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveEnum, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Fields for a new subsidy program.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyInput {
    /// Program name
    pub title: String,
    /// What the program pays for
    pub description: String,
    /// Amount paid per approved application
    pub amount: f64,
    /// Who may apply, free text
    #[serde(default)]
    pub eligibility: Option<String>,
    /// Last moment applications are accepted
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial edit of a subsidy. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyUpdate {
    /// New program name
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New amount
    pub amount: Option<f64>,
    /// New eligibility text; empty clears it
    pub eligibility: Option<String>,
    /// `Some(None)` (JSON `null`) removes the deadline
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    /// Switch the program on or off
    pub is_active: Option<bool>,
}

/// Wraps any value that is present, `null` included, so it differs from an absent field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A reviewer's decision on an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReview {
    /// `APPROVED` or `REJECTED`
    pub status: ReviewStatus,
    /// Message shown to the farmer
    #[serde(default)]
    pub reply: Option<String>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

/// Creates an active subsidy program.
pub async fn create_subsidy(
    db: &DatabaseConnection,
    created_by: i64,
    input: SubsidyInput,
) -> Result<subsidy::Model> {
    let title = required(&input.title, "Title")?;
    let description = required(&input.description, "Description")?;
    validate_amount(input.amount)?;

    let now = Utc::now();
    let created = subsidy::ActiveModel {
        title: Set(title),
        description: Set(description),
        amount: Set(input.amount),
        eligibility: Set(input.eligibility.filter(|e| !e.trim().is_empty())),
        deadline: Set(input.deadline),
        is_active: Set(true),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(subsidy_id = created.id, created_by, "Created subsidy");
    Ok(created)
}

/// Finds a subsidy by id.
pub async fn get_subsidy_by_id(
    db: &DatabaseConnection,
    subsidy_id: i64,
) -> Result<Option<subsidy::Model>> {
    Subsidy::find_by_id(subsidy_id).one(db).await.map_err(Into::into)
}

/// Lists subsidies, newest first. `active_only` hides switched-off programs.
pub async fn list_subsidies(
    db: &DatabaseConnection,
    active_only: bool,
) -> Result<Vec<subsidy::Model>> {
    let mut query = Subsidy::find().order_by_desc(subsidy::Column::Id);
    if active_only {
        query = query.filter(subsidy::Column::IsActive.eq(true));
    }
    query.all(db).await.map_err(Into::into)
}

/// Applies a partial edit to a subsidy.
pub async fn update_subsidy(
    db: &DatabaseConnection,
    subsidy_id: i64,
    update: SubsidyUpdate,
) -> Result<subsidy::Model> {
    let existing = get_subsidy_by_id(db, subsidy_id)
        .await?
        .ok_or_else(|| Error::not_found("subsidy", subsidy_id))?;
    let mut active: subsidy::ActiveModel = existing.into();

    if let Some(title) = update.title {
        active.title = Set(required(&title, "Title")?);
    }
    if let Some(description) = update.description {
        active.description = Set(required(&description, "Description")?);
    }
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
        active.amount = Set(amount);
    }
    if let Some(eligibility) = update.eligibility {
        active.eligibility = Set(Some(eligibility.trim().to_string()).filter(|e| !e.is_empty()));
    }
    if let Some(deadline) = update.deadline {
        active.deadline = Set(deadline);
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Switches a subsidy off. Existing applications are kept.
pub async fn deactivate_subsidy(
    db: &DatabaseConnection,
    subsidy_id: i64,
) -> Result<subsidy::Model> {
    let update = SubsidyUpdate {
        is_active: Some(false),
        ..Default::default()
    };
    let deactivated = update_subsidy(db, subsidy_id, update).await?;
    info!(subsidy_id, "Deactivated subsidy");
    Ok(deactivated)
}

/// Files a farmer's application against a subsidy.
///
/// # Errors
/// - [`Error::NotFound`] if the subsidy does not exist
/// - [`Error::SubsidyInactive`] if it has been switched off
/// - [`Error::SubsidyClosed`] if its deadline has passed
/// - [`Error::Conflict`] if the farmer already has a pending application to it
pub async fn apply(
    db: &DatabaseConnection,
    farmer_id: i64,
    subsidy_id: i64,
    note: Option<String>,
) -> Result<subsidy_application::Model> {
    let txn = db.begin().await?;

    let program = Subsidy::find_by_id(subsidy_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("subsidy", subsidy_id))?;

    if !program.is_active {
        return Err(Error::SubsidyInactive { id: subsidy_id });
    }
    let now = Utc::now();
    if let Some(deadline) = program.deadline {
        if now >= deadline {
            return Err(Error::SubsidyClosed {
                id: subsidy_id,
                deadline,
            });
        }
    }

    let pending = SubsidyApplication::find()
        .filter(subsidy_application::Column::SubsidyId.eq(subsidy_id))
        .filter(subsidy_application::Column::FarmerId.eq(farmer_id))
        .filter(subsidy_application::Column::Status.eq(ReviewStatus::Pending))
        .count(&txn)
        .await?;
    if pending > 0 {
        return Err(Error::conflict(
            "You already have a pending application for this subsidy",
        ));
    }

    let application = subsidy_application::ActiveModel {
        subsidy_id: Set(subsidy_id),
        farmer_id: Set(farmer_id),
        note: Set(note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())),
        status: Set(ReviewStatus::Pending),
        reply: Set(None),
        reviewed_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        application_id = application.id,
        subsidy_id, farmer_id, "Subsidy application filed"
    );
    Ok(application)
}

/// A farmer's own applications, newest first.
pub async fn list_applications_for_farmer(
    db: &DatabaseConnection,
    farmer_id: i64,
) -> Result<Vec<subsidy_application::Model>> {
    SubsidyApplication::find()
        .filter(subsidy_application::Column::FarmerId.eq(farmer_id))
        .order_by_desc(subsidy_application::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applications to one subsidy, or to every subsidy when `subsidy_id` is `None`.
pub async fn list_applications(
    db: &DatabaseConnection,
    subsidy_id: Option<i64>,
    status: Option<ReviewStatus>,
) -> Result<Vec<subsidy_application::Model>> {
    let mut query = SubsidyApplication::find().order_by_desc(subsidy_application::Column::Id);
    if let Some(subsidy_id) = subsidy_id {
        query = query.filter(subsidy_application::Column::SubsidyId.eq(subsidy_id));
    }
    if let Some(status) = status {
        query = query.filter(subsidy_application::Column::Status.eq(status));
    }
    query.all(db).await.map_err(Into::into)
}

/// Records a decision on a pending application and tells the farmer.
pub async fn review_application(
    db: &DatabaseConnection,
    application_id: i64,
    reviewer_id: i64,
    review: ApplicationReview,
) -> Result<subsidy_application::Model> {
    if review.status == ReviewStatus::Pending {
        return Err(Error::validation("Review status must be APPROVED or REJECTED"));
    }

    let txn = db.begin().await?;

    let existing = SubsidyApplication::find_by_id(application_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("subsidy application", application_id))?;
    if existing.status != ReviewStatus::Pending {
        return Err(Error::conflict(format!(
            "Application {application_id} was already {}",
            existing.status.to_value()
        )));
    }

    let farmer_id = existing.farmer_id;
    let subsidy_id = existing.subsidy_id;
    let mut active: subsidy_application::ActiveModel = existing.into();
    active.status = Set(review.status);
    active.reply = Set(review.reply.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()));
    active.reviewed_by = Set(Some(reviewer_id));
    active.updated_at = Set(Utc::now());
    let reviewed = active.update(&txn).await?;

    ledger::append(
        &txn,
        ledger::event::SUBSIDY_APPLICATION_REVIEWED,
        application_id,
        reviewer_id,
        &json!({ "subsidyId": subsidy_id, "farmerId": farmer_id, "status": review.status }),
    )
    .await?;

    let verdict = review.status.to_value().to_lowercase();
    notification::notify(
        &txn,
        farmer_id,
        notification::kind::SUBSIDY,
        "Subsidy application reviewed",
        format!("Your application #{application_id} was {verdict}"),
    )
    .await?;

    txn.commit().await?;
    info!(application_id, reviewer_id, status = ?review.status, "Reviewed subsidy application");
    Ok(reviewed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn program(deadline: Option<DateTime<Utc>>) -> SubsidyInput {
        SubsidyInput {
            title: "Drip irrigation grant".to_string(),
            description: "Half the cost of drip lines".to_string(),
            amount: 25_000.0,
            eligibility: Some("Smallholders".to_string()),
            deadline,
        }
    }

    #[tokio::test]
    async fn test_create_subsidy_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut bad = program(None);
        bad.amount = 0.0;
        assert!(matches!(
            create_subsidy(&db, 1, bad).await,
            Err(Error::InvalidAmount { .. })
        ));

        let mut untitled = program(None);
        untitled.title = "  ".to_string();
        assert!(matches!(
            create_subsidy(&db, 1, untitled).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_to_active_subsidy() -> Result<()> {
        let db = setup_test_db().await?;
        let official = create_test_user(&db, "Officer", Role::GovOfficial).await?;
        let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;
        let grant = create_subsidy(&db, official.id, program(None)).await?;

        let application = apply(&db, farmer.id, grant.id, Some("Two acres".to_string())).await?;
        assert_eq!(application.status, ReviewStatus::Pending);
        assert_eq!(application.note.as_deref(), Some("Two acres"));

        let again = apply(&db, farmer.id, grant.id, None).await;
        assert!(matches!(again, Err(Error::Conflict { .. })));
        assert_eq!(list_applications_for_farmer(&db, farmer.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_rejected_when_inactive_or_closed() -> Result<()> {
        let db = setup_test_db().await?;
        let official = create_test_user(&db, "Officer", Role::GovOfficial).await?;
        let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;

        let missing = apply(&db, farmer.id, 4242, None).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        let switched_off = create_subsidy(&db, official.id, program(None)).await?;
        deactivate_subsidy(&db, switched_off.id).await?;
        let inactive = apply(&db, farmer.id, switched_off.id, None).await;
        assert!(matches!(inactive, Err(Error::SubsidyInactive { .. })));

        let yesterday = Some(Utc::now() - Duration::days(1));
        let expired = create_subsidy(&db, official.id, program(yesterday)).await?;
        let closed = apply(&db, farmer.id, expired.id, None).await;
        assert!(matches!(closed, Err(Error::SubsidyClosed { .. })));

        let next_month = Some(Utc::now() + Duration::days(30));
        let open = create_subsidy(&db, official.id, program(next_month)).await?;
        apply(&db, farmer.id, open.id, None).await?;

        assert_eq!(list_subsidies(&db, true).await?.len(), 2);
        assert_eq!(list_subsidies(&db, false).await?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_update_distinguishes_null_deadline() {
        let cleared: SubsidyUpdate = serde_json::from_value(json!({ "deadline": null })).unwrap();
        assert_eq!(cleared.deadline, Some(None));

        let untouched: SubsidyUpdate = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(untouched.deadline, None);

        let moved: SubsidyUpdate =
            serde_json::from_value(json!({ "deadline": "2030-01-01T00:00:00Z" })).unwrap();
        assert!(matches!(moved.deadline, Some(Some(_))));
    }

    #[tokio::test]
    async fn test_clearing_deadline_reopens_subsidy() -> Result<()> {
        let db = setup_test_db().await?;
        let official = create_test_user(&db, "Officer", Role::GovOfficial).await?;
        let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;
        let lapsed = program(Some(Utc::now() - Duration::days(1)));
        let grant = create_subsidy(&db, official.id, lapsed).await?;

        let renamed = SubsidyUpdate {
            title: Some("Drip irrigation grant 2".to_string()),
            ..Default::default()
        };
        let kept = update_subsidy(&db, grant.id, renamed).await?;
        assert!(kept.deadline.is_some());

        let reopen = SubsidyUpdate {
            deadline: Some(None),
            ..Default::default()
        };
        let reopened = update_subsidy(&db, grant.id, reopen).await?;
        assert_eq!(reopened.deadline, None);
        apply(&db, farmer.id, grant.id, None).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_review_only_pending_applications() -> Result<()> {
        let db = setup_test_db().await?;
        let official = create_test_user(&db, "Officer", Role::GovOfficial).await?;
        let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;
        let grant = create_subsidy(&db, official.id, program(None)).await?;
        let application = apply(&db, farmer.id, grant.id, None).await?;

        let approve = ApplicationReview {
            status: ReviewStatus::Approved,
            reply: Some("Funds released next week".to_string()),
        };
        let reviewed = review_application(&db, application.id, official.id, approve.clone()).await?;
        assert_eq!(reviewed.status, ReviewStatus::Approved);
        assert_eq!(reviewed.reviewed_by, Some(official.id));

        let twice = review_application(&db, application.id, official.id, approve).await;
        assert!(matches!(twice, Err(Error::Conflict { .. })));

        let notes = notification::list_for_user(&db, farmer.id).await?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, notification::kind::SUBSIDY);
        assert!(ledger::verify_chain(&db).await?.valid);

        // Approved applications no longer block a new one.
        apply(&db, farmer.id, grant.id, None).await?;
        assert_eq!(
            list_applications(&db, Some(grant.id), Some(ReviewStatus::Pending)).await?.len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_review_rejects_pending_as_decision() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let review = ApplicationReview {
            status: ReviewStatus::Pending,
            reply: None,
        };
        assert!(matches!(
            review_application(&db, 1, 1, review).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }
}
