//! Admin dashboard counters.

use crate::{
    entities::{
        Complaint, ComplaintStatus, Crop, Order, ReviewStatus, Role, User, Verification,
        complaint, user, verification,
    },
    errors::Result,
};
use sea_orm::{ActiveEnum, Iterable, PaginatorTrait, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;

/// Platform-wide counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    /// Total accounts
    pub total_users: u64,
    /// Accounts per role, keyed by the wire name of the role
    pub users_by_role: BTreeMap<String, u64>,
    /// Crops, listed or not
    pub total_crops: u64,
    /// Orders in any status
    pub total_orders: u64,
    /// Verification requests awaiting review
    pub pending_verifications: u64,
    /// Complaints not yet touched
    pub open_complaints: u64,
}

/// Gathers the counters.
pub async fn platform_stats(db: &DatabaseConnection) -> Result<PlatformStats> {
    let mut users_by_role = BTreeMap::new();
    let mut total_users = 0;
    for role in Role::iter() {
        let count = User::find()
            .filter(user::Column::Role.eq(role))
            .count(db)
            .await?;
        total_users += count;
        users_by_role.insert(role.to_value(), count);
    }

    let pending_verifications = Verification::find()
        .filter(verification::Column::Status.eq(ReviewStatus::Pending))
        .count(db)
        .await?;
    let open_complaints = Complaint::find()
        .filter(complaint::Column::Status.eq(ComplaintStatus::Open))
        .count(db)
        .await?;

    Ok(PlatformStats {
        total_users,
        users_by_role,
        total_crops: Crop::find().count(db).await?,
        total_orders: Order::find().count(db).await?,
        pending_verifications,
        open_complaints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_platform_stats() -> Result<()> {
        let (db, _farmer, _crop) = setup_with_crop(8.0).await?;
        create_test_user(&db, "Buyer One", Role::Buyer).await?;
        create_test_user(&db, "Buyer Two", Role::Buyer).await?;

        let stats = platform_stats(&db).await?;
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.users_by_role.get("BUYER"), Some(&2));
        assert_eq!(stats.users_by_role.get("ADMIN"), Some(&0));
        assert_eq!(stats.total_crops, 1);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.pending_verifications, 0);
        Ok(())
    }
}
