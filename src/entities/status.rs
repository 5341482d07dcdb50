//! Status enums shared by several entities.
//!
//! All of them are stored as upper-case text and serialized the same way on the wire.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Identity verification state mirrored onto the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Never submitted
    #[sea_orm(string_value = "UNVERIFIED")]
    Unverified,
    /// A request is waiting for review
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Latest request approved
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    /// Latest request rejected
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Outcome of a reviewed request (verifications and subsidy applications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// Waiting for a reviewer
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Accepted
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Declined
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Crop stock state, derived from the available quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CropStatus {
    /// Quantity above zero
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    /// Nothing left
    #[sea_orm(string_value = "SOLD_OUT")]
    SoldOut,
}

/// Stock below this is treated as zero.
pub const STOCK_EPSILON: f64 = 1e-9;

impl CropStatus {
    /// The only valid status for a given stock level.
    #[must_use]
    pub fn for_quantity(quantity: f64) -> Self {
        if quantity > STOCK_EPSILON {
            Self::Available
        } else {
            Self::SoldOut
        }
    }
}

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, waiting for the farmer
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Accepted by the farmer
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    /// On its way
    #[sea_orm(string_value = "SHIPPED")]
    Shipped,
    /// Arrived at the buyer
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    /// Closed by the buyer
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Withdrawn; stock was returned
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl OrderStatus {
    /// Whether the lifecycle allows going from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
                | (Self::Delivered, Self::Completed)
        )
    }
}

/// Complaint handling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Filed, untouched
    #[sea_orm(string_value = "OPEN")]
    Open,
    /// An admin is looking at it
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    /// Closed with a resolution
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
    /// Closed without action
    #[sea_orm(string_value = "DISMISSED")]
    Dismissed,
}

/// Kind of educational material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    /// Written article
    #[sea_orm(string_value = "ARTICLE")]
    Article,
    /// Video link
    #[sea_orm(string_value = "VIDEO")]
    Video,
    /// Step-by-step guide
    #[sea_orm(string_value = "GUIDE")]
    Guide,
}
