//! User entity - every account in the marketplace.
//!
//! A user has exactly one [`Role`]. The verification fields are a denormalized
//! mirror of the latest reviewed [`super::verification`] request.

use super::status::VerificationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What an account is allowed to do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Lists crops and fulfils orders
    #[sea_orm(string_value = "FARMER")]
    Farmer,
    /// Places orders
    #[sea_orm(string_value = "BUYER")]
    Buyer,
    /// Moderates everything
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Publishes subsidies and reviews applications
    #[sea_orm(string_value = "GOV_OFFICIAL")]
    GovOfficial,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, stored lowercase
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Contact phone number
    pub phone: Option<String>,
    /// Free-form location (village, district, ...)
    pub location: Option<String>,
    /// Outcome of the latest verification request
    pub verification_status: VerificationStatus,
    /// True once an admin approved a verification request
    pub is_verified: bool,
    /// When the account was registered
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A farmer owns many crops
    #[sea_orm(has_many = "super::crop::Entity")]
    Crops,
    /// A user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
    /// A user files many verification requests over time
    #[sea_orm(has_many = "super::verification::Entity")]
    Verifications,
}

impl Related<super::crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crops.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::verification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Verifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
