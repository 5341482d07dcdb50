//! Crop entity - a farmer's sellable inventory line.
//!
//! `status` always mirrors `quantity_available`; `is_listed` is the separate
//! admin switch that hides a crop from the marketplace.

use super::status::CropStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Crop database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crops")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the crop
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning farmer
    pub farmer_id: i64,
    /// Crop name (e.g., "Basmati Rice")
    pub name: String,
    /// Grouping used by the marketplace filters (e.g., "grain")
    pub category: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Price per `unit`
    pub price_per_unit: f64,
    /// Unit of sale (e.g., "kg", "quintal")
    pub unit: String,
    /// Stock left to sell, never negative
    pub quantity_available: f64,
    /// Where the crop can be collected
    pub location: String,
    /// Public path of the uploaded image
    pub image_url: Option<String>,
    /// Derived from `quantity_available`
    pub status: CropStatus,
    /// False when an admin has pulled the listing
    pub is_listed: bool,
    /// When the crop was listed
    pub created_at: DateTimeUtc,
    /// When the crop was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Crop and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each crop belongs to one farmer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FarmerId",
        to = "super::user::Column::Id"
    )]
    Farmer,
    /// One crop has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmer.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
