//! Order entity - a buyer's purchase against a crop.
//!
//! Price fields are snapshots taken when the order was placed, so later crop
//! edits never change what the buyer owes.

use super::status::OrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Who is buying
    pub buyer_id: i64,
    /// What is being bought
    pub crop_id: i64,
    /// Seller, copied from the crop
    pub farmer_id: i64,
    /// Quantity ordered, in the crop's unit
    pub quantity: f64,
    /// Crop price at purchase time
    pub unit_price: f64,
    /// `unit_price * quantity`
    pub total_price: f64,
    /// Lifecycle state
    pub status: OrderStatus,
    /// Where to deliver, if not collected
    pub delivery_address: Option<String>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the order last changed status
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order is for one crop
    #[sea_orm(
        belongs_to = "super::crop::Entity",
        from = "Column::CropId",
        to = "super::crop::Column::Id"
    )]
    Crop,
    /// Each order has one buyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerId",
        to = "super::user::Column::Id"
    )]
    Buyer,
}

impl Related<super::crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
