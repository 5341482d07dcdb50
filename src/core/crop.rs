//! Crop business logic - listings, marketplace queries and stock changes.
//!
//! Stock only moves through [`adjust_quantity_atomic`], which keeps
//! `quantity_available >= 0` and re-derives `status` in the same transaction.

use crate::{
    entities::{Crop, CropStatus, STOCK_EPSILON, crop},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::Deserialize;
use tracing::info;

/// Fields a farmer supplies when listing a crop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropInput {
    /// Crop name
    pub name: String,
    /// Category
    pub category: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Price per unit
    pub price_per_unit: f64,
    /// Unit of sale; defaults to kg
    #[serde(default)]
    pub unit: Option<String>,
    /// Initial stock
    pub quantity_available: f64,
    /// Pickup location
    pub location: String,
}

/// Partial edit of a listing. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropUpdate {
    /// New name
    pub name: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New price
    pub price_per_unit: Option<f64>,
    /// New unit
    pub unit: Option<String>,
    /// New stock level
    pub quantity_available: Option<f64>,
    /// New location
    pub location: Option<String>,
}

/// Marketplace filters. All are optional and combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropFilter {
    /// Substring of name, category or description
    pub q: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Substring of location
    pub location: Option<String>,
    /// Only this farmer's crops
    pub farmer_id: Option<i64>,
    /// Lowest unit price
    pub min_price: Option<f64>,
    /// Highest unit price
    pub max_price: Option<f64>,
    /// Stock state
    pub status: Option<CropStatus>,
    /// Include admin-hidden listings (admins only)
    #[serde(default)]
    pub include_unlisted: bool,
}

fn require_text(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}

fn validate_quantity(quantity: f64) -> Result<f64> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidAmount { amount: quantity });
    }
    Ok(quantity)
}

/// Lists a new crop for `farmer_id`.
pub async fn create_crop(
    db: &DatabaseConnection,
    farmer_id: i64,
    input: CropInput,
) -> Result<crop::Model> {
    let name = require_text(&input.name, "Crop name")?;
    let category = require_text(&input.category, "Category")?;
    let location = require_text(&input.location, "Location")?;
    let price = validate_price(input.price_per_unit)?;
    let quantity = validate_quantity(input.quantity_available)?;
    let unit = input
        .unit
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "kg".to_string());

    let now = chrono::Utc::now();
    let created = crop::ActiveModel {
        farmer_id: Set(farmer_id),
        name: Set(name),
        category: Set(category.to_lowercase()),
        description: Set(input.description.filter(|d| !d.trim().is_empty())),
        price_per_unit: Set(price),
        unit: Set(unit),
        quantity_available: Set(quantity),
        location: Set(location),
        image_url: Set(None),
        status: Set(CropStatus::for_quantity(quantity)),
        is_listed: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(crop_id = created.id, farmer_id, "Listed crop");
    Ok(created)
}

/// Finds a crop by id.
pub async fn get_crop_by_id(db: &DatabaseConnection, crop_id: i64) -> Result<Option<crop::Model>> {
    Crop::find_by_id(crop_id).one(db).await.map_err(Into::into)
}

/// Loads a crop and checks that `farmer_id` owns it.
pub async fn get_owned_crop(
    db: &DatabaseConnection,
    crop_id: i64,
    farmer_id: i64,
) -> Result<crop::Model> {
    let found = get_crop_by_id(db, crop_id)
        .await?
        .ok_or_else(|| Error::not_found("crop", crop_id))?;
    if found.farmer_id != farmer_id {
        return Err(Error::forbidden("Crop belongs to another farmer"));
    }
    Ok(found)
}

/// Marketplace listing, newest first.
pub async fn list_crops(db: &DatabaseConnection, filter: &CropFilter) -> Result<Vec<crop::Model>> {
    let mut condition = Condition::all();

    if !filter.include_unlisted {
        condition = condition.add(crop::Column::IsListed.eq(true));
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(crop::Column::Name.contains(q))
                .add(crop::Column::Category.contains(q))
                .add(crop::Column::Description.contains(q)),
        );
    }
    if let Some(category) = filter.category.as_deref() {
        condition = condition.add(crop::Column::Category.eq(category.trim().to_lowercase()));
    }
    if let Some(location) = filter.location.as_deref() {
        condition = condition.add(crop::Column::Location.contains(location.trim()));
    }
    if let Some(farmer_id) = filter.farmer_id {
        condition = condition.add(crop::Column::FarmerId.eq(farmer_id));
    }
    if let Some(min) = filter.min_price {
        condition = condition.add(crop::Column::PricePerUnit.gte(min));
    }
    if let Some(max) = filter.max_price {
        condition = condition.add(crop::Column::PricePerUnit.lte(max));
    }
    if let Some(status) = filter.status {
        condition = condition.add(crop::Column::Status.eq(status));
    }

    Crop::find()
        .filter(condition)
        .order_by_desc(crop::Column::CreatedAt)
        .order_by_desc(crop::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All crops of one farmer, including hidden ones.
pub async fn list_farmer_crops(
    db: &DatabaseConnection,
    farmer_id: i64,
) -> Result<Vec<crop::Model>> {
    list_crops(
        db,
        &CropFilter {
            farmer_id: Some(farmer_id),
            include_unlisted: true,
            ..Default::default()
        },
    )
    .await
}

/// Edits a listing owned by `farmer_id`. Setting the quantity re-derives the status.
pub async fn update_crop(
    db: &DatabaseConnection,
    crop_id: i64,
    farmer_id: i64,
    update: CropUpdate,
) -> Result<crop::Model> {
    let existing = get_owned_crop(db, crop_id, farmer_id).await?;
    let mut active: crop::ActiveModel = existing.into();

    if let Some(name) = update.name {
        active.name = Set(require_text(&name, "Crop name")?);
    }
    if let Some(category) = update.category {
        active.category = Set(require_text(&category, "Category")?.to_lowercase());
    }
    if let Some(description) = update.description {
        active.description = Set(Some(description.trim().to_string()).filter(|d| !d.is_empty()));
    }
    if let Some(price) = update.price_per_unit {
        active.price_per_unit = Set(validate_price(price)?);
    }
    if let Some(unit) = update.unit {
        active.unit = Set(require_text(&unit, "Unit")?);
    }
    if let Some(location) = update.location {
        active.location = Set(require_text(&location, "Location")?);
    }
    if let Some(quantity) = update.quantity_available {
        let quantity = validate_quantity(quantity)?;
        active.quantity_available = Set(quantity);
        active.status = Set(CropStatus::for_quantity(quantity));
    }

    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Records the public path of a freshly uploaded image.
pub async fn set_image_url(
    db: &DatabaseConnection,
    crop_id: i64,
    farmer_id: i64,
    image_url: String,
) -> Result<crop::Model> {
    let existing = get_owned_crop(db, crop_id, farmer_id).await?;
    let mut active: crop::ActiveModel = existing.into();
    active.image_url = Set(Some(image_url));
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Admin override: show or hide a listing without touching its stock.
pub async fn set_listed(
    db: &DatabaseConnection,
    crop_id: i64,
    is_listed: bool,
) -> Result<crop::Model> {
    let existing = get_crop_by_id(db, crop_id)
        .await?
        .ok_or_else(|| Error::not_found("crop", crop_id))?;
    let mut active: crop::ActiveModel = existing.into();
    active.is_listed = Set(is_listed);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    info!(crop_id, is_listed, "Changed crop listing visibility");
    Ok(updated)
}

/// Deletes a crop. `farmer_id` of `None` means an admin is deleting.
///
/// Crops with orders are only hidden, so order history keeps its reference.
pub async fn delete_crop(
    db: &DatabaseConnection,
    crop_id: i64,
    farmer_id: Option<i64>,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Crop::find_by_id(crop_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("crop", crop_id))?;
    if let Some(farmer_id) = farmer_id {
        if existing.farmer_id != farmer_id {
            return Err(Error::forbidden("Crop belongs to another farmer"));
        }
    }

    let order_count = crate::entities::Order::find()
        .filter(crate::entities::order::Column::CropId.eq(crop_id))
        .count(&txn)
        .await?;

    if order_count == 0 {
        existing.delete(&txn).await?;
    } else {
        let mut active: crop::ActiveModel = existing.into();
        active.is_listed = Set(false);
        active.updated_at = Set(chrono::Utc::now());
        active.update(&txn).await?;
    }

    txn.commit().await?;
    info!(crop_id, "Removed crop");
    Ok(())
}

/// Adds `delta` to the stock with a single conditional UPDATE and re-derives the status.
///
/// A negative `delta` only applies while enough stock is left (within
/// [`STOCK_EPSILON`]); otherwise nothing is written and
/// [`Error::InsufficientStock`] is returned. A residue below the tolerance is
/// stored as zero. Run inside a transaction when combined with other writes.
pub async fn adjust_quantity_atomic<C>(db: &C, crop_id: i64, delta: f64) -> Result<crop::Model>
where
    C: ConnectionTrait,
{
    let mut update = Crop::update_many()
        .col_expr(
            crop::Column::QuantityAvailable,
            Expr::col(crop::Column::QuantityAvailable).add(delta),
        )
        .col_expr(crop::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(crop::Column::Id.eq(crop_id));
    if delta < 0.0 {
        update = update.filter(crop::Column::QuantityAvailable.gte(-delta - STOCK_EPSILON));
    }

    let result = update.exec(db).await?;

    let current = Crop::find_by_id(crop_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("crop", crop_id))?;

    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            available: current.quantity_available,
            requested: -delta,
        });
    }

    let drained = current.quantity_available < STOCK_EPSILON;
    let status = CropStatus::for_quantity(current.quantity_available);
    if status == current.status && !drained {
        return Ok(current);
    }
    let mut active: crop::ActiveModel = current.into();
    if drained {
        active.quantity_available = Set(0.0);
    }
    active.status = Set(status);
    active.update(db).await.map_err(Into::into)
}
