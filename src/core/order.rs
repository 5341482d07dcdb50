//! Order business logic - placement, listing and the status lifecycle.
//!
//! Placing an order reads the crop, writes the order, decrements the stock and
//! appends to the ledger inside one database transaction. The decrement itself
//! is conditional, so two buyers racing for the last units cannot both win.

use crate::{
    core::{crop as crop_ops, ledger, notification},
    entities::{Crop, Order, OrderStatus, Role, STOCK_EPSILON, order, user},
    errors::{Error, Result},
};
use sea_orm::{ActiveEnum, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// What a buyer submits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    /// Crop to buy
    pub crop_id: i64,
    /// How much, in the crop's unit
    pub quantity: f64,
    /// Optional delivery address
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Places an order for `buyer_id`.
///
/// # Errors
/// - [`Error::InvalidAmount`] for a zero, negative or non-finite quantity
/// - [`Error::NotFound`] if the crop does not exist or is hidden
/// - [`Error::Forbidden`] when a farmer tries to buy their own crop
/// - [`Error::InsufficientStock`] when the quantity exceeds what is left
pub async fn place_order(
    db: &DatabaseConnection,
    buyer_id: i64,
    request: PlaceOrder,
) -> Result<order::Model> {
    if !request.quantity.is_finite() || request.quantity <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: request.quantity,
        });
    }

    let txn = db.begin().await?;

    let crop = Crop::find_by_id(request.crop_id)
        .one(&txn)
        .await?
        .filter(|c| c.is_listed)
        .ok_or_else(|| Error::not_found("crop", request.crop_id))?;

    if crop.farmer_id == buyer_id {
        return Err(Error::forbidden("You cannot order your own crop"));
    }

    // Preliminary check for a clear error; the conditional decrement below is authoritative.
    if request.quantity > crop.quantity_available + STOCK_EPSILON {
        return Err(Error::InsufficientStock {
            available: crop.quantity_available,
            requested: request.quantity,
        });
    }

    let total_price = crop.price_per_unit * request.quantity;
    let now = chrono::Utc::now();
    let placed = order::ActiveModel {
        buyer_id: Set(buyer_id),
        crop_id: Set(crop.id),
        farmer_id: Set(crop.farmer_id),
        quantity: Set(request.quantity),
        unit_price: Set(crop.price_per_unit),
        total_price: Set(total_price),
        status: Set(OrderStatus::Pending),
        delivery_address: Set(request
            .delivery_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    crop_ops::adjust_quantity_atomic(&txn, crop.id, -request.quantity).await?;

    ledger::append(
        &txn,
        ledger::event::ORDER_PLACED,
        placed.id,
        buyer_id,
        &json!({
            "cropId": crop.id,
            "farmerId": crop.farmer_id,
            "quantity": placed.quantity,
            "unitPrice": placed.unit_price,
            "totalPrice": placed.total_price,
        }),
    )
    .await?;

    notification::notify(
        &txn,
        crop.farmer_id,
        notification::kind::ORDER,
        "New order",
        format!(
            "Order #{} for {} {} of {}",
            placed.id, placed.quantity, crop.unit, crop.name
        ),
    )
    .await?;

    txn.commit().await?;

    info!(
        order_id = placed.id,
        crop_id = crop.id,
        buyer_id,
        quantity = placed.quantity,
        "Placed order"
    );
    Ok(placed)
}

/// Finds an order by id.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Loads an order the viewer is party to. Admins see everything.
pub async fn get_order_for(
    db: &DatabaseConnection,
    order_id: i64,
    viewer: &user::Model,
) -> Result<order::Model> {
    let found = get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;
    let allowed = viewer.role == Role::Admin
        || found.buyer_id == viewer.id
        || found.farmer_id == viewer.id;
    if !allowed {
        return Err(Error::forbidden("You are not a party to this order"));
    }
    Ok(found)
}

/// A buyer's purchases, newest first.
pub async fn list_for_buyer(db: &DatabaseConnection, buyer_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::BuyerId.eq(buyer_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders against a farmer's crops, newest first.
pub async fn list_for_farmer(db: &DatabaseConnection, farmer_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::FarmerId.eq(farmer_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every order, optionally in one status, newest first.
pub async fn list_all(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find().order_by_desc(order::Column::Id);
    if let Some(status) = status {
        query = query.filter(order::Column::Status.eq(status));
    }
    query.all(db).await.map_err(Into::into)
}

/// Whether `actor` may move `order` to `next`, assuming the lifecycle allows it.
fn actor_may_apply(actor: &user::Model, order: &order::Model, next: OrderStatus) -> bool {
    if actor.role == Role::Admin {
        return true;
    }
    let is_seller = actor.id == order.farmer_id;
    let is_buyer = actor.id == order.buyer_id;
    match next {
        OrderStatus::Confirmed | OrderStatus::Shipped | OrderStatus::Delivered => is_seller,
        OrderStatus::Completed => is_buyer,
        OrderStatus::Cancelled => is_seller || is_buyer,
        OrderStatus::Pending => false,
    }
}

/// Moves an order along its lifecycle. Cancelling returns the stock to the crop.
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i64,
    actor: &user::Model,
    next: OrderStatus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let current = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;

    if actor.role != Role::Admin && actor.id != current.buyer_id && actor.id != current.farmer_id {
        return Err(Error::forbidden("You are not a party to this order"));
    }
    if !current.status.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            entity: "order",
            from: current.status.to_value(),
            to: next.to_value(),
        });
    }
    if !actor_may_apply(actor, &current, next) {
        return Err(Error::forbidden(format!(
            "Your role cannot move an order to {}",
            next.to_value()
        )));
    }

    let previous = current.status;
    let (crop_id, quantity, buyer_id) = (current.crop_id, current.quantity, current.buyer_id);

    let mut active: order::ActiveModel = current.into();
    active.status = Set(next);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    if next == OrderStatus::Cancelled {
        crop_ops::adjust_quantity_atomic(&txn, crop_id, quantity).await?;
    }

    ledger::append(
        &txn,
        ledger::event::ORDER_STATUS_CHANGED,
        order_id,
        actor.id,
        &json!({ "from": previous, "to": next }),
    )
    .await?;

    notification::notify(
        &txn,
        buyer_id,
        notification::kind::ORDER,
        "Order update",
        format!("Order #{order_id} is now {}", next.to_value()),
    )
    .await?;

    txn.commit().await?;
    info!(order_id, from = ?previous, to = ?next, "Order status changed");
    Ok(updated)
}
