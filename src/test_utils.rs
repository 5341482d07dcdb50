//! Shared test utilities for `AgroTrust`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        crop::{self, CropInput},
        user::{self, NewUser},
    },
    entities::{self, Role},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Password given to every account created by [`create_test_user`].
pub const TEST_PASSWORD: &str = "harvest-2024";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user with any role, bypassing the registration role check.
///
/// # Defaults
/// * `email`: the lowercased name without spaces, at `example.com`
/// * `password`: [`TEST_PASSWORD`]
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    role: Role,
) -> Result<entities::user::Model> {
    let local: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    user::create_user(
        db,
        NewUser {
            name: name.to_string(),
            email: format!("{local}@example.com"),
            password: TEST_PASSWORD.to_string(),
            role,
            phone: None,
            location: None,
        },
    )
    .await
}

/// Crop input with sensible defaults.
///
/// # Defaults
/// * `category`: "Vegetable"
/// * `unit`: kg
/// * `location`: "Nashik"
pub fn crop_input(name: &str, price_per_unit: f64, quantity_available: f64) -> CropInput {
    CropInput {
        name: name.to_string(),
        category: "Vegetable".to_string(),
        description: None,
        price_per_unit,
        unit: None,
        quantity_available,
        location: "Nashik".to_string(),
    }
}

/// Sets up a database with one farmer.
/// Returns (db, farmer).
pub async fn setup_with_farmer() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let farmer = create_test_user(&db, "Farmer", Role::Farmer).await?;
    Ok((db, farmer))
}

/// Sets up a database with a farmer and one listed crop of `quantity` kg at 25.0/kg.
/// Returns (db, farmer, crop).
pub async fn setup_with_crop(
    quantity: f64,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::crop::Model,
)> {
    let (db, farmer) = setup_with_farmer().await?;
    let listed = crop::create_crop(&db, farmer.id, crop_input("Tomato", 25.0, quantity)).await?;
    Ok((db, farmer, listed))
}
