//! User business logic - registration, login and profile management.

use crate::{
    auth::{hash_password, verify_password},
    entities::{Role, User, VerificationStatus, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Data needed to create an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Requested role
    pub role: Role,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Location
    #[serde(default)]
    pub location: Option<String>,
}

/// Self-service profile edit. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New phone
    pub phone: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New password; requires `current_password`
    pub new_password: Option<String>,
    /// Current password, checked before a password change
    pub current_password: Option<String>,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(Error::validation("A valid email address is required")),
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Roles anyone may pick when signing up. Admins and officials are seeded.
#[must_use]
pub const fn is_self_registrable(role: Role) -> bool {
    matches!(role, Role::Farmer | Role::Buyer)
}

/// Creates an account with any role. Used by registration and seeding.
///
/// # Errors
/// - Empty name, malformed email or short password
/// - Email already registered
pub async fn create_user(db: &DatabaseConnection, input: NewUser) -> Result<user::Model> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Name cannot be empty"));
    }
    let email = normalize_email(&input.email)?;
    validate_password(&input.password)?;

    if find_by_email(db, &email).await?.is_some() {
        return Err(Error::conflict(format!("Email {email} is already registered")));
    }

    let now = chrono::Utc::now();
    let created = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&input.password)?),
        role: Set(input.role),
        phone: Set(input.phone.filter(|p| !p.trim().is_empty())),
        location: Set(input.location.filter(|l| !l.trim().is_empty())),
        verification_status: Set(VerificationStatus::Unverified),
        is_verified: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = created.id, role = ?created.role, "Registered user");
    Ok(created)
}

/// Public sign-up: same as [`create_user`] but limited to farmer and buyer roles.
pub async fn register(db: &DatabaseConnection, input: NewUser) -> Result<user::Model> {
    if !is_self_registrable(input.role) {
        return Err(Error::forbidden(
            "Only FARMER and BUYER accounts can self-register",
        ));
    }
    create_user(db, input).await
}

/// Checks credentials and returns the matching user.
///
/// Unknown email and wrong password produce the same error.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let invalid = || Error::Unauthorized {
        message: "Invalid email or password".to_string(),
    };

    let email = email.trim().to_lowercase();
    let user = find_by_email(db, &email).await?.ok_or_else(invalid)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }
    Ok(user)
}

/// Finds a user by (already normalized) email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Lists users, optionally of one role, ordered by id.
pub async fn list_users(db: &DatabaseConnection, role: Option<Role>) -> Result<Vec<user::Model>> {
    let mut query = User::find().order_by_asc(user::Column::Id);
    if let Some(role) = role {
        query = query.filter(user::Column::Role.eq(role));
    }
    query.all(db).await.map_err(Into::into)
}

/// Applies a self-service profile edit.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let mut active: user::ActiveModel = existing.clone().into();

    if let Some(name) = update.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Name cannot be empty"));
        }
        active.name = Set(name);
    }
    if let Some(phone) = update.phone {
        active.phone = Set(Some(phone.trim().to_string()).filter(|p| !p.is_empty()));
    }
    if let Some(location) = update.location {
        active.location = Set(Some(location.trim().to_string()).filter(|l| !l.is_empty()));
    }
    if let Some(new_password) = update.new_password {
        let current = update.current_password.unwrap_or_default();
        if !verify_password(&current, &existing.password_hash)? {
            return Err(Error::Unauthorized {
                message: "Current password is incorrect".to_string(),
            });
        }
        validate_password(&new_password)?;
        active.password_hash = Set(hash_password(&new_password)?);
    }

    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}
