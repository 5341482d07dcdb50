//! Privileged account seeding from config.toml
//!
//! Registration only hands out farmer and buyer roles, so admin and
//! government-official accounts are declared in a TOML file and created at
//! startup when their email is not yet taken.

use crate::{
    core::user::{self, NewUser},
    entities::Role,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire seed file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// Accounts to create when missing
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// One seeded account
#[derive(Debug, Deserialize, Clone)]
pub struct AccountConfig {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Initial password
    pub password: String,
    /// Any role, including `ADMIN` and `GOV_OFFICIAL`
    pub role: Role,
}

/// Loads the seed file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Loads the seed file if it exists; a missing file yields an empty config.
pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "Seed file not found, skipping account seeding");
        return Ok(SeedConfig::default());
    }
    load_config(path)
}

/// Creates every configured account whose email is not registered yet.
///
/// Returns how many accounts were created.
pub async fn seed_accounts(db: &DatabaseConnection, config: &SeedConfig) -> Result<usize> {
    let mut created = 0;
    for account in &config.accounts {
        let email = account.email.trim().to_lowercase();
        if user::find_by_email(db, &email).await?.is_some() {
            continue;
        }
        user::create_user(
            db,
            NewUser {
                name: account.name.clone(),
                email,
                password: account.password.clone(),
                role: account.role,
                phone: None,
                location: None,
            },
        )
        .await?;
        created += 1;
    }
    info!(created, configured = config.accounts.len(), "Seeded accounts");
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use std::io::Write;

    const SEED: &str = r#"
        [[accounts]]
        name = "Site Admin"
        email = "Admin@AgroTrust.test"
        password = "change-me-now"
        role = "ADMIN"

        [[accounts]]
        name = "District Officer"
        email = "officer@agrotrust.test"
        password = "change-me-too"
        role = "GOV_OFFICIAL"
    "#;

    #[test]
    fn test_parse_seed_config() {
        let config: SeedConfig = toml::from_str(SEED).unwrap();
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].role, Role::Admin);
        assert_eq!(config.accounts[1].role, Role::GovOfficial);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let config = load_optional("/definitely/not/here.toml").unwrap();
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.accounts[1].name, "District Officer");

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        broken.write_all(b"[[accounts]]\nname = 3").unwrap();
        assert!(matches!(load_config(broken.path()), Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_seed_accounts_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config: SeedConfig = toml::from_str(SEED).unwrap();

        assert_eq!(seed_accounts(&db, &config).await?, 2);
        assert_eq!(seed_accounts(&db, &config).await?, 0);

        let admin = user::find_by_email(&db, "admin@agrotrust.test").await?.unwrap();
        assert_eq!(admin.role, Role::Admin);
        Ok(())
    }
}
