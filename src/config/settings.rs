//! Runtime settings read from the environment.
//!
//! `main` loads `.env` with `dotenvy` before calling [`Settings::from_env`], so
//! every value can live in either place. `JWT_SECRET` has no default: the server
//! refuses to start without it.

use crate::errors::{Error, Result};
use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr};
use tracing::info;

/// Default `SQLite` file, created on first run.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/agrotrust.sqlite?mode=rwc";

/// Tokens stay valid for one day unless configured otherwise.
pub const DEFAULT_JWT_EXPIRY_SECONDS: u64 = 24 * 60 * 60;

/// Shortest accepted signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Everything the server needs to boot.
#[derive(Clone)]
pub struct Settings {
    /// Connection string handed to `SeaORM`
    pub database_url: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Token lifetime
    pub jwt_expiry_seconds: u64,
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Where uploaded images are written and served from
    pub upload_dir: PathBuf,
    /// Optional TOML file with privileged accounts
    pub seed_file: PathBuf,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_seconds", &self.jwt_expiry_seconds)
            .field("bind_addr", &self.bind_addr)
            .field("upload_dir", &self.upload_dir)
            .field("seed_file", &self.seed_file)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "JWT_SECRET must be set".to_string(),
            })?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(Error::Config {
                message: format!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiry_seconds: parse_or(
                &lookup,
                "JWT_EXPIRY_SECONDS",
                DEFAULT_JWT_EXPIRY_SECONDS,
            )?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?,
            upload_dir: lookup("UPLOAD_DIR")
                .map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            seed_file: lookup("SEED_FILE")
                .map_or_else(|| PathBuf::from("config.toml"), PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| Error::Config {
            message: format!("Invalid {key} value {raw:?}: {e}"),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_secret_only() {
        let settings = Settings::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.jwt_expiry_seconds, DEFAULT_JWT_EXPIRY_SECONDS);
        assert_eq!(settings.bind_addr.port(), 5000);
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = Settings::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Settings::from_lookup(lookup_from(&[("JWT_SECRET", "short")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRY_SECONDS", "60"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(settings.jwt_expiry_seconds, 60);
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(settings.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = Settings::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRY_SECONDS", "soon"),
        ]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let settings = Settings::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap();
        assert!(!format!("{settings:?}").contains(SECRET));
    }
}
