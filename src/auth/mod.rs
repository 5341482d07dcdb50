//! Credentials: password hashing and signed bearer tokens.

/// Argon2id password hashing
pub mod password;
/// HS256 bearer tokens
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService, extract_bearer};
