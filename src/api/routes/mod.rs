//! Route modules, one per resource. Each exposes `router()`.

pub mod admin;
pub mod auth;
pub mod complaints;
pub mod courses;
pub mod crops;
pub mod education;
pub mod feedback;
pub mod ledger;
pub mod notifications;
pub mod orders;
pub mod search;
pub mod subsidies;
pub mod users;
pub mod verifications;
