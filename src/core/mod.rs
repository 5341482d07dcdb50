//! Business logic, independent of the HTTP layer.
//!
//! Every operation takes a database connection and returns [`crate::errors::Result`].

/// Complaint filing and handling
pub mod complaint;
/// Courses and lessons
pub mod course;
/// Crop listings and stock
pub mod crop;
/// Educational content
pub mod education;
/// Platform feedback
pub mod feedback;
/// Hash-chained audit ledger
pub mod ledger;
/// In-app notifications
pub mod notification;
/// Order placement and lifecycle
pub mod order;
/// Search across resources
pub mod search;
/// Admin counters
pub mod stats;
/// Subsidy programs and applications
pub mod subsidy;
/// Accounts and profiles
pub mod user;
/// Identity verification workflow
pub mod verification;
