//! Ledger entry entity - one link of the hash-chained audit trail.
//!
//! Rows are only ever inserted. Each `hash` covers the previous entry's hash,
//! so editing any row breaks every hash after it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier, also the chain order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event name (e.g., `"ORDER_PLACED"`)
    pub event_type: String,
    /// Id of the record the event is about
    pub reference_id: i64,
    /// User who caused the event
    pub actor_id: i64,
    /// Event details as JSON text
    pub payload: String,
    /// Hash of the previous entry
    pub prev_hash: String,
    /// SHA-256 of this entry, hex encoded
    pub hash: String,
    /// When the event was recorded
    pub created_at: DateTimeUtc,
}

/// `LedgerEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
