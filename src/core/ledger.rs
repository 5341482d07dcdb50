//! Hash-chained audit ledger.
//!
//! Each entry's hash covers the previous entry's hash plus its own fields, so
//! [`verify_chain`] can detect any edited or deleted row. Appends happen inside
//! the caller's transaction, which keeps the read-last-then-insert step serial.

use crate::{
    entities::{LedgerEntry, ledger_entry},
    errors::Result,
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// `prev_hash` of the very first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Event names written to `ledger_entry.event_type`.
pub mod event {
    /// A buyer placed an order
    pub const ORDER_PLACED: &str = "ORDER_PLACED";
    /// An order moved along its lifecycle
    pub const ORDER_STATUS_CHANGED: &str = "ORDER_STATUS_CHANGED";
    /// A subsidy application was approved or rejected
    pub const SUBSIDY_APPLICATION_REVIEWED: &str = "SUBSIDY_APPLICATION_REVIEWED";
    /// A verification request was approved or rejected
    pub const VERIFICATION_REVIEWED: &str = "VERIFICATION_REVIEWED";
}

/// Result of walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    /// True when every entry links and hashes correctly
    pub valid: bool,
    /// Number of entries checked
    pub entries: u64,
    /// First entry whose link or hash does not match
    pub broken_at: Option<i64>,
}

/// SHA-256 over the entry fields, hex encoded.
#[must_use]
pub fn compute_hash(
    prev_hash: &str,
    event_type: &str,
    reference_id: i64,
    actor_id: i64,
    payload: &str,
    created_at: i64,
) -> String {
    let reference_id = reference_id.to_string();
    let actor_id = actor_id.to_string();
    let created_at = created_at.to_string();

    let mut hasher = Sha256::new();
    for part in [
        prev_hash,
        event_type,
        reference_id.as_str(),
        actor_id.as_str(),
        payload,
        created_at.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    hex::encode(hasher.finalize())
}

/// Appends an entry chained onto the current tail.
pub async fn append<C, P>(
    db: &C,
    event_type: &str,
    reference_id: i64,
    actor_id: i64,
    payload: &P,
) -> Result<ledger_entry::Model>
where
    C: ConnectionTrait,
    P: Serialize + ?Sized,
{
    let prev_hash = LedgerEntry::find()
        .order_by_desc(ledger_entry::Column::Id)
        .one(db)
        .await?
        .map_or_else(|| GENESIS_HASH.to_string(), |tail| tail.hash);

    let payload = serde_json::to_string(payload)?;
    let created_at = chrono::Utc::now();
    let hash = compute_hash(
        &prev_hash,
        event_type,
        reference_id,
        actor_id,
        &payload,
        created_at.timestamp(),
    );
    debug!(event_type, reference_id, %hash, "Appending ledger entry");

    ledger_entry::ActiveModel {
        event_type: Set(event_type.to_string()),
        reference_id: Set(reference_id),
        actor_id: Set(actor_id),
        payload: Set(payload),
        prev_hash: Set(prev_hash),
        hash: Set(hash),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Lists entries in chain order, optionally only one event type.
pub async fn list_entries(
    db: &DatabaseConnection,
    event_type: Option<&str>,
) -> Result<Vec<ledger_entry::Model>> {
    let mut query = LedgerEntry::find().order_by_asc(ledger_entry::Column::Id);
    if let Some(event_type) = event_type {
        query = query.filter(ledger_entry::Column::EventType.eq(event_type));
    }
    query.all(db).await.map_err(Into::into)
}

/// Recomputes every hash and checks every link.
pub async fn verify_chain(db: &DatabaseConnection) -> Result<ChainReport> {
    let entries = list_entries(db, None).await?;
    let mut expected_prev = GENESIS_HASH.to_string();

    for entry in &entries {
        let recomputed = compute_hash(
            &entry.prev_hash,
            &entry.event_type,
            entry.reference_id,
            entry.actor_id,
            &entry.payload,
            entry.created_at.timestamp(),
        );
        if entry.prev_hash != expected_prev || entry.hash != recomputed {
            warn!(entry_id = entry.id, "Ledger chain broken");
            return Ok(ChainReport {
                valid: false,
                entries: entries.len() as u64,
                broken_at: Some(entry.id),
            });
        }
        expected_prev.clone_from(&entry.hash);
    }

    Ok(ChainReport {
        valid: true,
        entries: entries.len() as u64,
        broken_at: None,
    })
}
