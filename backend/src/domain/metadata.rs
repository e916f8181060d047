//! Denormalised per-list summary rows shared across owners.
//!
//! The mirror answers cross-list questions (how many items, which type) without
//! waking every item worker. It is a cache: the list and item workers remain
//! authoritative and a row may lag behind them after a partial failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListId, ListType, UserId};

/// One mirror row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    /// List the row summarises.
    pub list_id: ListId,
    /// Current owner.
    pub user_id: UserId,
    /// Item count as last written by the item worker.
    pub items: i64,
    /// Variant as last written by the list worker.
    #[serde(rename = "type")]
    pub list_type: ListType,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When any field was last written.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a list with the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRegistration {
    /// List being registered.
    pub list_id: ListId,
    /// Owner to record.
    pub user_id: UserId,
    /// Variant to record.
    pub list_type: ListType,
    /// Write time.
    pub at: DateTime<Utc>,
}
