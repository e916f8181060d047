//! Items stored by a list's item worker.
//!
//! Items are kept in a dense `position` order starting at 1. New items are
//! appended at the tail; deletes compact the survivors; reorders reassign the
//! whole sequence from a caller-supplied permutation of ids.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ItemAttributes;

/// Validation failure for item identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("list item id must be a valid UUID")]
pub struct InvalidListItemId;

/// Stable identifier of a list item (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListItemId(Uuid);

impl ListItemId {
    /// Mint a fresh, time-sortable identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ListItemId {
    type Err = InvalidListItemId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(|_| InvalidListItemId)
    }
}

/// A stored list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Identifier.
    pub id: ListItemId,
    /// Label shown for the entry.
    pub content: String,
    /// Completion time; meaningful for todo lists.
    pub completed_at: Option<DateTime<Utc>>,
    /// 1-based position within the list.
    pub order: i64,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Shopping attributes; `None` when the item has no attribute rows.
    pub attributes: Option<ItemAttributes>,
}

/// Input for appending an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListItem {
    /// Identifier to store the item under.
    pub id: ListItemId,
    /// Label shown for the entry.
    pub content: String,
}

impl NewListItem {
    /// Build an item input with a freshly minted identifier.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            id: ListItemId::generate(),
            content: content.into(),
        }
    }
}

/// Partial item update. Position changes go through reorder instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItemUpdate {
    /// New label.
    pub content: Option<String>,
    /// `Some(None)` clears the completion time; `None` leaves it unchanged.
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl ListItemUpdate {
    /// Return `true` when no field would change.
    pub const fn is_empty(&self) -> bool {
        self.content.is_none() && self.completed_at.is_none()
    }
}
