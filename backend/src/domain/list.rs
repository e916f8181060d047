//! List aggregate owned by a user's list worker.
//!
//! Lists carry a time-sortable identifier, a display name and the slug
//! derived from it, a variant tag and a soft-delete marker. The short id used
//! in URLs is computed from the identifier on demand and never stored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of trailing identifier characters exposed as the short id.
pub const SHORT_ID_LEN: usize = 8;

/// Maximum accepted list name length, matching the storage column.
pub const LIST_NAME_MAX: usize = 250;

/// Validation failures for list primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListValidationError {
    /// The identifier was not a canonical UUID.
    #[error("list id must be a valid UUID")]
    InvalidId,
    /// The short id was not eight hexadecimal characters.
    #[error("short id must be {SHORT_ID_LEN} hexadecimal characters")]
    InvalidShortId,
    /// The list type was not one of the known variants.
    #[error("list type must be one of basic, todo or shopping")]
    UnknownType {
        /// Rejected raw value.
        value: String,
    },
}

/// Stable identifier of a list (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(Uuid);

impl ListId {
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

    /// Derive the human-friendly short id: the last eight characters of the
    /// hyphenated identifier.
    ///
    /// # Examples
    /// ```
    /// use lists::domain::ListId;
    ///
    /// let id: ListId = "11111111-2222-3333-4444-555555555555".parse().expect("valid id");
    /// assert_eq!(id.short_id().as_str(), "55555555");
    /// ```
    pub fn short_id(&self) -> ShortId {
        // The trailing eight hex digits encode the low 32 bits.
        ShortId(format!("{:08x}", self.0.as_u128() & 0xffff_ffff))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ListId {
    type Err = ListValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ListValidationError::InvalidId)
    }
}

/// Trailing identifier fragment used in list URLs.
///
/// Always eight lowercase hexadecimal characters, so it can be embedded in a
/// suffix pattern without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortId(String);

impl ShortId {
    /// Validate a short id supplied by a client.
    ///
    /// # Examples
    /// ```
    /// use lists::domain::ShortId;
    ///
    /// assert!(ShortId::new("55555555").is_ok());
    /// assert!(ShortId::new("5555-555").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ListValidationError> {
        let lowered = raw.as_ref().to_ascii_lowercase();
        let valid = lowered.len() == SHORT_ID_LEN && lowered.chars().all(|ch| ch.is_ascii_hexdigit());
        if valid {
            Ok(Self(lowered))
        } else {
            Err(ListValidationError::InvalidShortId)
        }
    }

    /// Borrow the short id as text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ShortId> for String {
    fn from(value: ShortId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ShortId {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// List variant. Changes which optional item fields are meaningful:
/// completion timestamps for `todo`, attributes for `shopping`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Plain list of entries.
    #[default]
    Basic,
    /// Entries can be completed.
    Todo,
    /// Entries carry category, price and quantity attributes.
    Shopping,
}

impl ListType {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Todo => "todo",
            Self::Shopping => "shopping",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = ListValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "todo" => Ok(Self::Todo),
            "shopping" => Ok(Self::Shopping),
            other => Err(ListValidationError::UnknownType {
                value: other.to_owned(),
            }),
        }
    }
}

/// A stored list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Identifier.
    pub id: ListId,
    /// Display name.
    pub name: String,
    /// Slug derived from `name`.
    pub slug: String,
    /// Variant.
    #[serde(rename = "type")]
    pub list_type: ListType,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Short id derived from the identifier.
    pub fn short_id(&self) -> ShortId {
        self.id.short_id()
    }
}

/// Input for creating a list. The caller chooses the identifier so lists can
/// be re-created under a new owner with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewList {
    /// Identifier to store the list under.
    pub id: ListId,
    /// Display name; the slug is derived from it.
    pub name: String,
    /// Variant.
    pub list_type: ListType,
}

impl NewList {
    /// Build a list input with a freshly minted identifier.
    pub fn named(name: impl Into<String>, list_type: ListType) -> Self {
        Self {
            id: ListId::generate(),
            name: name.into(),
            list_type,
        }
    }
}

/// Partial list update. Absent fields are left unchanged; `updated_at` is
/// always refreshed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUpdate {
    /// New display name; re-derives the slug.
    pub name: Option<String>,
    /// New variant; mirrored to the metadata store before the local write.
    pub list_type: Option<ListType>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Identity returned by list mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedList {
    /// Identifier.
    pub id: ListId,
    /// Current slug.
    pub slug: String,
    /// Short id derived from `id`.
    pub short_id: ShortId,
}

impl CreatedList {
    /// Assemble the identity for a stored list.
    pub fn new(id: ListId, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            short_id: id.short_id(),
        }
    }
}

/// List as returned by owner listings, with its current item count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    /// The stored list.
    #[serde(flatten)]
    pub list: List,
    /// Short id derived from the list id.
    pub short_id: ShortId,
    /// Number of items, fetched from the list's item worker.
    pub entries: i64,
}
