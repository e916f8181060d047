//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Identifiers are stored as hyphenated UUID
//! text and timestamps as naive UTC, so conversions back into domain types
//! can fail on corrupted rows.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use super::StoreError;
use super::schema::{actor_storage, attribute, list, list_item, list_metadata};
use crate::domain::{
    ItemAttributes, List, ListId, ListItem, ListItemId, ListMetadata, ListType, UserId,
};

fn parse_list_id(raw: &str) -> Result<ListId, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::encoding(format!("invalid stored list id: {raw}")))
}

fn parse_list_type(raw: &str) -> Result<ListType, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::encoding(format!("invalid stored list type: {raw}")))
}

// ---------------------------------------------------------------------------
// List models
// ---------------------------------------------------------------------------

/// Row struct for reading from the list table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = list)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ListRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub list_type: String,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl TryFrom<ListRow> for List {
    type Error = StoreError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_list_id(&row.id)?,
            list_type: parse_list_type(&row.list_type)?,
            name: row.name,
            slug: row.slug,
            deleted_at: row.deleted_at.map(|at| at.and_utc()),
            updated_at: row.updated_at.and_utc(),
        })
    }
}

/// Insertable struct for creating list records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = list)]
pub(crate) struct NewListRow<'a> {
    pub id: String,
    pub name: &'a str,
    pub slug: &'a str,
    pub list_type: &'a str,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial list updates. `None` fields are left unchanged.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = list)]
pub(crate) struct ListChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<String>,
    pub list_type: Option<&'a str>,
    pub deleted_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// List item models
// ---------------------------------------------------------------------------

/// Row struct for reading from the list_item table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = list_item)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ListItemRow {
    pub id: String,
    pub content: String,
    pub completed_at: Option<NaiveDateTime>,
    pub position: i64,
    pub updated_at: NaiveDateTime,
}

impl ListItemRow {
    /// Convert into a domain item carrying the given attributes.
    pub fn into_item(self, attributes: Option<ItemAttributes>) -> Result<ListItem, StoreError> {
        let id: ListItemId = self
            .id
            .parse()
            .map_err(|_| StoreError::encoding(format!("invalid stored item id: {}", self.id)))?;
        Ok(ListItem {
            id,
            content: self.content,
            completed_at: self.completed_at.map(|at| at.and_utc()),
            order: self.position,
            updated_at: self.updated_at.and_utc(),
            attributes,
        })
    }
}

/// Insertable struct for appending items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = list_item)]
pub(crate) struct NewListItemRow<'a> {
    pub id: String,
    pub content: &'a str,
    pub position: i64,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial item updates. `Some(None)` clears `completed_at`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = list_item)]
pub(crate) struct ListItemChangeset<'a> {
    pub content: Option<&'a str>,
    pub completed_at: Option<Option<NaiveDateTime>>,
    pub updated_at: NaiveDateTime,
}

/// Row struct for the attribute table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = attribute)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AttributeRow {
    pub list_item_id: String,
    #[diesel(column_name = kind)]
    pub attribute: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Metadata models
// ---------------------------------------------------------------------------

/// Row struct for reading from the list_metadata table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = list_metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ListMetadataRow {
    pub list_id: String,
    pub user_id: String,
    pub items: i64,
    pub list_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ListMetadataRow> for ListMetadata {
    type Error = StoreError;

    fn try_from(row: ListMetadataRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(&row.user_id)
            .map_err(|_| StoreError::encoding(format!("invalid stored user id: {}", row.user_id)))?;
        Ok(Self {
            list_id: parse_list_id(&row.list_id)?,
            user_id,
            items: row.items,
            list_type: parse_list_type(&row.list_type)?,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        })
    }
}

/// Insertable struct for registering a list with the mirror.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = list_metadata)]
pub(crate) struct NewListMetadataRow<'a> {
    pub list_id: String,
    pub user_id: String,
    pub items: i64,
    pub list_type: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Actor storage
// ---------------------------------------------------------------------------

/// Row struct for the actor_storage table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = actor_storage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ActorStorageRow {
    pub key: String,
    pub value: String,
}

/// Naive UTC form used by every timestamp column.
pub(crate) fn to_naive(at: DateTime<Utc>) -> NaiveDateTime {
    at.naive_utc()
}
