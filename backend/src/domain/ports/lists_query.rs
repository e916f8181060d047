//! Driving port for reading an owner's lists.
//!
//! HTTP handlers call [`ListsQuery`] to render listings, a single list with
//! its items, and the mirror view of an owner's lists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, List, ListItem, ListMetadata, ListSummary, ShortId, UserId};

/// A list together with its ordered items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDetail {
    /// The stored list.
    #[serde(flatten)]
    pub list: List,
    /// Short id derived from the list id.
    pub short_id: ShortId,
    /// Items in ascending order.
    pub items: Vec<ListItem>,
}

/// Driving port for list reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListsQuery: Send + Sync {
    /// Every live list of `owner` with its item count.
    async fn lists(&self, owner: &UserId) -> Result<Vec<ListSummary>, Error>;

    /// Resolve one live list by short id and load its items.
    ///
    /// # Errors
    ///
    /// Returns a `not_found` error when no live list of `owner` ends with
    /// `short_id`.
    async fn list_detail(&self, owner: &UserId, short_id: &ShortId) -> Result<ListDetail, Error>;

    /// Mirror rows owned by `owner`. Counts may lag behind the item stores.
    async fn metadata(&self, owner: &UserId) -> Result<Vec<ListMetadata>, Error>;
}

/// Fixture implementation with no lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListsQuery;

#[async_trait]
impl ListsQuery for FixtureListsQuery {
    async fn lists(&self, _owner: &UserId) -> Result<Vec<ListSummary>, Error> {
        Ok(Vec::new())
    }

    async fn list_detail(&self, _owner: &UserId, short_id: &ShortId) -> Result<ListDetail, Error> {
        Err(Error::not_found(format!("list {short_id} not found")))
    }

    async fn metadata(&self, _owner: &UserId) -> Result<Vec<ListMetadata>, Error> {
        Ok(Vec::new())
    }
}
