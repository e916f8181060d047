//! Port for a list's item storage.
//!
//! Calls are addressed by list id. Adapters serialise all calls for one list
//! so the cached item count and the dense ordering stay consistent without
//! further locking.

use async_trait::async_trait;

use crate::domain::{
    AttributeChanges, ItemAttributes, ListId, ListItem, ListItemId, ListItemUpdate, NewListItem,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by list item repository adapters.
    pub enum ListItemRepositoryError {
        /// The list's item store could not be opened or migrated.
        Unavailable { message: String } =>
            "item store unavailable: {message}",
        /// Connection to the item store failed.
        Connection { message: String } =>
            "list item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "list item repository query failed: {message}",
    }
}

/// Port for the ordered items of one list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListItemRepository: Send + Sync {
    /// Append an item at the tail and mirror the new count.
    async fn create(
        &self,
        list_id: &ListId,
        item: NewListItem,
    ) -> Result<ListItemId, ListItemRepositoryError>;

    /// Remove an item, compact the survivors and mirror the new count.
    /// Returns `false` when no such item exists.
    async fn delete(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
    ) -> Result<bool, ListItemRepositoryError>;

    /// Items in ascending order, each with its attributes.
    async fn items(&self, list_id: &ListId) -> Result<Vec<ListItem>, ListItemRepositoryError>;

    /// Apply a partial update. Returns `None` when no such item exists.
    async fn update(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
        update: ListItemUpdate,
    ) -> Result<Option<ListItemId>, ListItemRepositoryError>;

    /// Assign `order = index + 1` to each supplied id. Returns the number of
    /// items updated, or `None` without touching any item when `order` is not
    /// exactly the list's item ids.
    async fn reorder(
        &self,
        list_id: &ListId,
        order: Vec<ListItemId>,
    ) -> Result<Option<usize>, ListItemRepositoryError>;

    /// Replace an item's attributes. Returns `None` when no such item exists.
    async fn set_attributes(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
        attributes: ItemAttributes,
    ) -> Result<Option<AttributeChanges>, ListItemRepositoryError>;

    /// Cached item count.
    async fn count(&self, list_id: &ListId) -> Result<i64, ListItemRepositoryError>;

    /// Rewrite the mirror's item count from the cached count.
    async fn sync_metadata(&self, list_id: &ListId) -> Result<i64, ListItemRepositoryError>;
}

/// Fixture implementation backed by nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListItemRepository;

#[async_trait]
impl ListItemRepository for FixtureListItemRepository {
    async fn create(
        &self,
        _list_id: &ListId,
        item: NewListItem,
    ) -> Result<ListItemId, ListItemRepositoryError> {
        Ok(item.id)
    }

    async fn delete(
        &self,
        _list_id: &ListId,
        _item_id: &ListItemId,
    ) -> Result<bool, ListItemRepositoryError> {
        Ok(false)
    }

    async fn items(&self, _list_id: &ListId) -> Result<Vec<ListItem>, ListItemRepositoryError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _list_id: &ListId,
        _item_id: &ListItemId,
        _update: ListItemUpdate,
    ) -> Result<Option<ListItemId>, ListItemRepositoryError> {
        Ok(None)
    }

    async fn reorder(
        &self,
        _list_id: &ListId,
        order: Vec<ListItemId>,
    ) -> Result<Option<usize>, ListItemRepositoryError> {
        Ok(order.is_empty().then_some(0))
    }

    async fn set_attributes(
        &self,
        _list_id: &ListId,
        _item_id: &ListItemId,
        _attributes: ItemAttributes,
    ) -> Result<Option<AttributeChanges>, ListItemRepositoryError> {
        Ok(None)
    }

    async fn count(&self, _list_id: &ListId) -> Result<i64, ListItemRepositoryError> {
        Ok(0)
    }

    async fn sync_metadata(&self, _list_id: &ListId) -> Result<i64, ListItemRepositoryError> {
        Ok(0)
    }
}
