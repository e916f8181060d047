//! Driving port for mutating an owner's lists and their items.
//!
//! Every list-scoped operation addresses the list by owner and short id. The
//! implementation resolves the list first, so a short id belonging to another
//! owner, or to a soft-deleted list, is reported as not found.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AttributeChanges, CreatedList, Error, ItemAttributes, ListItemId, ListItemUpdate, ListType,
    ShortId, UserId,
};

/// Request to start a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartListRequest {
    /// Display name. A three-word name is generated when absent.
    pub name: Option<String>,
    /// Variant.
    pub list_type: ListType,
    /// Content of a first item to add once the list exists.
    pub first_entry: Option<String>,
}

/// Request to rename a list or change its variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    /// New display name.
    pub name: Option<String>,
    /// New variant.
    pub list_type: Option<ListType>,
}

/// Driving port for list and item mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListsCommand: Send + Sync {
    /// Create a list for `owner`, optionally seeding its first item.
    async fn start_list(
        &self,
        owner: &UserId,
        request: StartListRequest,
    ) -> Result<CreatedList, Error>;

    /// Rename a list or change its variant.
    async fn update_list(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        request: UpdateListRequest,
    ) -> Result<CreatedList, Error>;

    /// Soft-delete a list.
    async fn delete_list(&self, owner: &UserId, short_id: &ShortId) -> Result<CreatedList, Error>;

    /// Append an item to a list.
    async fn add_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        content: String,
    ) -> Result<ListItemId, Error>;

    /// Change an item's content or completion time.
    async fn update_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
        update: ListItemUpdate,
    ) -> Result<ListItemId, Error>;

    /// Remove an item from a list.
    async fn delete_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
    ) -> Result<(), Error>;

    /// Reassign item positions from the supplied id sequence.
    async fn reorder_items(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        order: Vec<ListItemId>,
    ) -> Result<usize, Error>;

    /// Replace an item's shopping attributes.
    async fn set_item_attributes(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
        attributes: ItemAttributes,
    ) -> Result<AttributeChanges, Error>;

    /// Move every live list of `from` to `to` and wipe the storage of
    /// `from`. Returns the number of lists moved.
    async fn migrate_account(&self, from: &UserId, to: &UserId) -> Result<usize, Error>;

    /// Rewrite the mirror item count of every live list of `owner`.
    /// Returns the number of lists repaired.
    async fn repair_metadata(&self, owner: &UserId) -> Result<usize, Error>;
}

/// Fixture implementation that accepts every command without storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListsCommand;

#[async_trait]
impl ListsCommand for FixtureListsCommand {
    async fn start_list(
        &self,
        _owner: &UserId,
        request: StartListRequest,
    ) -> Result<CreatedList, Error> {
        let name = request.name.unwrap_or_else(|| "Fixture List".to_owned());
        Ok(CreatedList::new(
            crate::domain::ListId::generate(),
            crate::domain::slugify(&name),
        ))
    }

    async fn update_list(
        &self,
        _owner: &UserId,
        short_id: &ShortId,
        _request: UpdateListRequest,
    ) -> Result<CreatedList, Error> {
        Err(Error::not_found(format!("list {short_id} not found")))
    }

    async fn delete_list(&self, _owner: &UserId, short_id: &ShortId) -> Result<CreatedList, Error> {
        Err(Error::not_found(format!("list {short_id} not found")))
    }

    async fn add_item(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
        _content: String,
    ) -> Result<ListItemId, Error> {
        Ok(ListItemId::generate())
    }

    async fn update_item(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
        item_id: &ListItemId,
        _update: ListItemUpdate,
    ) -> Result<ListItemId, Error> {
        Ok(*item_id)
    }

    async fn delete_item(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
        _item_id: &ListItemId,
    ) -> Result<(), Error> {
        Ok(())
    }

    async fn reorder_items(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
        order: Vec<ListItemId>,
    ) -> Result<usize, Error> {
        Ok(order.len())
    }

    async fn set_item_attributes(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
        _item_id: &ListItemId,
        _attributes: ItemAttributes,
    ) -> Result<AttributeChanges, Error> {
        Ok(AttributeChanges::default())
    }

    async fn migrate_account(&self, _from: &UserId, _to: &UserId) -> Result<usize, Error> {
        Ok(0)
    }

    async fn repair_metadata(&self, _owner: &UserId) -> Result<usize, Error> {
        Ok(0)
    }
}
