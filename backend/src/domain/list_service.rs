//! List use cases behind the driving ports.
//!
//! The service resolves lists by owner and short id, turns `None` from the
//! storage ports into `not_found` errors, and maps port failures onto the
//! domain error once. All ordering and counting guarantees come from the
//! ports; the service adds none of its own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    ListDetail, ListItemRepository, ListItemRepositoryError, ListMetadataRepository,
    ListMetadataRepositoryError, ListRepository, ListRepositoryError, ListsCommand, ListsQuery,
    StartListRequest, UpdateListRequest,
};
use crate::domain::{
    AttributeChanges, CreatedList, Error, ItemAttributes, List, ListId, ListItemId,
    ListItemUpdate, ListMetadata, ListSummary, ListUpdate, NewList, NewListItem, ShortId, UserId,
    generate_list_name,
};

/// List service implementing [`ListsCommand`] and [`ListsQuery`].
#[derive(Clone)]
pub struct ListService<L, I, M> {
    lists: Arc<L>,
    items: Arc<I>,
    metadata: Arc<M>,
}

impl<L, I, M> ListService<L, I, M> {
    /// Create a new service over the given repositories.
    pub fn new(lists: Arc<L>, items: Arc<I>, metadata: Arc<M>) -> Self {
        Self {
            lists,
            items,
            metadata,
        }
    }
}

impl<L, I, M> ListService<L, I, M>
where
    L: ListRepository,
    I: ListItemRepository,
    M: ListMetadataRepository,
{
    fn map_list_error(error: ListRepositoryError) -> Error {
        match error {
            ListRepositoryError::Unavailable { message }
            | ListRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("list store unavailable: {message}"))
            }
            ListRepositoryError::Query { message } => {
                Error::internal(format!("list store error: {message}"))
            }
        }
    }

    fn map_item_error(error: ListItemRepositoryError) -> Error {
        match error {
            ListItemRepositoryError::Unavailable { message }
            | ListItemRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("item store unavailable: {message}"))
            }
            ListItemRepositoryError::Query { message } => {
                Error::internal(format!("item store error: {message}"))
            }
        }
    }

    fn map_metadata_error(error: ListMetadataRepositoryError) -> Error {
        match error {
            ListMetadataRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("metadata store unavailable: {message}"))
            }
            ListMetadataRepositoryError::Query { message } => {
                Error::internal(format!("metadata store error: {message}"))
            }
        }
    }

    fn list_not_found(short_id: &ShortId) -> Error {
        Error::not_found(format!("list {short_id} not found"))
    }

    fn item_not_found(item_id: &ListItemId) -> Error {
        Error::not_found(format!("list item {item_id} not found"))
    }

    async fn resolve(&self, owner: &UserId, short_id: &ShortId) -> Result<List, Error> {
        self.lists
            .find_by_short_id(owner, short_id)
            .await
            .map_err(Self::map_list_error)?
            .ok_or_else(|| Self::list_not_found(short_id))
    }

    async fn resolve_id(&self, owner: &UserId, short_id: &ShortId) -> Result<ListId, Error> {
        self.resolve(owner, short_id).await.map(|list| list.id)
    }

    fn list_name(requested: Option<String>) -> String {
        requested
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| generate_list_name(&mut rand::thread_rng()))
    }
}

#[async_trait]
impl<L, I, M> ListsQuery for ListService<L, I, M>
where
    L: ListRepository,
    I: ListItemRepository,
    M: ListMetadataRepository,
{
    async fn lists(&self, owner: &UserId) -> Result<Vec<ListSummary>, Error> {
        self.lists.list(owner).await.map_err(Self::map_list_error)
    }

    async fn list_detail(&self, owner: &UserId, short_id: &ShortId) -> Result<ListDetail, Error> {
        let list = self.resolve(owner, short_id).await?;
        let items = self
            .items
            .items(&list.id)
            .await
            .map_err(Self::map_item_error)?;
        Ok(ListDetail {
            short_id: list.short_id(),
            list,
            items,
        })
    }

    async fn metadata(&self, owner: &UserId) -> Result<Vec<ListMetadata>, Error> {
        self.metadata
            .for_user(owner)
            .await
            .map_err(Self::map_metadata_error)
    }
}

#[async_trait]
impl<L, I, M> ListsCommand for ListService<L, I, M>
where
    L: ListRepository,
    I: ListItemRepository,
    M: ListMetadataRepository,
{
    async fn start_list(
        &self,
        owner: &UserId,
        request: StartListRequest,
    ) -> Result<CreatedList, Error> {
        let StartListRequest {
            name,
            list_type,
            first_entry,
        } = request;
        let list = NewList {
            id: ListId::generate(),
            name: Self::list_name(name),
            list_type,
        };
        let created = self
            .lists
            .create(owner, list)
            .await
            .map_err(Self::map_list_error)?;
        debug!(list_id = %created.id, short_id = %created.short_id, "started list");

        if let Some(entry) = first_entry.filter(|entry| !entry.trim().is_empty()) {
            self.items
                .create(&created.id, NewListItem::with_content(entry))
                .await
                .map_err(Self::map_item_error)?;
        }
        Ok(created)
    }

    async fn update_list(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        request: UpdateListRequest,
    ) -> Result<CreatedList, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        let update = ListUpdate {
            name: request.name,
            list_type: request.list_type,
            deleted_at: None,
        };
        self.lists
            .update(owner, &list_id, update)
            .await
            .map_err(Self::map_list_error)?
            .ok_or_else(|| Self::list_not_found(short_id))
    }

    async fn delete_list(&self, owner: &UserId, short_id: &ShortId) -> Result<CreatedList, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        self.lists
            .delete(owner, &list_id)
            .await
            .map_err(Self::map_list_error)?
            .ok_or_else(|| Self::list_not_found(short_id))
    }

    async fn add_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        content: String,
    ) -> Result<ListItemId, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        self.items
            .create(&list_id, NewListItem::with_content(content))
            .await
            .map_err(Self::map_item_error)
    }

    async fn update_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
        update: ListItemUpdate,
    ) -> Result<ListItemId, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        self.items
            .update(&list_id, item_id, update)
            .await
            .map_err(Self::map_item_error)?
            .ok_or_else(|| Self::item_not_found(item_id))
    }

    async fn delete_item(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
    ) -> Result<(), Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        let deleted = self
            .items
            .delete(&list_id, item_id)
            .await
            .map_err(Self::map_item_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Self::item_not_found(item_id))
        }
    }

    async fn reorder_items(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        order: Vec<ListItemId>,
    ) -> Result<usize, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        self.items
            .reorder(&list_id, order)
            .await
            .map_err(Self::map_item_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "order for list {short_id} must name each of its items exactly once"
                ))
            })
    }

    async fn set_item_attributes(
        &self,
        owner: &UserId,
        short_id: &ShortId,
        item_id: &ListItemId,
        attributes: ItemAttributes,
    ) -> Result<AttributeChanges, Error> {
        let list_id = self.resolve_id(owner, short_id).await?;
        self.items
            .set_attributes(&list_id, item_id, attributes)
            .await
            .map_err(Self::map_item_error)?
            .ok_or_else(|| Self::item_not_found(item_id))
    }

    async fn migrate_account(&self, from: &UserId, to: &UserId) -> Result<usize, Error> {
        if from == to {
            return Err(Error::invalid_request(
                "cannot migrate an account into itself",
            ));
        }
        let summaries = self.lists.list(from).await.map_err(Self::map_list_error)?;
        let moved = summaries.len();
        for summary in summaries {
            let list = NewList {
                id: summary.list.id,
                name: summary.list.name,
                list_type: summary.list.list_type,
            };
            self.lists
                .create(to, list)
                .await
                .map_err(Self::map_list_error)?;
        }
        self.lists
            .destroy(from)
            .await
            .map_err(Self::map_list_error)?;
        info!(from = %from, to = %to, lists = moved, "migrated account lists");
        Ok(moved)
    }

    async fn repair_metadata(&self, owner: &UserId) -> Result<usize, Error> {
        let summaries = self.lists.list(owner).await.map_err(Self::map_list_error)?;
        for summary in &summaries {
            let items = self
                .items
                .sync_metadata(&summary.list.id)
                .await
                .map_err(Self::map_item_error)?;
            debug!(list_id = %summary.list.id, items, "repaired list metadata");
        }
        Ok(summaries.len())
    }
}

#[cfg(test)]
#[path = "list_service_tests.rs"]
mod tests;
