//! Worker owning the ordered items of one list.
//!
//! The worker keeps a running item count in memory, persists it in actor
//! storage and mirrors it to the metadata store on every create and delete.
//! Item positions stay dense: new items take `count` after the increment and
//! deletes shift every later item down by one.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    ListItemRepository, ListItemRepositoryError, ListMetadataRepository,
    ListMetadataRepositoryError,
};
use crate::domain::{
    AttributeChanges, AttributeKind, ItemAttributes, ListId, ListItem, ListItemId, ListItemUpdate,
    NewListItem,
};
use crate::outbound::persistence::models::{
    AttributeRow, ListItemChangeset, ListItemRow, NewListItemRow, to_naive,
};
use crate::outbound::persistence::schema::{attribute, list_item};
use crate::outbound::persistence::{EmbeddedStore, StoreError, StoreKind, StoreLocation};

use super::locator::{Actor, ActorError, EntityLocator, Flow, Reply};

const COUNT_KEY: &str = "count";

/// Dependencies shared by every item worker.
#[derive(Clone)]
pub struct ListItemContext {
    /// Mirror receiving item counts.
    pub metadata: Arc<dyn ListMetadataRepository>,
    /// Source of `updated_at` timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Messages understood by [`ListItemActor`].
pub enum ListItemMessage {
    /// Append an item at the tail.
    Create {
        /// Item to store.
        item: NewListItem,
        /// Identifier of the stored item.
        reply: Reply<ListItemId>,
    },
    /// Remove an item and compact the survivors.
    Delete {
        /// Item to remove.
        item_id: ListItemId,
        /// Whether an item was removed.
        reply: Reply<bool>,
    },
    /// Read every item in order.
    Items {
        /// Items with attributes.
        reply: Reply<Vec<ListItem>>,
    },
    /// Change content or completion time.
    Update {
        /// Item to change.
        item_id: ListItemId,
        /// Fields to change.
        update: ListItemUpdate,
        /// The item id, or `None` when unknown.
        reply: Reply<Option<ListItemId>>,
    },
    /// Reassign positions from an id sequence.
    Reorder {
        /// Ids in their new order.
        order: Vec<ListItemId>,
        /// Number of items moved, or `None` when `order` is not a
        /// permutation of the stored ids.
        reply: Reply<Option<usize>>,
    },
    /// Replace an item's attributes.
    SetAttributes {
        /// Item to change.
        item_id: ListItemId,
        /// Complete new attribute set.
        attributes: ItemAttributes,
        /// The applied diff, or `None` when the item is unknown.
        reply: Reply<Option<AttributeChanges>>,
    },
    /// Read the cached count.
    Count {
        /// Cached count.
        reply: Reply<i64>,
    },
    /// Rewrite the mirror count from the cached count.
    SyncMetadata {
        /// Count written.
        reply: Reply<i64>,
    },
    /// Wipe all items and stop.
    Destroy {
        /// Completion.
        reply: Reply<()>,
    },
}

/// Single writer for one list's items.
pub struct ListItemActor {
    list_id: ListId,
    store: EmbeddedStore,
    count: i64,
    context: ListItemContext,
}

fn mirror_error(error: ListMetadataRepositoryError) -> StoreError {
    match error {
        ListMetadataRepositoryError::Connection { message } => {
            StoreError::connection(format!("metadata mirror: {message}"))
        }
        ListMetadataRepositoryError::Query { message } => {
            StoreError::query(format!("metadata mirror: {message}"))
        }
    }
}

fn position_for(index: usize) -> Result<i64, StoreError> {
    i64::try_from(index)
        .ok()
        .and_then(|index| index.checked_add(1))
        .ok_or_else(|| StoreError::query("reorder sequence too long"))
}

impl ListItemActor {
    async fn persist_count(&mut self) -> Result<(), StoreError> {
        let count = self.count;
        let now = self.context.clock.utc();
        let metadata = &self.context.metadata;
        let list_id = &self.list_id;
        let mirrored = async move {
            metadata
                .record_items(list_id, count, now)
                .await
                .map_err(mirror_error)
        };
        tokio::try_join!(self.store.put_value(COUNT_KEY, &count), mirrored)?;
        Ok(())
    }

    async fn create(&mut self, item: NewListItem) -> Result<ListItemId, StoreError> {
        self.count += 1;
        self.persist_count().await?;

        let row = NewListItemRow {
            id: item.id.to_string(),
            content: &item.content,
            position: self.count,
            updated_at: to_naive(self.context.clock.utc()),
        };
        diesel::insert_into(list_item::table)
            .values(&row)
            .execute(self.store.conn())
            .await?;
        debug!(list_id = %self.list_id, item_id = %item.id, order = self.count, "created list item");
        Ok(item.id)
    }

    async fn delete(&mut self, item_id: ListItemId) -> Result<bool, StoreError> {
        let id = item_id.to_string();
        let removed = self
            .store
            .conn()
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    let position: Option<i64> = list_item::table
                        .filter(list_item::id.eq(&id))
                        .select(list_item::position)
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(position) = position else {
                        return Ok(false);
                    };
                    diesel::delete(list_item::table.filter(list_item::id.eq(&id)))
                        .execute(conn)
                        .await?;
                    diesel::update(list_item::table.filter(list_item::position.gt(position)))
                        .set(list_item::position.eq(list_item::position - 1))
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await?;
        if !removed {
            return Ok(false);
        }

        self.count = (self.count - 1).max(0);
        self.persist_count().await?;
        debug!(list_id = %self.list_id, %item_id, count = self.count, "deleted list item");
        Ok(true)
    }

    async fn items(&mut self) -> Result<Vec<ListItem>, StoreError> {
        let conn = self.store.conn();
        let rows: Vec<ListItemRow> = list_item::table
            .select(ListItemRow::as_select())
            .order_by((list_item::position.asc(), list_item::id.asc()))
            .load(conn)
            .await?;
        let attribute_rows: Vec<AttributeRow> = attribute::table
            .select(AttributeRow::as_select())
            .load(conn)
            .await?;

        let mut by_item: HashMap<String, Vec<(String, String)>> = HashMap::new();
        for row in attribute_rows {
            by_item
                .entry(row.list_item_id)
                .or_default()
                .push((row.attribute, row.value));
        }
        rows.into_iter()
            .map(|row| {
                let attributes = by_item
                    .remove(&row.id)
                    .and_then(ItemAttributes::from_rows);
                row.into_item(attributes)
            })
            .collect()
    }

    async fn update(
        &mut self,
        item_id: ListItemId,
        update: ListItemUpdate,
    ) -> Result<Option<ListItemId>, StoreError> {
        let changeset = ListItemChangeset {
            content: update.content.as_deref(),
            completed_at: update.completed_at.map(|at| at.map(to_naive)),
            updated_at: to_naive(self.context.clock.utc()),
        };
        let updated = diesel::update(list_item::table.filter(list_item::id.eq(item_id.to_string())))
            .set(&changeset)
            .execute(self.store.conn())
            .await?;
        Ok((updated > 0).then_some(item_id))
    }

    async fn reorder(&mut self, order: Vec<ListItemId>) -> Result<Option<usize>, StoreError> {
        let list_id = self.list_id;
        self.store
            .conn()
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    let stored: Vec<String> =
                        list_item::table.select(list_item::id).load(conn).await?;
                    let stored: HashSet<String> = stored.into_iter().collect();
                    let requested: HashSet<String> =
                        order.iter().map(ToString::to_string).collect();
                    if requested.len() != order.len() || requested != stored {
                        debug!(
                            %list_id,
                            requested = order.len(),
                            stored = stored.len(),
                            "rejected reorder"
                        );
                        return Ok(None);
                    }

                    let mut moved = 0;
                    for (index, item_id) in order.iter().enumerate() {
                        moved += diesel::update(
                            list_item::table.filter(list_item::id.eq(item_id.to_string())),
                        )
                        .set(list_item::position.eq(position_for(index)?))
                        .execute(conn)
                        .await?;
                    }
                    Ok(Some(moved))
                }
                .scope_boxed()
            })
            .await
    }

    async fn set_attributes(
        &mut self,
        item_id: ListItemId,
        attributes: ItemAttributes,
    ) -> Result<Option<AttributeChanges>, StoreError> {
        let id = item_id.to_string();
        let conn = self.store.conn();
        let exists: Option<String> = list_item::table
            .filter(list_item::id.eq(&id))
            .select(list_item::id)
            .first(conn)
            .await
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        let stored: Vec<AttributeRow> = attribute::table
            .filter(attribute::list_item_id.eq(&id))
            .select(AttributeRow::as_select())
            .load(conn)
            .await?;
        let existing: BTreeMap<AttributeKind, String> = stored
            .into_iter()
            .filter_map(|row| {
                row.attribute
                    .parse::<AttributeKind>()
                    .ok()
                    .map(|kind| (kind, row.value))
            })
            .collect();
        let changes = AttributeChanges::diff(&existing, &attributes.to_rows());

        if !changes.deletes.is_empty() {
            let kinds: Vec<&str> = changes.deletes.iter().map(|kind| kind.as_str()).collect();
            diesel::delete(
                attribute::table
                    .filter(attribute::list_item_id.eq(&id))
                    .filter(attribute::kind.eq_any(kinds)),
            )
            .execute(conn)
            .await?;
        }
        // SQLite has no multi-row insert through the async wrapper.
        for (kind, value) in &changes.inserts {
            let row = AttributeRow {
                list_item_id: id.clone(),
                attribute: kind.as_str().to_owned(),
                value: value.clone(),
            };
            diesel::insert_into(attribute::table)
                .values(&row)
                .execute(conn)
                .await?;
        }
        for (kind, value) in &changes.updates {
            diesel::update(
                attribute::table
                    .filter(attribute::list_item_id.eq(&id))
                    .filter(attribute::kind.eq(kind.as_str())),
            )
            .set(attribute::value.eq(value))
            .execute(conn)
            .await?;
        }
        Ok(Some(changes))
    }

    async fn sync_metadata(&mut self) -> Result<i64, StoreError> {
        self.context
            .metadata
            .record_items(&self.list_id, self.count, self.context.clock.utc())
            .await
            .map_err(mirror_error)?;
        Ok(self.count)
    }

    async fn destroy(&mut self) -> Result<(), StoreError> {
        diesel::delete(list_item::table)
            .execute(self.store.conn())
            .await?;
        self.store.clear_values().await?;
        self.count = 0;
        Ok(())
    }
}

#[async_trait]
impl Actor for ListItemActor {
    type Key = ListId;
    type Message = ListItemMessage;
    type Context = ListItemContext;

    const KIND: StoreKind = StoreKind::ListItem;

    async fn start(
        key: &ListId,
        mut store: EmbeddedStore,
        context: ListItemContext,
    ) -> Result<Self, StoreError> {
        let count = match store.get_value::<i64>(COUNT_KEY).await? {
            Some(count) => count,
            None => {
                list_item::table
                    .count()
                    .get_result::<i64>(store.conn())
                    .await?
            }
        };
        Ok(Self {
            list_id: *key,
            store,
            count,
            context,
        })
    }

    async fn handle(&mut self, message: ListItemMessage) -> Flow {
        match message {
            ListItemMessage::Create { item, reply } => {
                let _ = reply.send(self.create(item).await);
            }
            ListItemMessage::Delete { item_id, reply } => {
                let _ = reply.send(self.delete(item_id).await);
            }
            ListItemMessage::Items { reply } => {
                let _ = reply.send(self.items().await);
            }
            ListItemMessage::Update {
                item_id,
                update,
                reply,
            } => {
                let _ = reply.send(self.update(item_id, update).await);
            }
            ListItemMessage::Reorder { order, reply } => {
                let _ = reply.send(self.reorder(order).await);
            }
            ListItemMessage::SetAttributes {
                item_id,
                attributes,
                reply,
            } => {
                let _ = reply.send(self.set_attributes(item_id, attributes).await);
            }
            ListItemMessage::Count { reply } => {
                let _ = reply.send(Ok(self.count));
            }
            ListItemMessage::SyncMetadata { reply } => {
                let _ = reply.send(self.sync_metadata().await);
            }
            ListItemMessage::Destroy { reply } => {
                let _ = reply.send(self.destroy().await);
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn teardown(reply: Reply<()>) -> ListItemMessage {
        ListItemMessage::Destroy { reply }
    }
}

/// `ListItemRepository` backed by one [`ListItemActor`] per list.
#[derive(Clone)]
pub struct ActorListItemRepository {
    locator: Arc<EntityLocator<ListItemActor>>,
}

impl ActorListItemRepository {
    /// Create a repository whose item stores live at `location`.
    pub fn new(location: StoreLocation, context: ListItemContext, mailbox_capacity: usize) -> Self {
        Self {
            locator: Arc::new(EntityLocator::new(location, context, mailbox_capacity)),
        }
    }
}

fn map_actor_error(error: ActorError) -> ListItemRepositoryError {
    let message = error.to_string();
    match error {
        ActorError::Unavailable { .. } | ActorError::Stopped { .. } => {
            ListItemRepositoryError::unavailable(message)
        }
        ActorError::Store(store) if store.is_unavailable() => {
            ListItemRepositoryError::unavailable(message)
        }
        ActorError::Store(StoreError::Connection { .. }) => {
            ListItemRepositoryError::connection(message)
        }
        ActorError::Cleanup { .. } | ActorError::Store(_) => ListItemRepositoryError::query(message),
    }
}

#[async_trait]
impl ListItemRepository for ActorListItemRepository {
    async fn create(
        &self,
        list_id: &ListId,
        item: NewListItem,
    ) -> Result<ListItemId, ListItemRepositoryError> {
        self.locator
            .ask(list_id, |reply| ListItemMessage::Create { item, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn delete(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
    ) -> Result<bool, ListItemRepositoryError> {
        let item_id = *item_id;
        self.locator
            .ask(list_id, |reply| ListItemMessage::Delete { item_id, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn items(&self, list_id: &ListId) -> Result<Vec<ListItem>, ListItemRepositoryError> {
        self.locator
            .ask_existing(list_id, |reply| ListItemMessage::Items { reply })
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_actor_error)
    }

    async fn update(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
        update: ListItemUpdate,
    ) -> Result<Option<ListItemId>, ListItemRepositoryError> {
        let item_id = *item_id;
        self.locator
            .ask(list_id, |reply| ListItemMessage::Update {
                item_id,
                update,
                reply,
            })
            .await
            .map_err(map_actor_error)
    }

    async fn reorder(
        &self,
        list_id: &ListId,
        order: Vec<ListItemId>,
    ) -> Result<Option<usize>, ListItemRepositoryError> {
        self.locator
            .ask(list_id, |reply| ListItemMessage::Reorder { order, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn set_attributes(
        &self,
        list_id: &ListId,
        item_id: &ListItemId,
        attributes: ItemAttributes,
    ) -> Result<Option<AttributeChanges>, ListItemRepositoryError> {
        let item_id = *item_id;
        self.locator
            .ask(list_id, |reply| ListItemMessage::SetAttributes {
                item_id,
                attributes,
                reply,
            })
            .await
            .map_err(map_actor_error)
    }

    async fn count(&self, list_id: &ListId) -> Result<i64, ListItemRepositoryError> {
        self.locator
            .ask_existing(list_id, |reply| ListItemMessage::Count { reply })
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_actor_error)
    }

    async fn sync_metadata(&self, list_id: &ListId) -> Result<i64, ListItemRepositoryError> {
        self.locator
            .ask(list_id, |reply| ListItemMessage::SyncMetadata { reply })
            .await
            .map_err(map_actor_error)
    }
}

#[cfg(test)]
#[path = "list_item_actor_tests.rs"]
mod tests;
