//! Worker owning every list of one user.
//!
//! Lists live in the owner's private store. Creating a list registers it in
//! the metadata mirror; type changes reach the mirror before the local row.
//! Deletes are soft: the row keeps its `deleted_at` stamp and disappears
//! from lookups and listings, while its mirror row stays in place.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::future::try_join_all;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    ListItemRepository, ListItemRepositoryError, ListMetadataRepository,
    ListMetadataRepositoryError, ListRepository, ListRepositoryError,
};
use crate::domain::{
    CreatedList, List, ListId, ListRegistration, ListSummary, ListUpdate, NewList, ShortId,
    UserId, slugify,
};
use crate::outbound::persistence::models::{ListChangeset, ListRow, NewListRow, to_naive};
use crate::outbound::persistence::schema::list;
use crate::outbound::persistence::{EmbeddedStore, StoreError, StoreKind, StoreLocation};

use super::locator::{Actor, ActorError, EntityLocator, Flow, Reply};

/// Dependencies shared by every list worker.
#[derive(Clone)]
pub struct ListActorContext {
    /// Item storage, queried for entry counts.
    pub items: Arc<dyn ListItemRepository>,
    /// Mirror receiving registrations and type changes.
    pub metadata: Arc<dyn ListMetadataRepository>,
    /// Source of `updated_at` timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Messages understood by [`ListActor`].
pub enum ListMessage {
    /// Store a list and register it in the mirror.
    Create {
        /// List to store.
        list: NewList,
        /// Identity of the stored list.
        reply: Reply<CreatedList>,
    },
    /// Apply a partial update to a live list.
    Update {
        /// List to change.
        id: ListId,
        /// Fields to change.
        update: ListUpdate,
        /// The updated identity, or `None` when no live list matches.
        reply: Reply<Option<CreatedList>>,
    },
    /// Soft-delete a live list.
    Delete {
        /// List to delete.
        id: ListId,
        /// The deleted identity, or `None` when no live list matches.
        reply: Reply<Option<CreatedList>>,
    },
    /// Resolve a short id to a live list.
    FromParams {
        /// Trailing id characters to match.
        short_id: ShortId,
        /// The matching list, if any.
        reply: Reply<Option<List>>,
    },
    /// List every live list with its entry count.
    Get {
        /// Live lists with counts.
        reply: Reply<Vec<ListSummary>>,
    },
    /// Wipe the owner's lists and stop.
    Destroy {
        /// Completion.
        reply: Reply<()>,
    },
}

/// Single writer for one owner's lists.
pub struct ListActor {
    owner: UserId,
    store: EmbeddedStore,
    context: ListActorContext,
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

fn item_error(error: ListItemRepositoryError) -> StoreError {
    match error {
        ListItemRepositoryError::Unavailable { message }
        | ListItemRepositoryError::Connection { message } => {
            StoreError::connection(format!("item store: {message}"))
        }
        ListItemRepositoryError::Query { message } => {
            StoreError::query(format!("item store: {message}"))
        }
    }
}

impl ListActor {
    async fn find_live(&mut self, id: &ListId) -> Result<Option<ListRow>, StoreError> {
        let row = list::table
            .filter(list::id.eq(id.to_string()))
            .filter(list::deleted_at.is_null())
            .select(ListRow::as_select())
            .first(self.store.conn())
            .await
            .optional()?;
        Ok(row)
    }

    async fn create(&mut self, list: NewList) -> Result<CreatedList, StoreError> {
        let now = self.context.clock.utc();
        let slug = slugify(&list.name);
        let row = NewListRow {
            id: list.id.to_string(),
            name: &list.name,
            slug: &slug,
            list_type: list.list_type.as_str(),
            updated_at: to_naive(now),
        };
        diesel::insert_into(list::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(self.store.conn())
            .await?;
        self.context
            .metadata
            .register(ListRegistration {
                list_id: list.id,
                user_id: self.owner.clone(),
                list_type: list.list_type,
                at: now,
            })
            .await
            .map_err(mirror_error)?;
        debug!(owner = %self.owner, list_id = %list.id, %slug, "created list");
        Ok(CreatedList::new(list.id, slug))
    }

    async fn update(
        &mut self,
        id: ListId,
        update: ListUpdate,
    ) -> Result<Option<CreatedList>, StoreError> {
        let Some(current) = self.find_live(&id).await? else {
            return Ok(None);
        };
        let now = self.context.clock.utc();
        if let Some(list_type) = update.list_type {
            self.context
                .metadata
                .record_type(&id, list_type, now)
                .await
                .map_err(mirror_error)?;
        }

        let slug = update.name.as_deref().map(slugify);
        let changeset = ListChangeset {
            name: update.name.as_deref(),
            slug: slug.clone(),
            list_type: update.list_type.map(|list_type| list_type.as_str()),
            deleted_at: update.deleted_at.map(to_naive),
            updated_at: to_naive(now),
        };
        diesel::update(list::table.filter(list::id.eq(&current.id)))
            .set(&changeset)
            .execute(self.store.conn())
            .await?;
        Ok(Some(CreatedList::new(id, slug.unwrap_or(current.slug))))
    }

    async fn delete(&mut self, id: ListId) -> Result<Option<CreatedList>, StoreError> {
        let deleted_at = self.context.clock.utc();
        let deleted = self
            .update(
                id,
                ListUpdate {
                    deleted_at: Some(deleted_at),
                    ..ListUpdate::default()
                },
            )
            .await?;
        if deleted.is_some() {
            debug!(owner = %self.owner, list_id = %id, "soft-deleted list");
        }
        Ok(deleted)
    }

    async fn from_params(&mut self, short_id: &ShortId) -> Result<Option<List>, StoreError> {
        let row: Option<ListRow> = list::table
            .filter(list::id.like(format!("%{short_id}")))
            .filter(list::deleted_at.is_null())
            .select(ListRow::as_select())
            .order_by(list::id.asc())
            .first(self.store.conn())
            .await
            .optional()?;
        row.map(List::try_from).transpose()
    }

    async fn get(&mut self) -> Result<Vec<ListSummary>, StoreError> {
        let rows: Vec<ListRow> = list::table
            .filter(list::deleted_at.is_null())
            .select(ListRow::as_select())
            .order_by(list::id.asc())
            .load(self.store.conn())
            .await?;
        let lists = rows
            .into_iter()
            .map(List::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let items = &self.context.items;
        let counts = try_join_all(lists.iter().map(|list| items.count(&list.id)))
            .await
            .map_err(item_error)?;
        Ok(lists
            .into_iter()
            .zip(counts)
            .map(|(list, entries)| ListSummary {
                short_id: list.short_id(),
                list,
                entries,
            })
            .collect())
    }

    async fn destroy(&mut self) -> Result<(), StoreError> {
        diesel::delete(list::table)
            .execute(self.store.conn())
            .await?;
        self.store.clear_values().await?;
        Ok(())
    }
}

#[async_trait]
impl Actor for ListActor {
    type Key = UserId;
    type Message = ListMessage;
    type Context = ListActorContext;

    const KIND: StoreKind = StoreKind::List;

    async fn start(
        key: &UserId,
        store: EmbeddedStore,
        context: ListActorContext,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            owner: key.clone(),
            store,
            context,
        })
    }

    async fn handle(&mut self, message: ListMessage) -> Flow {
        match message {
            ListMessage::Create { list, reply } => {
                let _ = reply.send(self.create(list).await);
            }
            ListMessage::Update { id, update, reply } => {
                let _ = reply.send(self.update(id, update).await);
            }
            ListMessage::Delete { id, reply } => {
                let _ = reply.send(self.delete(id).await);
            }
            ListMessage::FromParams { short_id, reply } => {
                let _ = reply.send(self.from_params(&short_id).await);
            }
            ListMessage::Get { reply } => {
                let _ = reply.send(self.get().await);
            }
            ListMessage::Destroy { reply } => {
                let _ = reply.send(self.destroy().await);
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn teardown(reply: Reply<()>) -> ListMessage {
        ListMessage::Destroy { reply }
    }
}

/// `ListRepository` backed by one [`ListActor`] per owner.
#[derive(Clone)]
pub struct ActorListRepository {
    locator: Arc<EntityLocator<ListActor>>,
}

impl ActorListRepository {
    /// Create a repository whose owner stores live at `location`.
    pub fn new(location: StoreLocation, context: ListActorContext, mailbox_capacity: usize) -> Self {
        Self {
            locator: Arc::new(EntityLocator::new(location, context, mailbox_capacity)),
        }
    }
}

fn map_actor_error(error: ActorError) -> ListRepositoryError {
    let message = error.to_string();
    match error {
        ActorError::Unavailable { .. } | ActorError::Stopped { .. } => {
            ListRepositoryError::unavailable(message)
        }
        ActorError::Store(store) if store.is_unavailable() => {
            ListRepositoryError::unavailable(message)
        }
        ActorError::Store(StoreError::Connection { .. }) => ListRepositoryError::connection(message),
        ActorError::Cleanup { .. } | ActorError::Store(_) => ListRepositoryError::query(message),
    }
}

#[async_trait]
impl ListRepository for ActorListRepository {
    async fn create(
        &self,
        owner: &UserId,
        list: NewList,
    ) -> Result<CreatedList, ListRepositoryError> {
        self.locator
            .ask(owner, |reply| ListMessage::Create { list, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ListId,
        update: ListUpdate,
    ) -> Result<Option<CreatedList>, ListRepositoryError> {
        let id = *id;
        self.locator
            .ask(owner, |reply| ListMessage::Update { id, update, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: &ListId,
    ) -> Result<Option<CreatedList>, ListRepositoryError> {
        let id = *id;
        self.locator
            .ask(owner, |reply| ListMessage::Delete { id, reply })
            .await
            .map_err(map_actor_error)
    }

    async fn find_by_short_id(
        &self,
        owner: &UserId,
        short_id: &ShortId,
    ) -> Result<Option<List>, ListRepositoryError> {
        let short_id = short_id.clone();
        self.locator
            .ask_existing(owner, |reply| ListMessage::FromParams { short_id, reply })
            .await
            .map(Option::flatten)
            .map_err(map_actor_error)
    }

    async fn list(&self, owner: &UserId) -> Result<Vec<ListSummary>, ListRepositoryError> {
        self.locator
            .ask_existing(owner, |reply| ListMessage::Get { reply })
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_actor_error)
    }

    async fn destroy(&self, owner: &UserId) -> Result<(), ListRepositoryError> {
        self.locator.destroy(owner).await.map_err(map_actor_error)
    }
}

#[cfg(test)]
#[path = "list_actor_tests.rs"]
mod tests;
