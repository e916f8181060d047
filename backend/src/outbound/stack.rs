//! Wiring of the storage adapters into the list service.
//!
//! Item workers write the mirror; list workers write the mirror and fan out
//! to item workers; the service sits on top of all three ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ListService;
use crate::domain::ports::{ListItemRepository, ListMetadataRepository};
use crate::outbound::actors::{
    ActorListItemRepository, ActorListRepository, ListActorContext, ListItemContext,
};
use crate::outbound::persistence::{DieselListMetadataRepository, StoreLocation};

/// Service type produced by [`StorageStack`].
pub type StackService =
    ListService<ActorListRepository, ActorListItemRepository, DieselListMetadataRepository>;

/// Every storage component behind the HTTP adapter.
pub struct StorageStack {
    pub lists: Arc<ActorListRepository>,
    pub items: Arc<ActorListItemRepository>,
    pub metadata: Arc<DieselListMetadataRepository>,
    pub service: Arc<StackService>,
}

impl StorageStack {
    /// Wire entity workers at `location` to an opened mirror.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use lists::outbound::persistence::{DieselListMetadataRepository, StoreLocation};
    /// use lists::outbound::stack::StorageStack;
    /// use mockable::DefaultClock;
    ///
    /// # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
    /// let mirror = DieselListMetadataRepository::in_memory().await?;
    /// let stack = StorageStack::assemble(StoreLocation::InMemory, mirror, Arc::new(DefaultClock), 32);
    /// let _service = stack.service;
    /// # Ok(())
    /// # }
    /// ```
    pub fn assemble(
        location: StoreLocation,
        metadata: DieselListMetadataRepository,
        clock: Arc<dyn Clock>,
        mailbox_capacity: usize,
    ) -> Self {
        let metadata = Arc::new(metadata);
        let mirror: Arc<dyn ListMetadataRepository> = metadata.clone();
        let items = Arc::new(ActorListItemRepository::new(
            location.clone(),
            ListItemContext {
                metadata: Arc::clone(&mirror),
                clock: Arc::clone(&clock),
            },
            mailbox_capacity,
        ));
        let item_port: Arc<dyn ListItemRepository> = items.clone();
        let lists = Arc::new(ActorListRepository::new(
            location,
            ListActorContext {
                items: item_port,
                metadata: mirror,
                clock,
            },
            mailbox_capacity,
        ));
        let service = Arc::new(ListService::new(
            Arc::clone(&lists),
            Arc::clone(&items),
            Arc::clone(&metadata),
        ));
        Self {
            lists,
            items,
            metadata,
            service,
        }
    }
}
