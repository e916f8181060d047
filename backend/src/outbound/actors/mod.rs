//! Entity workers serialising access to per-entity stores.
//!
//! Each owner's lists and each list's items are served by one worker task.
//! The repository adapters here implement the domain ports by messaging
//! those workers.

mod list_actor;
mod list_item_actor;
mod locator;

pub use list_actor::{ActorListRepository, ListActor, ListActorContext, ListMessage};
pub use list_item_actor::{
    ActorListItemRepository, ListItemActor, ListItemContext, ListItemMessage,
};
pub use locator::{Actor, ActorError, ActorHandle, EntityLocator, Flow, Reply};
