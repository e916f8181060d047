//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod list_item_repository;
mod list_metadata_repository;
mod list_repository;
mod lists_command;
mod lists_query;

#[cfg(test)]
pub use list_item_repository::MockListItemRepository;
pub use list_item_repository::{
    FixtureListItemRepository, ListItemRepository, ListItemRepositoryError,
};
#[cfg(test)]
pub use list_metadata_repository::MockListMetadataRepository;
pub use list_metadata_repository::{
    FixtureListMetadataRepository, ListMetadataRepository, ListMetadataRepositoryError,
};
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use list_repository::{FixtureListRepository, ListRepository, ListRepositoryError};
#[cfg(test)]
pub use lists_command::MockListsCommand;
pub use lists_command::{FixtureListsCommand, ListsCommand, StartListRequest, UpdateListRequest};
#[cfg(test)]
pub use lists_query::MockListsQuery;
pub use lists_query::{FixtureListsQuery, ListDetail, ListsQuery};
