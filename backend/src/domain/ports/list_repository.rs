//! Port for an owner's list storage.
//!
//! Every call is addressed by owner. Adapters guarantee that all calls for the
//! same owner are applied one at a time, in arrival order, against storage
//! that belongs to that owner alone.

use async_trait::async_trait;

use crate::domain::{CreatedList, List, ListId, ListSummary, ListUpdate, NewList, ShortId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by list repository adapters.
    pub enum ListRepositoryError {
        /// The owner's store could not be opened or migrated.
        Unavailable { message: String } =>
            "list store unavailable: {message}",
        /// Connection to the owner's store failed.
        Connection { message: String } =>
            "list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "list repository query failed: {message}",
    }
}

/// Port for creating, resolving and tearing down an owner's lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Store a new list, deriving its slug, and register it with the
    /// metadata mirror under `owner`.
    async fn create(&self, owner: &UserId, list: NewList)
    -> Result<CreatedList, ListRepositoryError>;

    /// Apply a partial update. When the type changes, the mirror is written
    /// first. Returns `None` when the list does not exist.
    async fn update(
        &self,
        owner: &UserId,
        id: &ListId,
        update: ListUpdate,
    ) -> Result<Option<CreatedList>, ListRepositoryError>;

    /// Soft-delete a list. Returns `None` when the list does not exist.
    async fn delete(
        &self,
        owner: &UserId,
        id: &ListId,
    ) -> Result<Option<CreatedList>, ListRepositoryError>;

    /// Resolve a live list whose identifier ends with `short_id`.
    async fn find_by_short_id(
        &self,
        owner: &UserId,
        short_id: &ShortId,
    ) -> Result<Option<List>, ListRepositoryError>;

    /// List every live list of `owner` with its current item count.
    async fn list(&self, owner: &UserId) -> Result<Vec<ListSummary>, ListRepositoryError>;

    /// Remove every list row and all storage held for `owner`.
    async fn destroy(&self, owner: &UserId) -> Result<(), ListRepositoryError>;
}

/// Fixture implementation that stores nothing.
///
/// Lookups return `None` and listings are empty, which keeps HTTP adapter
/// tests focused on request handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListRepository;

#[async_trait]
impl ListRepository for FixtureListRepository {
    async fn create(
        &self,
        _owner: &UserId,
        list: NewList,
    ) -> Result<CreatedList, ListRepositoryError> {
        Ok(CreatedList::new(list.id, crate::domain::slugify(&list.name)))
    }

    async fn update(
        &self,
        _owner: &UserId,
        _id: &ListId,
        _update: ListUpdate,
    ) -> Result<Option<CreatedList>, ListRepositoryError> {
        Ok(None)
    }

    async fn delete(
        &self,
        _owner: &UserId,
        _id: &ListId,
    ) -> Result<Option<CreatedList>, ListRepositoryError> {
        Ok(None)
    }

    async fn find_by_short_id(
        &self,
        _owner: &UserId,
        _short_id: &ShortId,
    ) -> Result<Option<List>, ListRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _owner: &UserId) -> Result<Vec<ListSummary>, ListRepositoryError> {
        Ok(Vec::new())
    }

    async fn destroy(&self, _owner: &UserId) -> Result<(), ListRepositoryError> {
        Ok(())
    }
}
