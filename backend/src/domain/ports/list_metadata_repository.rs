//! Port for the shared list metadata mirror.
//!
//! Writers are the list and item workers of many owners. Each write touches a
//! single row, scoped by list id, and the last write wins per field.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ListId, ListMetadata, ListRegistration, ListType, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by metadata mirror adapters.
    pub enum ListMetadataRepositoryError {
        /// Connection to the mirror store failed.
        Connection { message: String } =>
            "metadata repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "metadata repository query failed: {message}",
    }
}

/// Port for reading and writing mirror rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListMetadataRepository: Send + Sync {
    /// Insert a row for a new list, or re-own an existing row and refresh its
    /// type. An existing item count is kept.
    async fn register(
        &self,
        registration: ListRegistration,
    ) -> Result<(), ListMetadataRepositoryError>;

    /// Overwrite the item count.
    async fn record_items(
        &self,
        list_id: &ListId,
        items: i64,
        at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError>;

    /// Overwrite the list type.
    async fn record_type(
        &self,
        list_id: &ListId,
        list_type: ListType,
        at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError>;

    /// Fetch the row for one list.
    async fn find(&self, list_id: &ListId)
    -> Result<Option<ListMetadata>, ListMetadataRepositoryError>;

    /// Fetch every row owned by `user_id`, oldest first.
    async fn for_user(&self, user_id: &UserId)
    -> Result<Vec<ListMetadata>, ListMetadataRepositoryError>;
}

/// Fixture implementation that discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListMetadataRepository;

#[async_trait]
impl ListMetadataRepository for FixtureListMetadataRepository {
    async fn register(
        &self,
        _registration: ListRegistration,
    ) -> Result<(), ListMetadataRepositoryError> {
        Ok(())
    }

    async fn record_items(
        &self,
        _list_id: &ListId,
        _items: i64,
        _at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError> {
        Ok(())
    }

    async fn record_type(
        &self,
        _list_id: &ListId,
        _list_type: ListType,
        _at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _list_id: &ListId,
    ) -> Result<Option<ListMetadata>, ListMetadataRepositoryError> {
        Ok(None)
    }

    async fn for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ListMetadata>, ListMetadataRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_lookup_returns_none() {
        let repo = FixtureListMetadataRepository;
        let found = repo
            .find(&ListId::generate())
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_none());
    }
}
