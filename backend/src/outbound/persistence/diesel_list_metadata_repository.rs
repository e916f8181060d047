//! SQLite-backed `ListMetadataRepository` implementation using Diesel ORM.
//!
//! The mirror is one shared database. Writes arrive from every list and item
//! worker, so the connection sits behind an async mutex and each statement
//! touches exactly one row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::ports::{ListMetadataRepository, ListMetadataRepositoryError};
use crate::domain::{ListId, ListMetadata, ListRegistration, ListType, UserId};

use super::error_mapping::map_basic_diesel_error;
use super::migrations::StoreKind;
use super::models::{ListMetadataRow, NewListMetadataRow, to_naive};
use super::schema::list_metadata;
use super::store::{StoreConnection, StoreError, open_sync};

/// Diesel-backed implementation of the `ListMetadataRepository` port.
#[derive(Clone)]
pub struct DieselListMetadataRepository {
    conn: Arc<Mutex<StoreConnection>>,
}

impl DieselListMetadataRepository {
    /// Open (creating if needed) the mirror database at `url` and apply its
    /// migrations. `":memory:"` gives a private in-memory mirror.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the database cannot be opened or a
    /// migration fails.
    pub async fn open(url: impl Into<String>) -> Result<Self, StoreError> {
        let url = url.into();
        let conn = tokio::task::spawn_blocking(move || open_sync(&url, StoreKind::Metadata))
            .await
            .map_err(|err| StoreError::open(err.to_string()))??;
        Ok(Self {
            conn: Arc::new(Mutex::new(SyncConnectionWrapper::new(conn))),
        })
    }

    /// Open a private in-memory mirror.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a migration fails.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:").await
    }
}

/// Map Diesel errors to domain metadata repository errors.
fn map_diesel_error(error: diesel::result::Error) -> ListMetadataRepositoryError {
    map_basic_diesel_error(
        error,
        ListMetadataRepositoryError::query,
        ListMetadataRepositoryError::connection,
    )
}

fn map_row_error(error: StoreError) -> ListMetadataRepositoryError {
    ListMetadataRepositoryError::query(error.to_string())
}

fn warn_if_missing(updated: usize, list_id: &ListId, field: &'static str) {
    if updated == 0 {
        warn!(%list_id, field, "metadata row missing; mirror has diverged");
    }
}

#[async_trait]
impl ListMetadataRepository for DieselListMetadataRepository {
    async fn register(
        &self,
        registration: ListRegistration,
    ) -> Result<(), ListMetadataRepositoryError> {
        let at = to_naive(registration.at);
        let row = NewListMetadataRow {
            list_id: registration.list_id.to_string(),
            user_id: registration.user_id.to_string(),
            items: 0,
            list_type: registration.list_type.as_str(),
            created_at: at,
            updated_at: at,
        };

        let mut conn = self.conn.lock().await;
        diesel::insert_into(list_metadata::table)
            .values(&row)
            .on_conflict(list_metadata::list_id)
            .do_update()
            .set((
                list_metadata::user_id.eq(excluded(list_metadata::user_id)),
                list_metadata::list_type.eq(excluded(list_metadata::list_type)),
                list_metadata::updated_at.eq(excluded(list_metadata::updated_at)),
            ))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn record_items(
        &self,
        list_id: &ListId,
        items: i64,
        at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError> {
        let mut conn = self.conn.lock().await;
        let updated = diesel::update(
            list_metadata::table.filter(list_metadata::list_id.eq(list_id.to_string())),
        )
        .set((
            list_metadata::items.eq(items),
            list_metadata::updated_at.eq(to_naive(at)),
        ))
        .execute(&mut *conn)
        .await
        .map_err(map_diesel_error)?;
        warn_if_missing(updated, list_id, "items");
        Ok(())
    }

    async fn record_type(
        &self,
        list_id: &ListId,
        list_type: ListType,
        at: DateTime<Utc>,
    ) -> Result<(), ListMetadataRepositoryError> {
        let mut conn = self.conn.lock().await;
        let updated = diesel::update(
            list_metadata::table.filter(list_metadata::list_id.eq(list_id.to_string())),
        )
        .set((
            list_metadata::list_type.eq(list_type.as_str()),
            list_metadata::updated_at.eq(to_naive(at)),
        ))
        .execute(&mut *conn)
        .await
        .map_err(map_diesel_error)?;
        warn_if_missing(updated, list_id, "type");
        Ok(())
    }

    async fn find(
        &self,
        list_id: &ListId,
    ) -> Result<Option<ListMetadata>, ListMetadataRepositoryError> {
        let mut conn = self.conn.lock().await;
        let row: Option<ListMetadataRow> = list_metadata::table
            .filter(list_metadata::list_id.eq(list_id.to_string()))
            .select(ListMetadataRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ListMetadata::try_from)
            .transpose()
            .map_err(map_row_error)
    }

    async fn for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ListMetadata>, ListMetadataRepositoryError> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<ListMetadataRow> = list_metadata::table
            .filter(list_metadata::user_id.eq(user_id.to_string()))
            .select(ListMetadataRow::as_select())
            .order_by((list_metadata::created_at.asc(), list_metadata::list_id.asc()))
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(ListMetadata::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_row_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    async fn repository() -> DieselListMetadataRepository {
        DieselListMetadataRepository::in_memory()
            .await
            .expect("mirror opens")
    }

    fn registration(
        list_id: ListId,
        user_id: &UserId,
        list_type: ListType,
        at: DateTime<Utc>,
    ) -> ListRegistration {
        ListRegistration {
            list_id,
            user_id: user_id.clone(),
            list_type,
            at,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn register_creates_row_with_zero_items(now: DateTime<Utc>) {
        let repo = repository().await;
        let owner = UserId::random();
        let list_id = ListId::generate();

        repo.register(registration(list_id, &owner, ListType::Shopping, now))
            .await
            .expect("register");

        let row = repo.find(&list_id).await.expect("find").expect("row");
        assert_eq!(row.user_id, owner);
        assert_eq!(row.items, 0);
        assert_eq!(row.list_type, ListType::Shopping);
    }

    #[rstest]
    #[tokio::test]
    async fn re_registering_re_owns_and_keeps_items(now: DateTime<Utc>) {
        let repo = repository().await;
        let anonymous = UserId::random();
        let permanent = UserId::random();
        let list_id = ListId::generate();
        repo.register(registration(list_id, &anonymous, ListType::Todo, now))
            .await
            .expect("register");
        repo.record_items(&list_id, 4, now).await.expect("items");

        let later = now + Duration::seconds(5);
        repo.register(registration(list_id, &permanent, ListType::Todo, later))
            .await
            .expect("re-register");

        let row = repo.find(&list_id).await.expect("find").expect("row");
        assert_eq!(row.user_id, permanent);
        assert_eq!(row.items, 4);
        assert_eq!(row.created_at.timestamp(), now.timestamp());
        assert_eq!(row.updated_at.timestamp(), later.timestamp());
        assert!(repo.for_user(&anonymous).await.expect("rows").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn record_type_overwrites_type(now: DateTime<Utc>) {
        let repo = repository().await;
        let owner = UserId::random();
        let list_id = ListId::generate();
        repo.register(registration(list_id, &owner, ListType::Basic, now))
            .await
            .expect("register");

        repo.record_type(&list_id, ListType::Shopping, now)
            .await
            .expect("type");

        let row = repo.find(&list_id).await.expect("find").expect("row");
        assert_eq!(row.list_type, ListType::Shopping);
    }

    #[rstest]
    #[tokio::test]
    async fn writes_for_unknown_lists_are_ignored(now: DateTime<Utc>) {
        let repo = repository().await;
        let list_id = ListId::generate();

        repo.record_items(&list_id, 2, now).await.expect("items");

        assert!(repo.find(&list_id).await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn for_user_returns_only_that_users_rows(now: DateTime<Utc>) {
        let repo = repository().await;
        let alice = UserId::random();
        let bob = UserId::random();
        let first = ListId::generate();
        let second = ListId::generate();
        repo.register(registration(first, &alice, ListType::Basic, now))
            .await
            .expect("register");
        repo.register(registration(second, &bob, ListType::Basic, now))
            .await
            .expect("register");

        let rows = repo.for_user(&alice).await.expect("rows");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].list_id, first);
    }
}
