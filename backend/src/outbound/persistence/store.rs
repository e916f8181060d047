//! Embedded SQLite stores owned by a single entity.
//!
//! Every list worker and item worker owns one store: a SQLite database that
//! no other task touches. Opening a store enables foreign keys, applies the
//! kind's migrations and creates the `actor_storage` key/value table the
//! workers use for durable state. Queries run through
//! [`SyncConnectionWrapper`], which moves the blocking SQLite calls onto
//! Tokio's blocking pool.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_async::RunQueryDsl;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error_mapping::map_basic_diesel_error;
use super::migrations::{MigrationError, MigrationRunner, StoreKind};
use super::models::ActorStorageRow;
use super::schema::actor_storage;

/// Async connection to one embedded store.
pub type StoreConnection = SyncConnectionWrapper<SqliteConnection>;

const ACTOR_STORAGE_DDL: &str = "CREATE TABLE IF NOT EXISTS actor_storage (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

/// Errors raised while opening or using an embedded store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The database file could not be opened or prepared.
    #[error("failed to open store: {message}")]
    Open {
        /// Underlying failure.
        message: String,
    },
    /// A migration failed; the store must not be used.
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// The connection was lost.
    #[error("store connection failed: {message}")]
    Connection {
        /// Underlying failure.
        message: String,
    },
    /// A query failed.
    #[error("store query failed: {message}")]
    Query {
        /// Underlying failure.
        message: String,
    },
    /// A stored value could not be encoded or decoded.
    #[error("store encoding failed: {message}")]
    Encoding {
        /// Underlying failure.
        message: String,
    },
}

impl StoreError {
    /// Create an open error with the given message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create an encoding error with the given message.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Return `true` when the store never became usable.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::Migration(_))
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        map_basic_diesel_error(error, Self::query, Self::connection)
    }
}

/// Where entity stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Private in-memory databases, discarded when the worker stops.
    InMemory,
    /// One database file per entity inside this directory.
    Directory(PathBuf),
}

impl StoreLocation {
    /// Create the backing directory when the location is on disk.
    pub fn prepare(&self) -> io::Result<()> {
        match self {
            Self::InMemory => Ok(()),
            Self::Directory(path) => Dir::create_ambient_dir_all(path, ambient_authority()),
        }
    }

    /// File name of the store for `key` of `kind`.
    pub fn file_name(kind: StoreKind, key: &str) -> String {
        format!("{}-{key}.sqlite3", kind.prefix())
    }

    fn database_url(&self, kind: StoreKind, key: &str) -> String {
        match self {
            Self::InMemory => ":memory:".to_owned(),
            Self::Directory(path) => path
                .join(Self::file_name(kind, key))
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// Return `true` when a store for `key` of `kind` outlives its worker.
    ///
    /// In-memory stores never do; on disk the store file must exist.
    pub fn holds(&self, kind: StoreKind, key: &str) -> io::Result<bool> {
        match self {
            Self::InMemory => Ok(false),
            Self::Directory(path) => match Dir::open_ambient_dir(path, ambient_authority()) {
                Ok(dir) => Ok(dir.exists(Self::file_name(kind, key))),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(err) => Err(err),
            },
        }
    }

    /// Delete the store file for `key`. Missing files are not an error.
    pub fn remove(&self, kind: StoreKind, key: &str) -> io::Result<()> {
        match self {
            Self::InMemory => Ok(()),
            Self::Directory(path) => remove_store_file(path, &Self::file_name(kind, key)),
        }
    }
}

fn remove_store_file(directory: &Path, file_name: &str) -> io::Result<()> {
    let dir = Dir::open_ambient_dir(directory, ambient_authority())?;
    match dir.remove_file(file_name) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Open a migrated synchronous connection. Blocks; call from the blocking
/// pool.
pub(crate) fn open_sync(url: &str, kind: StoreKind) -> Result<SqliteConnection, StoreError> {
    let mut conn =
        SqliteConnection::establish(url).map_err(|err| StoreError::open(err.to_string()))?;
    conn.batch_execute("PRAGMA foreign_keys = ON")
        .map_err(|err| StoreError::open(err.to_string()))?;
    MigrationRunner::new(kind).run(&mut conn)?;
    Ok(conn)
}

fn open_entity_sync(url: &str, kind: StoreKind) -> Result<SqliteConnection, StoreError> {
    let mut conn = open_sync(url, kind)?;
    conn.batch_execute(ACTOR_STORAGE_DDL)
        .map_err(|err| StoreError::open(err.to_string()))?;
    Ok(conn)
}

/// An opened, migrated store owned by one entity.
pub struct EmbeddedStore {
    conn: StoreConnection,
}

impl EmbeddedStore {
    /// Open the store for `key` of `kind` at `location`, applying pending
    /// migrations before returning.
    pub async fn open(
        location: &StoreLocation,
        kind: StoreKind,
        key: &str,
    ) -> Result<Self, StoreError> {
        let url = location.database_url(kind, key);
        let conn = tokio::task::spawn_blocking(move || open_entity_sync(&url, kind))
            .await
            .map_err(|err| StoreError::open(err.to_string()))??;
        debug!(store = kind.prefix(), %key, "opened entity store");
        Ok(Self {
            conn: SyncConnectionWrapper::new(conn),
        })
    }

    /// Borrow the async connection.
    pub fn conn(&mut self) -> &mut StoreConnection {
        &mut self.conn
    }

    /// Read a JSON value from actor storage.
    pub async fn get_value<T>(&mut self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let raw: Option<String> = actor_storage::table
            .filter(actor_storage::key.eq(key))
            .select(actor_storage::value)
            .first(&mut self.conn)
            .await
            .optional()?;
        raw.map(|value| {
            serde_json::from_str(&value).map_err(|err| StoreError::encoding(err.to_string()))
        })
        .transpose()
    }

    /// Write a JSON value to actor storage, replacing any previous value.
    pub async fn put_value<T>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let row = ActorStorageRow {
            key: key.to_owned(),
            value: serde_json::to_string(value)
                .map_err(|err| StoreError::encoding(err.to_string()))?,
        };
        diesel::replace_into(actor_storage::table)
            .values(&row)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }

    /// Remove every actor storage entry.
    pub async fn clear_values(&mut self) -> Result<(), StoreError> {
        diesel::delete(actor_storage::table)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }
}
