//! Embedded SQLite persistence using Diesel ORM.
//!
//! This module owns everything that touches SQLite: the embedded migration
//! sets, the per-entity store handle used by the storage workers, and the
//! shared metadata mirror adapter.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Ordering and counting rules live in the
//!   workers under `outbound::actors`.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Async access**: Blocking SQLite calls run on Tokio's blocking pool via
//!   `diesel-async`'s `SyncConnectionWrapper`.
//! - **Strongly typed errors**: Diesel failures are mapped to [`StoreError`]
//!   or the port's error type, logging the detail at debug.
//!
//! # Example
//!
//! ```ignore
//! use lists::outbound::persistence::DieselListMetadataRepository;
//!
//! let mirror = DieselListMetadataRepository::open("/var/lib/lists/metadata.sqlite3").await?;
//! ```

mod diesel_list_metadata_repository;
mod error_mapping;
mod migrations;
pub(crate) mod models;
pub(crate) mod schema;
mod store;

pub use diesel_list_metadata_repository::DieselListMetadataRepository;
pub use migrations::{MigrationError, MigrationRunner, StoreKind};
pub use store::{EmbeddedStore, StoreConnection, StoreError, StoreLocation};
