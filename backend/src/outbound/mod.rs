//! Outbound adapters implementing domain ports for storage.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: embedded SQLite stores, migrations and the shared
//!   metadata mirror, all through Diesel
//! - **actors**: per-entity workers that own those stores and serialise
//!   every operation on them
//! - **stack**: wiring of the above into the list service
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. Ordering and counting rules sit
//! in the workers because they depend on single-writer access.

pub mod actors;
pub mod persistence;
pub mod stack;
