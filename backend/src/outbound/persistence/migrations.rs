//! Forward-only schema migrations for the embedded stores.
//!
//! Each store kind embeds its own migration set. [`MigrationRunner`] applies
//! whatever the store has not seen yet, in ascending version order, and
//! Diesel records applied versions in `__diesel_schema_migrations` so a second
//! run is a no-op.

use diesel::sqlite::{Sqlite, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{error, info};

const LIST_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/list");
const LIST_ITEM_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/list_item");
const METADATA_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/metadata");

/// The kinds of embedded store, each with its own schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// One user's lists.
    List,
    /// One list's items and attributes.
    ListItem,
    /// The shared metadata mirror.
    Metadata,
}

impl StoreKind {
    /// Prefix used for store file names.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::ListItem => "list_item",
            Self::Metadata => "metadata",
        }
    }

    /// Embedded migration set for this kind.
    pub fn migrations(self) -> EmbeddedMigrations {
        match self {
            Self::List => LIST_MIGRATIONS,
            Self::ListItem => LIST_ITEM_MIGRATIONS,
            Self::Metadata => METADATA_MIGRATIONS,
        }
    }
}

/// A migration failed to list or apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to execute migration \"{migration}\": {message}")]
pub struct MigrationError {
    /// Migration name, or `*` when the pending set could not be listed.
    pub migration: String,
    /// Underlying failure.
    pub message: String,
}

/// Applies the migration set of one store kind.
#[derive(Debug, Clone, Copy)]
pub struct MigrationRunner {
    kind: StoreKind,
}

impl MigrationRunner {
    /// Build a runner for stores of `kind`.
    pub const fn new(kind: StoreKind) -> Self {
        Self { kind }
    }

    /// Apply every pending migration. Returns the names applied, oldest first.
    ///
    /// Stops at the first failure; migrations applied before it stay applied.
    pub fn run(&self, conn: &mut SqliteConnection) -> Result<Vec<String>, MigrationError> {
        let mut pending =
            MigrationHarness::<Sqlite>::pending_migrations(conn, self.kind.migrations())
                .map_err(|err| MigrationError {
                    migration: "*".to_owned(),
                    message: err.to_string(),
                })?;
        pending.sort_by_key(|migration| migration.name().version().to_string());

        let mut applied = Vec::with_capacity(pending.len());
        for migration in pending {
            let name = migration.name().to_string();
            if let Err(err) = conn.run_migration(migration.as_ref()) {
                error!(
                    store = self.kind.prefix(),
                    error = %err,
                    "failed to execute migration \"{name}\""
                );
                return Err(MigrationError {
                    migration: name,
                    message: err.to_string(),
                });
            }
            info!(store = self.kind.prefix(), "migration \"{name}\" was executed successfully");
            applied.push(name);
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::Connection;
    use diesel::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn conn() -> SqliteConnection {
        SqliteConnection::establish(":memory:").expect("in-memory sqlite")
    }

    fn table_exists(conn: &mut SqliteConnection, table: &str) -> bool {
        #[derive(QueryableByName)]
        struct Count {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            n: i64,
        }
        let row: Count = diesel::sql_query(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind::<diesel::sql_types::Text, _>(table)
        .get_result(conn)
        .expect("sqlite_master query");
        row.n == 1
    }

    #[rstest]
    fn applies_list_migrations_in_version_order(mut conn: SqliteConnection) {
        let applied = MigrationRunner::new(StoreKind::List)
            .run(&mut conn)
            .expect("migrations apply");

        assert_eq!(applied.len(), 2);
        assert!(applied[0] < applied[1], "{applied:?} should be ascending");
        assert!(table_exists(&mut conn, "list"));
    }

    #[rstest]
    #[case(StoreKind::List)]
    #[case(StoreKind::ListItem)]
    #[case(StoreKind::Metadata)]
    fn second_run_applies_nothing(mut conn: SqliteConnection, #[case] kind: StoreKind) {
        let runner = MigrationRunner::new(kind);
        let first = runner.run(&mut conn).expect("first run");
        let second = runner.run(&mut conn).expect("second run");

        assert!(!first.is_empty());
        assert!(second.is_empty());
    }

    #[rstest]
    fn item_migrations_create_attribute_table(mut conn: SqliteConnection) {
        MigrationRunner::new(StoreKind::ListItem)
            .run(&mut conn)
            .expect("migrations apply");

        assert!(table_exists(&mut conn, "list_item"));
        assert!(table_exists(&mut conn, "attribute"));
    }

    #[rstest]
    fn failing_migration_reports_its_name(mut conn: SqliteConnection) {
        // A clashing table makes the first list migration fail.
        diesel::sql_query("CREATE TABLE list (id TEXT)")
            .execute(&mut conn)
            .expect("pre-create table");

        let err = MigrationRunner::new(StoreKind::List)
            .run(&mut conn)
            .expect_err("migration clashes");

        assert!(err.migration.contains("add_list_table"), "{err}");
    }
}
