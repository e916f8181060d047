//! Diesel table definitions for the embedded SQLite stores.
//!
//! Each entity store carries a subset of these tables: a list store holds
//! `list`, an item store holds `list_item` and `attribute`, and the shared
//! mirror holds `list_metadata`. Every entity store also carries the
//! harness-owned `actor_storage` key/value table.
//!
//! # Maintenance
//!
//! These definitions must match `backend/migrations/<store>/*/up.sql`
//! exactly.

diesel::table! {
    /// Lists owned by one user.
    list (id) {
        /// Primary key: UUID v7 text.
        id -> Text,
        /// Display name.
        name -> Text,
        /// Slug derived from `name`.
        slug -> Text,
        /// Variant: `basic`, `todo` or `shopping`.
        #[sql_name = "type"]
        list_type -> Text,
        /// Last modification time (UTC).
        updated_at -> Timestamp,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    /// Items of one list.
    list_item (id) {
        /// Primary key: UUID v7 text.
        id -> Text,
        /// Label shown for the entry.
        content -> Text,
        /// Completion time (UTC).
        completed_at -> Nullable<Timestamp>,
        /// 1-based dense position.
        #[sql_name = "order"]
        position -> BigInt,
        /// Last modification time (UTC).
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Shopping attributes, one row per item and kind.
    attribute (list_item_id, kind) {
        /// Owning item; rows cascade with it.
        list_item_id -> Text,
        /// Attribute kind.
        #[sql_name = "attribute"]
        kind -> Text,
        /// Text-encoded value.
        value -> Text,
    }
}

diesel::table! {
    /// Shared per-list summary rows.
    list_metadata (list_id) {
        /// List the row summarises.
        list_id -> Text,
        /// Current owner.
        user_id -> Text,
        /// Item count as last written.
        items -> BigInt,
        /// Variant as last written.
        #[sql_name = "type"]
        list_type -> Text,
        /// First write time (UTC).
        created_at -> Timestamp,
        /// Last write time (UTC).
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Durable actor state, separate from business tables.
    actor_storage (key) {
        /// State key.
        key -> Text,
        /// JSON-encoded value.
        value -> Text,
    }
}

diesel::joinable!(attribute -> list_item (list_item_id));
diesel::allow_tables_to_appear_in_same_query!(list_item, attribute);
