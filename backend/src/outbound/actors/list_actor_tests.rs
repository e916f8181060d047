//! Tests for the list worker and its repository adapter.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ListType;
use crate::domain::NewListItem;
use crate::outbound::persistence::StoreKind;
use crate::outbound::stack::StorageStack;
use crate::test_support::cap_fs::path_exists;
use crate::test_support::clock::MutableClock;
use crate::test_support::stack::{self as test_stack, ScratchStores};

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 9, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(start))
}

async fn stack(clock: &Arc<MutableClock>) -> StorageStack {
    test_stack::in_memory(clock.clone()).await
}

#[rstest]
#[tokio::test]
async fn create_derives_slug_and_registers_metadata(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Weekly Shop!", ListType::Shopping);
    let id = list.id;

    let created = s.lists.create(&owner, list).await.expect("create");

    assert_eq!(created.slug, "weekly-shop");
    assert_eq!(created.short_id, id.short_id());
    let row = s.metadata.find(&id).await.expect("find").expect("row");
    assert_eq!(row.user_id, owner);
    assert_eq!(row.list_type, ListType::Shopping);
    assert_eq!(row.items, 0);
}

#[rstest]
#[tokio::test]
async fn creating_the_same_id_twice_keeps_one_row(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Chores", ListType::Todo);

    s.lists.create(&owner, list.clone()).await.expect("create");
    s.lists.create(&owner, list).await.expect("retry");

    assert_eq!(s.lists.list(&owner).await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test]
async fn short_ids_resolve_live_lists_only(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Errands", ListType::Basic);
    let id = list.id;
    s.lists.create(&owner, list).await.expect("create");

    let found = s
        .lists
        .find_by_short_id(&owner, &id.short_id())
        .await
        .expect("lookup")
        .expect("live list");
    assert_eq!(found.id, id);
    assert_eq!(found.name, "Errands");

    s.lists.delete(&owner, &id).await.expect("delete");

    let gone = s
        .lists
        .find_by_short_id(&owner, &id.short_id())
        .await
        .expect("lookup");
    assert!(gone.is_none());
}

#[rstest]
#[tokio::test]
async fn soft_delete_hides_the_list_but_keeps_its_mirror_row(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Old", ListType::Basic);
    let id = list.id;
    s.lists.create(&owner, list).await.expect("create");

    let deleted = s.lists.delete(&owner, &id).await.expect("delete");
    let again = s.lists.delete(&owner, &id).await.expect("second delete");

    assert_eq!(deleted.map(|created| created.id), Some(id));
    assert!(again.is_none());
    assert!(s.lists.list(&owner).await.expect("list").is_empty());
    assert!(s.metadata.find(&id).await.expect("find").is_some());
}

#[rstest]
#[tokio::test]
async fn renaming_re_derives_the_slug_and_bumps_updated_at(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Groceries", ListType::Shopping);
    let id = list.id;
    s.lists.create(&owner, list).await.expect("create");
    clock.advance_seconds(30);

    let updated = s
        .lists
        .update(
            &owner,
            &id,
            ListUpdate {
                name: Some("Party Food".to_owned()),
                ..ListUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("live list");

    assert_eq!(updated.slug, "party-food");
    let stored = s
        .lists
        .find_by_short_id(&owner, &id.short_id())
        .await
        .expect("lookup")
        .expect("list");
    assert_eq!(stored.name, "Party Food");
    assert_eq!(stored.updated_at, clock.utc());
}

#[rstest]
#[tokio::test]
async fn type_changes_reach_the_mirror(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Plans", ListType::Basic);
    let id = list.id;
    s.lists.create(&owner, list).await.expect("create");

    s.lists
        .update(
            &owner,
            &id,
            ListUpdate {
                list_type: Some(ListType::Todo),
                ..ListUpdate::default()
            },
        )
        .await
        .expect("update");

    let row = s.metadata.find(&id).await.expect("find").expect("row");
    assert_eq!(row.list_type, ListType::Todo);
    let stored = s
        .lists
        .find_by_short_id(&owner, &id.short_id())
        .await
        .expect("lookup")
        .expect("list");
    assert_eq!(stored.list_type, ListType::Todo);
}

#[rstest]
#[tokio::test]
async fn updating_an_unknown_list_returns_none(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;

    let updated = s
        .lists
        .update(&UserId::random(), &ListId::generate(), ListUpdate::default())
        .await
        .expect("update");

    assert!(updated.is_none());
}

#[rstest]
#[tokio::test]
async fn listing_reports_entry_counts(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    let list = NewList::named("Shop", ListType::Shopping);
    let id = list.id;
    s.lists.create(&owner, list).await.expect("create");
    for content in ["Milk", "Eggs"] {
        s.items
            .create(&id, NewListItem::with_content(content))
            .await
            .expect("item");
    }

    let summaries = s.lists.list(&owner).await.expect("list");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].entries, 2);
    assert_eq!(summaries[0].short_id, id.short_id());
}

#[rstest]
#[tokio::test]
async fn owners_never_see_each_others_lists(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let alice = UserId::random();
    let bob = UserId::random();
    let list = NewList::named("Private", ListType::Basic);
    let id = list.id;
    s.lists.create(&alice, list).await.expect("create");

    assert!(s.lists.list(&bob).await.expect("list").is_empty());
    assert!(
        s.lists
            .find_by_short_id(&bob, &id.short_id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn destroy_wipes_the_owner_store(clock: Arc<MutableClock>) {
    let s = stack(&clock).await;
    let owner = UserId::random();
    s.lists
        .create(&owner, NewList::named("Temp", ListType::Basic))
        .await
        .expect("create");

    s.lists.destroy(&owner).await.expect("destroy");

    assert!(s.lists.list(&owner).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn lists_survive_a_fresh_stack_over_the_same_directory(clock: Arc<MutableClock>) {
    let stores = ScratchStores::new();
    let owner = UserId::random();
    let first = stores.stack(clock.clone()).await;
    let created = first
        .lists
        .create(&owner, NewList::named("Keepers", ListType::Todo))
        .await
        .expect("create");
    drop(first);

    let second = stores.stack(clock.clone()).await;
    let found = second
        .lists
        .find_by_short_id(&owner, &created.short_id)
        .await
        .expect("lookup")
        .expect("persisted list");

    assert_eq!(found.name, "Keepers");
    assert_eq!(found.list_type, ListType::Todo);
}

#[rstest]
#[tokio::test]
async fn destroy_removes_the_store_file(clock: Arc<MutableClock>) {
    let stores = ScratchStores::new();
    let s = stores.stack(clock.clone()).await;
    let owner = UserId::random();
    s.lists
        .create(&owner, NewList::named("Temp", ListType::Basic))
        .await
        .expect("create");
    let file = stores
        .path()
        .join(StoreLocation::file_name(StoreKind::List, &owner.to_string()));
    assert!(path_exists(&file));

    s.lists.destroy(&owner).await.expect("destroy");

    assert!(!path_exists(&file));
}

#[rstest]
#[tokio::test]
async fn lookups_do_not_create_stores_for_absent_owners(clock: Arc<MutableClock>) {
    let stores = ScratchStores::new();
    let s = stores.stack(clock.clone()).await;
    let owner = UserId::random();
    s.lists
        .create(&owner, NewList::named("Temp", ListType::Basic))
        .await
        .expect("create");
    s.lists.destroy(&owner).await.expect("destroy");
    let stranger = UserId::random();

    for user in [&owner, &stranger] {
        assert!(s.lists.list(user).await.expect("list").is_empty());
        let missing = ShortId::new("deadbeef").expect("short id");
        assert!(
            s.lists
                .find_by_short_id(user, &missing)
                .await
                .expect("lookup")
                .is_none()
        );
        let file = stores
            .path()
            .join(StoreLocation::file_name(StoreKind::List, &user.to_string()));
        assert!(!path_exists(&file));
    }
}
