//! Tests for the list service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    FixtureListMetadataRepository, MockListItemRepository, MockListMetadataRepository,
    MockListRepository,
};
use crate::domain::{ErrorCode, ListType};

type TestService =
    ListService<MockListRepository, MockListItemRepository, FixtureListMetadataRepository>;

fn make_service(lists: MockListRepository, items: MockListItemRepository) -> TestService {
    ListService::new(
        Arc::new(lists),
        Arc::new(items),
        Arc::new(FixtureListMetadataRepository),
    )
}

fn stored_list(name: &str) -> List {
    List {
        id: ListId::generate(),
        name: name.to_owned(),
        slug: crate::domain::slugify(name),
        list_type: ListType::Shopping,
        deleted_at: None,
        updated_at: Utc::now(),
    }
}

fn summary(list: List) -> ListSummary {
    ListSummary {
        short_id: list.short_id(),
        list,
        entries: 0,
    }
}

fn lists_resolving(list: List) -> MockListRepository {
    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_short_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(list)));
    lists
}

fn lists_missing() -> MockListRepository {
    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_short_id()
        .times(1)
        .return_once(|_, _| Ok(None));
    lists
}

#[tokio::test]
async fn start_list_generates_name_and_seeds_first_entry() {
    let mut lists = MockListRepository::new();
    lists
        .expect_create()
        .withf(|_, list| list.name.split(' ').count() == 3 && list.list_type == ListType::Todo)
        .times(1)
        .returning(|_, list| Ok(CreatedList::new(list.id, crate::domain::slugify(&list.name))));
    let mut items = MockListItemRepository::new();
    items
        .expect_create()
        .withf(|_, item| item.content == "Buy stamps")
        .times(1)
        .returning(|_, item| Ok(item.id));

    let service = make_service(lists, items);
    let request = StartListRequest {
        name: None,
        list_type: ListType::Todo,
        first_entry: Some("Buy stamps".to_owned()),
    };

    let created = service
        .start_list(&UserId::random(), request)
        .await
        .expect("start succeeds");

    assert_eq!(created.short_id, created.id.short_id());
    assert_eq!(created.slug.split('-').count(), 3);
}

#[tokio::test]
async fn start_list_keeps_given_name_without_entry() {
    let mut lists = MockListRepository::new();
    lists
        .expect_create()
        .withf(|_, list| list.name == "Groceries")
        .times(1)
        .returning(|_, list| Ok(CreatedList::new(list.id, "groceries")));
    let mut items = MockListItemRepository::new();
    items.expect_create().never();

    let service = make_service(lists, items);
    let request = StartListRequest {
        name: Some("  Groceries ".to_owned()),
        list_type: ListType::Shopping,
        first_entry: None,
    };

    let created = service
        .start_list(&UserId::random(), request)
        .await
        .expect("start succeeds");
    assert_eq!(created.slug, "groceries");
}

#[tokio::test]
async fn list_detail_loads_items_of_resolved_list() {
    let list = stored_list("Groceries");
    let list_id = list.id;
    let short_id = list.short_id();
    let mut items = MockListItemRepository::new();
    items
        .expect_items()
        .withf(move |id| *id == list_id)
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let service = make_service(lists_resolving(list), items);
    let detail = service
        .list_detail(&UserId::random(), &short_id)
        .await
        .expect("detail succeeds");

    assert_eq!(detail.list.id, list_id);
    assert_eq!(detail.short_id, short_id);
    assert!(detail.items.is_empty());
}

#[tokio::test]
async fn item_operations_on_unknown_list_are_not_found() {
    let mut items = MockListItemRepository::new();
    items.expect_create().never();

    let service = make_service(lists_missing(), items);
    let short_id = ShortId::new("deadbeef").expect("short id");

    let error = service
        .add_item(&UserId::random(), &short_id, "Milk".to_owned())
        .await
        .expect_err("unknown list");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert!(error.message().contains("deadbeef"));
}

#[tokio::test]
async fn delete_item_reports_missing_item() {
    let list = stored_list("Groceries");
    let short_id = list.short_id();
    let mut items = MockListItemRepository::new();
    items.expect_delete().times(1).return_once(|_, _| Ok(false));

    let service = make_service(lists_resolving(list), items);
    let error = service
        .delete_item(&UserId::random(), &short_id, &ListItemId::generate())
        .await
        .expect_err("missing item");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn reorder_that_is_not_a_permutation_is_an_invalid_request() {
    let list = stored_list("Groceries");
    let short_id = list.short_id();
    let mut items = MockListItemRepository::new();
    items.expect_reorder().times(1).return_once(|_, _| Ok(None));

    let service = make_service(lists_resolving(list), items);
    let error = service
        .reorder_items(
            &UserId::random(),
            &short_id,
            vec![ListItemId::generate(), ListItemId::generate()],
        )
        .await
        .expect_err("partial order");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn reorder_reports_moved_items() {
    let list = stored_list("Groceries");
    let short_id = list.short_id();
    let mut items = MockListItemRepository::new();
    items
        .expect_reorder()
        .withf(|_, order| order.len() == 2)
        .times(1)
        .return_once(|_, order| Ok(Some(order.len())));

    let service = make_service(lists_resolving(list), items);
    let moved = service
        .reorder_items(
            &UserId::random(),
            &short_id,
            vec![ListItemId::generate(), ListItemId::generate()],
        )
        .await
        .expect("reorder succeeds");

    assert_eq!(moved, 2);
}

#[tokio::test]
async fn set_item_attributes_returns_changes() {
    let list = stored_list("Groceries");
    let short_id = list.short_id();
    let mut items = MockListItemRepository::new();
    items.expect_set_attributes().times(1).return_once(|_, _, _| {
        Ok(Some(AttributeChanges {
            deletes: Vec::new(),
            inserts: vec![(crate::domain::AttributeKind::Price, "5".to_owned())],
            updates: Vec::new(),
        }))
    });

    let service = make_service(lists_resolving(list), items);
    let attributes = ItemAttributes {
        price: Some(5.0),
        ..ItemAttributes::default()
    };
    let changes = service
        .set_item_attributes(
            &UserId::random(),
            &short_id,
            &ListItemId::generate(),
            attributes,
        )
        .await
        .expect("attributes succeed");

    assert_eq!(changes.inserts.len(), 1);
}

#[rstest]
#[case(ListRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ListRepositoryError::unavailable("migration failed"), ErrorCode::ServiceUnavailable)]
#[case(ListRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn list_errors_map_to_domain_codes(
    #[case] failure: ListRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut lists = MockListRepository::new();
    lists.expect_list().times(1).return_once(move |_| Err(failure));

    let service = make_service(lists, MockListItemRepository::new());
    let error = service
        .lists(&UserId::random())
        .await
        .expect_err("repository failure");

    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn migrate_account_recreates_lists_and_destroys_source() {
    let anonymous = UserId::random();
    let permanent = UserId::random();
    let first = stored_list("Groceries");
    let second = stored_list("Hardware");
    let ids = [first.id, second.id];
    let summaries = vec![summary(first), summary(second)];

    let mut lists = MockListRepository::new();
    let source = anonymous.clone();
    lists
        .expect_list()
        .withf(move |owner| *owner == source)
        .times(1)
        .return_once(move |_| Ok(summaries));
    let target = permanent.clone();
    lists
        .expect_create()
        .withf(move |owner, list| *owner == target && ids.contains(&list.id))
        .times(2)
        .returning(|_, list| Ok(CreatedList::new(list.id, crate::domain::slugify(&list.name))));
    let source = anonymous.clone();
    lists
        .expect_destroy()
        .withf(move |owner| *owner == source)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(lists, MockListItemRepository::new());
    let moved = service
        .migrate_account(&anonymous, &permanent)
        .await
        .expect("migration succeeds");

    assert_eq!(moved, 2);
}

#[tokio::test]
async fn migrate_account_rejects_same_user() {
    let user = UserId::random();
    let service = make_service(MockListRepository::new(), MockListItemRepository::new());

    let error = service
        .migrate_account(&user, &user)
        .await
        .expect_err("self migration");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn repair_metadata_syncs_every_live_list() {
    let summaries = vec![summary(stored_list("A")), summary(stored_list("B"))];
    let mut lists = MockListRepository::new();
    lists.expect_list().times(1).return_once(move |_| Ok(summaries));
    let mut items = MockListItemRepository::new();
    items.expect_sync_metadata().times(2).returning(|_| Ok(3));

    let service = make_service(lists, items);
    let repaired = service
        .repair_metadata(&UserId::random())
        .await
        .expect("repair succeeds");

    assert_eq!(repaired, 2);
}

#[tokio::test]
async fn metadata_reads_mirror_rows() {
    let owner = UserId::random();
    let mut metadata = MockListMetadataRepository::new();
    metadata
        .expect_for_user()
        .times(1)
        .return_once(|_| Err(ListMetadataRepositoryError::connection("locked")));

    let service = ListService::new(
        Arc::new(MockListRepository::new()),
        Arc::new(MockListItemRepository::new()),
        Arc::new(metadata),
    );
    let error = service.metadata(&owner).await.expect_err("mirror failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
