//! Tests for list item HTTP handlers.

use super::*;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ErrorCode;
use crate::domain::ports::{MockListsCommand, MockListsQuery};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::test_utils::{
    SIGN_IN_PATH, session_cookie, sign_in_route, state_with, test_session_middleware, test_user,
};

const SHORT: &str = "0a1b2c3d";
const ITEM: &str = "0190f5a4-7b7e-7c3e-8f00-000000000001";

fn test_app(
    command: MockListsCommand,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state_with(command, MockListsQuery::new()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(test_session_middleware())
        .configure(sign_in_route)
        .service(
            web::scope("/api/v1")
                .service(add_item)
                .service(reorder_items)
                .service(update_item)
                .service(delete_item)
                .service(set_item_attributes),
        )
}

fn item_id() -> ListItemId {
    ITEM.parse().expect("fixture item id")
}

fn detail_code(body: &Value) -> Option<&str> {
    body.get("details")
        .and_then(|details| details.get("code"))
        .and_then(Value::as_str)
}

#[actix_web::test]
async fn add_item_trims_content_and_returns_created_id() {
    let mut command = MockListsCommand::new();
    let created = item_id();
    command
        .expect_add_item()
        .withf(|owner, short_id, content| {
            owner == &test_user() && short_id.as_str() == SHORT && content == "Oat milk"
        })
        .times(1)
        .returning(move |_, _, _| Ok(created));
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/lists/{SHORT}/items"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "content": "  Oat milk " }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: ItemIdResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.id, ITEM);
}

#[actix_web::test]
async fn add_item_requires_a_session() {
    let mut command = MockListsCommand::new();
    command.expect_add_item().never();
    let app = actix_test::init_service(test_app(command)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/lists/{SHORT}/items"))
            .set_json(json!({ "content": "milk" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(json!({ "content": "   " }), "empty_value")]
#[case(json!({}), "missing_field")]
#[actix_web::test]
async fn add_item_rejects_missing_content(#[case] payload: Value, #[case] expected: &str) {
    let mut command = MockListsCommand::new();
    command.expect_add_item().never();
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/lists/{SHORT}/items"))
            .cookie(session_cookie(&login))
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail_code(&body), Some(expected));
}

#[actix_web::test]
async fn malformed_short_id_is_rejected_before_the_service() {
    let mut command = MockListsCommand::new();
    command.expect_add_item().never();
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/lists/nothex!!/items")
            .cookie(session_cookie(&login))
            .set_json(json!({ "content": "milk" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail_code(&body), Some("invalid_short_id"));
}

#[rstest]
fn explicit_null_clears_completion() {
    let payload: UpdateItemRequest =
        serde_json::from_value(json!({ "completedAt": null })).expect("payload");

    let update = parse_update(payload).expect("valid update");

    assert_eq!(update.completed_at, Some(None));
    assert!(update.content.is_none());
}

#[rstest]
fn completion_timestamp_is_parsed() {
    let payload: UpdateItemRequest =
        serde_json::from_value(json!({ "completedAt": "2025-09-01T12:00:00Z" })).expect("payload");

    let update = parse_update(payload).expect("valid update");

    let completed = update.completed_at.flatten().expect("timestamp");
    assert_eq!(completed.to_rfc3339(), "2025-09-01T12:00:00+00:00");
}

#[rstest]
fn empty_update_is_rejected() {
    let err = parse_update(UpdateItemRequest::default()).expect_err("empty update");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details.get("code").and_then(Value::as_str), Some("empty_update"));
}

#[actix_web::test]
async fn update_item_forwards_the_parsed_update() {
    let mut command = MockListsCommand::new();
    command
        .expect_update_item()
        .withf(|_, _, id, update| {
            *id == item_id() && update.content.as_deref() == Some("Rye bread")
        })
        .times(1)
        .returning(|_, _, id, _| Ok(*id));
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/lists/{SHORT}/items/{ITEM}"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "content": "Rye bread" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: ItemIdResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.id, ITEM);
}

#[actix_web::test]
async fn deleting_an_unknown_item_is_not_found() {
    let mut command = MockListsCommand::new();
    command
        .expect_delete_item()
        .times(1)
        .returning(|_, _, id| Err(Error::not_found(format!("list item {id} not found"))));
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/lists/{SHORT}/items/{ITEM}"))
            .cookie(session_cookie(&login))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_item_returns_no_content() {
    let mut command = MockListsCommand::new();
    command
        .expect_delete_item()
        .times(1)
        .returning(|_, _, _| Ok(()));
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/lists/{SHORT}/items/{ITEM}"))
            .cookie(session_cookie(&login))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn reorder_rejects_repeated_ids() {
    let mut command = MockListsCommand::new();
    command.expect_reorder_items().never();
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/lists/{SHORT}/items/order"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "order": [ITEM, ITEM] }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail_code(&body), Some("duplicate_id"));
}

#[actix_web::test]
async fn reorder_reports_moved_items() {
    let mut command = MockListsCommand::new();
    command
        .expect_reorder_items()
        .withf(|_, _, order| order.as_slice() == [item_id()])
        .times(1)
        .returning(|_, _, order| Ok(order.len()));
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/lists/{SHORT}/items/order"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "order": [ITEM] }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: ReorderItemsResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.moved, 1);
}

#[actix_web::test]
async fn unknown_attribute_fields_are_rejected() {
    let mut command = MockListsCommand::new();
    command.expect_set_item_attributes().never();
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/lists/{SHORT}/items/{ITEM}/attributes"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "category": "dairy", "colour": "blue" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
    assert_eq!(detail_code(&body), Some("invalid_body"));
}

#[actix_web::test]
async fn attribute_replace_reports_touched_kinds() {
    let mut command = MockListsCommand::new();
    command
        .expect_set_item_attributes()
        .withf(|_, _, _, attributes| {
            attributes.category.as_deref() == Some("dairy") && attributes.price == Some(1.5)
        })
        .times(1)
        .returning(|_, _, _, _| {
            Ok(AttributeChanges {
                deletes: vec![AttributeKind::Quantity],
                inserts: vec![(AttributeKind::Price, "1.5".to_owned())],
                updates: vec![(AttributeKind::Category, "dairy".to_owned())],
            })
        });
    let app = actix_test::init_service(test_app(command)).await;
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri(SIGN_IN_PATH).to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/lists/{SHORT}/items/{ITEM}/attributes"))
            .cookie(session_cookie(&login))
            .set_json(json!({ "category": "dairy", "price": 1.5 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: AttributeChangesResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.deleted, vec!["quantity"]);
    assert_eq!(body.inserted, vec!["price"]);
    assert_eq!(body.updated, vec!["category"]);
}

#[rstest]
#[case(json!({ "price": -1.0 }), "invalid_number")]
#[case(json!({ "category": " " }), "empty_value")]
fn attribute_values_are_validated(#[case] payload: Value, #[case] expected: &str) {
    let body: ItemAttributesBody = serde_json::from_value(payload).expect("payload");

    let err = ItemAttributes::try_from(body).expect_err("invalid attributes");

    let details = err.details().expect("details");
    assert_eq!(details.get("code").and_then(Value::as_str), Some(expected));
}
