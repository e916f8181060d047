//! List item HTTP handlers.
//!
//! ```text
//! POST /api/v1/lists/{short_id}/items
//! PATCH /api/v1/lists/{short_id}/items/{item_id}
//! DELETE /api/v1/lists/{short_id}/items/{item_id}
//! PUT /api/v1/lists/{short_id}/items/order
//! PUT /api/v1/lists/{short_id}/items/{item_id}/attributes
//! ```

use actix_web::{HttpResponse, delete, patch, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AttributeChanges, AttributeKind, Error, ItemAttributes, ListItem, ListItemId, ListItemUpdate,
    ShortId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_update_error, missing_field_error, non_blank, optional_amount,
    optional_non_blank, parse_item_id, parse_item_id_list, parse_rfc3339_timestamp,
    parse_short_id, require_text,
};

const SHORT_ID: FieldName = FieldName::new("shortId");
const ITEM_ID: FieldName = FieldName::new("itemId");

#[derive(Debug, Deserialize)]
struct ItemsPath {
    short_id: String,
}

#[derive(Debug, Deserialize)]
struct ItemPath {
    short_id: String,
    item_id: String,
}

impl ItemPath {
    fn parse(self) -> Result<(ShortId, ListItemId), Error> {
        Ok((
            parse_short_id(&self.short_id, SHORT_ID)?,
            parse_item_id(&self.item_id, ITEM_ID)?,
        ))
    }
}

/// Request payload for appending an item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[schema(example = "Oat milk")]
    pub content: Option<String>,
}

/// Request payload for editing an item.
///
/// `completedAt: null` clears the completion time; omitting the field leaves
/// it unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2025-09-01T12:00:00Z")]
    pub completed_at: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent field.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Request payload for reordering a list's items.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItemsRequest {
    /// Item ids in their new order, head first.
    pub order: Option<Vec<String>>,
}

/// Shopping attributes of an item. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemAttributesBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "dairy")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 1.99)]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 2.0)]
    pub quantity: Option<f64>,
}

impl From<ItemAttributes> for ItemAttributesBody {
    fn from(attributes: ItemAttributes) -> Self {
        Self {
            category: attributes.category,
            price: attributes.price,
            quantity: attributes.quantity,
        }
    }
}

impl TryFrom<ItemAttributesBody> for ItemAttributes {
    type Error = Error;

    fn try_from(body: ItemAttributesBody) -> Result<Self, Self::Error> {
        Ok(Self {
            category: optional_non_blank(body.category, FieldName::new("category"))?,
            price: optional_amount(body.price, FieldName::new("price"))?,
            quantity: optional_amount(body.quantity, FieldName::new("quantity"))?,
        })
    }
}

/// Response payload for a stored item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItemResponse {
    pub id: String,
    pub content: String,
    pub completed_at: Option<String>,
    /// 1-based position.
    pub order: i64,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ItemAttributesBody>,
}

impl From<ListItem> for ListItemResponse {
    fn from(item: ListItem) -> Self {
        Self {
            id: item.id.to_string(),
            content: item.content,
            completed_at: item.completed_at.map(|at| at.to_rfc3339()),
            order: item.order,
            updated_at: item.updated_at.to_rfc3339(),
            attributes: item.attributes.map(ItemAttributesBody::from),
        }
    }
}

/// Response payload naming an item.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemIdResponse {
    #[schema(example = "0190f5a4-7b7e-7c3e-8f00-000000000001")]
    pub id: String,
}

/// Response payload for a reorder.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItemsResponse {
    /// Number of items whose position was written.
    pub moved: usize,
}

/// Attribute kinds touched by a replace.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChangesResponse {
    pub deleted: Vec<String>,
    pub inserted: Vec<String>,
    pub updated: Vec<String>,
}

fn kind_names<'a>(kinds: impl Iterator<Item = &'a AttributeKind>) -> Vec<String> {
    kinds.map(|kind| kind.as_str().to_owned()).collect()
}

impl From<AttributeChanges> for AttributeChangesResponse {
    fn from(changes: AttributeChanges) -> Self {
        Self {
            deleted: kind_names(changes.deletes.iter()),
            inserted: kind_names(changes.inserts.iter().map(|(kind, _)| kind)),
            updated: kind_names(changes.updates.iter().map(|(kind, _)| kind)),
        }
    }
}

fn parse_update(payload: UpdateItemRequest) -> Result<ListItemUpdate, Error> {
    let content = payload
        .content
        .map(|content| non_blank(content, FieldName::new("content")))
        .transpose()?;
    let completed_at = payload
        .completed_at
        .map(|value| {
            value
                .map(|raw| parse_rfc3339_timestamp(&raw, FieldName::new("completedAt")))
                .transpose()
        })
        .transpose()?;
    let update = ListItemUpdate {
        content,
        completed_at,
    };
    if update.is_empty() {
        return Err(empty_update_error());
    }
    Ok(update)
}

/// Append an item at the tail of a list.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{short_id}/items",
    request_body = AddItemRequest,
    params(("short_id" = String, Path, description = "List short id")),
    responses(
        (status = 201, description = "Item added", body = ItemIdResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "addListItem"
)]
#[post("/lists/{short_id}/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemsPath>,
    payload: web::Json<AddItemRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let short_id = parse_short_id(&path.short_id, SHORT_ID)?;
    let content = require_text(payload.into_inner().content, FieldName::new("content"))?;
    let id = state.lists.add_item(&owner, &short_id, content).await?;
    Ok(HttpResponse::Created().json(ItemIdResponse { id: id.to_string() }))
}

/// Change an item's content or completion time.
#[utoipa::path(
    patch,
    path = "/api/v1/lists/{short_id}/items/{item_id}",
    request_body = UpdateItemRequest,
    params(
        ("short_id" = String, Path, description = "List short id"),
        ("item_id" = String, Path, description = "Item identifier")
    ),
    responses(
        (status = 200, description = "Item updated", body = ItemIdResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List or item not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "updateListItem"
)]
#[patch("/lists/{short_id}/items/{item_id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    payload: web::Json<UpdateItemRequest>,
) -> ApiResult<web::Json<ItemIdResponse>> {
    let owner = session.require_user_id()?;
    let (short_id, item_id) = path.into_inner().parse()?;
    let update = parse_update(payload.into_inner())?;
    let id = state
        .lists
        .update_item(&owner, &short_id, &item_id, update)
        .await?;
    Ok(web::Json(ItemIdResponse { id: id.to_string() }))
}

/// Remove an item and close the gap it leaves.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{short_id}/items/{item_id}",
    params(
        ("short_id" = String, Path, description = "List short id"),
        ("item_id" = String, Path, description = "Item identifier")
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List or item not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "deleteListItem"
)]
#[delete("/lists/{short_id}/items/{item_id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let (short_id, item_id) = path.into_inner().parse()?;
    state.lists.delete_item(&owner, &short_id, &item_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reassign item positions from an id sequence.
#[utoipa::path(
    put,
    path = "/api/v1/lists/{short_id}/items/order",
    request_body = ReorderItemsRequest,
    params(("short_id" = String, Path, description = "List short id")),
    responses(
        (status = 200, description = "Positions written", body = ReorderItemsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "reorderListItems"
)]
#[put("/lists/{short_id}/items/order")]
pub async fn reorder_items(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemsPath>,
    payload: web::Json<ReorderItemsRequest>,
) -> ApiResult<web::Json<ReorderItemsResponse>> {
    let owner = session.require_user_id()?;
    let short_id = parse_short_id(&path.short_id, SHORT_ID)?;
    let field = FieldName::new("order");
    let raw = payload
        .into_inner()
        .order
        .ok_or_else(|| missing_field_error(field))?;
    let order = parse_item_id_list(raw, field)?;
    let moved = state.lists.reorder_items(&owner, &short_id, order).await?;
    Ok(web::Json(ReorderItemsResponse { moved }))
}

/// Replace an item's shopping attributes.
#[utoipa::path(
    put,
    path = "/api/v1/lists/{short_id}/items/{item_id}/attributes",
    request_body = ItemAttributesBody,
    params(
        ("short_id" = String, Path, description = "List short id"),
        ("item_id" = String, Path, description = "Item identifier")
    ),
    responses(
        (status = 200, description = "Attributes replaced", body = AttributeChangesResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List or item not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "setListItemAttributes"
)]
#[put("/lists/{short_id}/items/{item_id}/attributes")]
pub async fn set_item_attributes(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    payload: web::Json<ItemAttributesBody>,
) -> ApiResult<web::Json<AttributeChangesResponse>> {
    let owner = session.require_user_id()?;
    let (short_id, item_id) = path.into_inner().parse()?;
    let attributes = ItemAttributes::try_from(payload.into_inner())?;
    let changes = state
        .lists
        .set_item_attributes(&owner, &short_id, &item_id, attributes)
        .await?;
    Ok(web::Json(AttributeChangesResponse::from(changes)))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
