//! List HTTP handlers.
//!
//! ```text
//! GET /api/v1/lists
//! POST /api/v1/lists
//! GET /api/v1/lists/metadata
//! POST /api/v1/lists/metadata/repair
//! GET /api/v1/lists/{short_id}
//! PATCH /api/v1/lists/{short_id}
//! DELETE /api/v1/lists/{short_id}
//! ```
//!
//! The metadata routes must be registered before `{short_id}` so the literal
//! segment wins.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ListDetail, StartListRequest, UpdateListRequest};
use crate::domain::{CreatedList, Error, LIST_NAME_MAX, ListMetadata, ListSummary, ListType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::items::ListItemResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, bounded, empty_update_error, non_blank, parse_list_type, parse_short_id,
};

const NAME: FieldName = FieldName::new("name");
const TYPE: FieldName = FieldName::new("type");

#[derive(Debug, Deserialize)]
struct ListPath {
    short_id: String,
}

/// Request payload for starting a list.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    /// Display name; a three-word name is generated when absent or blank.
    #[schema(example = "Weekly shop")]
    pub name: Option<String>,
    /// One of `basic`, `todo`, `shopping`; defaults to `basic`.
    #[serde(rename = "type")]
    #[schema(example = "shopping")]
    pub list_type: Option<String>,
    /// Content of a first item.
    #[schema(example = "Oat milk")]
    pub entry: Option<String>,
}

/// Request payload for renaming a list or changing its type.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListBody {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub list_type: Option<String>,
}

/// Identity of a created or changed list.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedListResponse {
    pub id: String,
    #[schema(example = "weekly-shop")]
    pub slug: String,
    #[schema(example = "0a1b2c3d")]
    pub short_id: String,
}

impl From<CreatedList> for CreatedListResponse {
    fn from(created: CreatedList) -> Self {
        Self {
            id: created.id.to_string(),
            slug: created.slug,
            short_id: created.short_id.to_string(),
        }
    }
}

/// A list in an owner's listing.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSummaryResponse {
    pub id: String,
    pub short_id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub list_type: String,
    pub updated_at: String,
    /// Item count reported by the list's item store.
    pub entries: i64,
}

impl From<ListSummary> for ListSummaryResponse {
    fn from(summary: ListSummary) -> Self {
        let ListSummary {
            list,
            short_id,
            entries,
        } = summary;
        Self {
            id: list.id.to_string(),
            short_id: short_id.to_string(),
            name: list.name,
            slug: list.slug,
            list_type: list.list_type.as_str().to_owned(),
            updated_at: list.updated_at.to_rfc3339(),
            entries,
        }
    }
}

/// A list with its ordered items.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDetailResponse {
    pub id: String,
    pub short_id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub list_type: String,
    pub updated_at: String,
    pub items: Vec<ListItemResponse>,
}

impl From<ListDetail> for ListDetailResponse {
    fn from(detail: ListDetail) -> Self {
        let ListDetail {
            list,
            short_id,
            items,
        } = detail;
        Self {
            id: list.id.to_string(),
            short_id: short_id.to_string(),
            name: list.name,
            slug: list.slug,
            list_type: list.list_type.as_str().to_owned(),
            updated_at: list.updated_at.to_rfc3339(),
            items: items.into_iter().map(ListItemResponse::from).collect(),
        }
    }
}

/// Mirror row for one list.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadataResponse {
    pub list_id: String,
    pub user_id: String,
    pub items: i64,
    #[serde(rename = "type")]
    pub list_type: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ListMetadata> for ListMetadataResponse {
    fn from(row: ListMetadata) -> Self {
        Self {
            list_id: row.list_id.to_string(),
            user_id: row.user_id.to_string(),
            items: row.items,
            list_type: row.list_type.as_str().to_owned(),
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

/// Outcome of a metadata repair.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairMetadataResponse {
    /// Lists whose mirror count was rewritten.
    pub repaired: usize,
}

fn parse_name(name: String) -> Result<String, Error> {
    let name = non_blank(name, NAME)?;
    bounded(name, LIST_NAME_MAX, NAME)
}

fn parse_type(raw: Option<String>) -> Result<Option<ListType>, Error> {
    raw.map(|value| parse_list_type(&value, TYPE)).transpose()
}

fn parse_create(payload: CreateListRequest) -> Result<StartListRequest, Error> {
    let name = payload
        .name
        .filter(|name| !name.trim().is_empty())
        .map(parse_name)
        .transpose()?;
    Ok(StartListRequest {
        name,
        list_type: parse_type(payload.list_type)?.unwrap_or_default(),
        first_entry: payload.entry,
    })
}

fn parse_update(payload: UpdateListBody) -> Result<UpdateListRequest, Error> {
    let request = UpdateListRequest {
        name: payload.name.map(parse_name).transpose()?,
        list_type: parse_type(payload.list_type)?,
    };
    if request.name.is_none() && request.list_type.is_none() {
        return Err(empty_update_error());
    }
    Ok(request)
}

/// List the caller's live lists with their item counts.
#[utoipa::path(
    get,
    path = "/api/v1/lists",
    responses(
        (status = 200, description = "Live lists", body = [ListSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "listLists"
)]
#[get("/lists")]
pub async fn list_lists(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListSummaryResponse>>> {
    let owner = session.require_user_id()?;
    let lists = state.lists_query.lists(&owner).await?;
    Ok(web::Json(
        lists.into_iter().map(ListSummaryResponse::from).collect(),
    ))
}

/// Start a new list, optionally with a first item.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "List created", body = CreatedListResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "createList"
)]
#[post("/lists")]
pub async fn create_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let request = parse_create(payload.into_inner())?;
    let created = state.lists.start_list(&owner, request).await?;
    Ok(HttpResponse::Created().json(CreatedListResponse::from(created)))
}

/// Mirror rows for the caller's lists. Counts may lag the item stores.
#[utoipa::path(
    get,
    path = "/api/v1/lists/metadata",
    responses(
        (status = 200, description = "Mirror rows", body = [ListMetadataResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "listMetadata"
)]
#[get("/lists/metadata")]
pub async fn list_metadata(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListMetadataResponse>>> {
    let owner = session.require_user_id()?;
    let rows = state.lists_query.metadata(&owner).await?;
    Ok(web::Json(
        rows.into_iter().map(ListMetadataResponse::from).collect(),
    ))
}

/// Rewrite the mirror count of every live list from its item store.
#[utoipa::path(
    post,
    path = "/api/v1/lists/metadata/repair",
    responses(
        (status = 200, description = "Mirror rows repaired", body = RepairMetadataResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "repairListMetadata"
)]
#[post("/lists/metadata/repair")]
pub async fn repair_metadata(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RepairMetadataResponse>> {
    let owner = session.require_user_id()?;
    let repaired = state.lists.repair_metadata(&owner).await?;
    Ok(web::Json(RepairMetadataResponse { repaired }))
}

/// Fetch one list with its items in order.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{short_id}",
    params(("short_id" = String, Path, description = "List short id")),
    responses(
        (status = 200, description = "List with items", body = ListDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List not found", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "getList"
)]
#[get("/lists/{short_id}")]
pub async fn get_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListPath>,
) -> ApiResult<web::Json<ListDetailResponse>> {
    let owner = session.require_user_id()?;
    let short_id = parse_short_id(&path.short_id, FieldName::new("shortId"))?;
    let detail = state.lists_query.list_detail(&owner, &short_id).await?;
    Ok(web::Json(ListDetailResponse::from(detail)))
}

/// Rename a list or change its type.
#[utoipa::path(
    patch,
    path = "/api/v1/lists/{short_id}",
    request_body = UpdateListBody,
    params(("short_id" = String, Path, description = "List short id")),
    responses(
        (status = 200, description = "List updated", body = CreatedListResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List not found", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "updateList"
)]
#[patch("/lists/{short_id}")]
pub async fn update_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListPath>,
    payload: web::Json<UpdateListBody>,
) -> ApiResult<web::Json<CreatedListResponse>> {
    let owner = session.require_user_id()?;
    let short_id = parse_short_id(&path.short_id, FieldName::new("shortId"))?;
    let request = parse_update(payload.into_inner())?;
    let updated = state.lists.update_list(&owner, &short_id, request).await?;
    Ok(web::Json(CreatedListResponse::from(updated)))
}

/// Soft-delete a list.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{short_id}",
    params(("short_id" = String, Path, description = "List short id")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "List not found", body = ErrorSchema)
    ),
    tags = ["lists"],
    operation_id = "deleteList"
)]
#[delete("/lists/{short_id}")]
pub async fn delete_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ListPath>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let short_id = parse_short_id(&path.short_id, FieldName::new("shortId"))?;
    state.lists.delete_list(&owner, &short_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod tests;
