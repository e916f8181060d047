//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every list, item, session and health endpoint
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`ListTypeSchema`]) plus the request and response bodies declared by the
//!   handlers
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::items::{
    AddItemRequest, AttributeChangesResponse, ItemAttributesBody, ItemIdResponse,
    ListItemResponse, ReorderItemsRequest, ReorderItemsResponse, UpdateItemRequest,
};
use crate::inbound::http::lists::{
    CreateListRequest, CreatedListResponse, ListDetailResponse, ListMetadataResponse,
    ListSummaryResponse, RepairMetadataResponse, UpdateListBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, ListTypeSchema};
use crate::inbound::http::users::SessionUserResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session/anonymous.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lists API",
        description = "Per-user lists with ordered items, backed by single-writer entity stores.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::start_anonymous_session,
        crate::inbound::http::lists::list_lists,
        crate::inbound::http::lists::create_list,
        crate::inbound::http::lists::list_metadata,
        crate::inbound::http::lists::repair_metadata,
        crate::inbound::http::lists::get_list,
        crate::inbound::http::lists::update_list,
        crate::inbound::http::lists::delete_list,
        crate::inbound::http::items::add_item,
        crate::inbound::http::items::update_item,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::items::reorder_items,
        crate::inbound::http::items::set_item_attributes,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ListTypeSchema,
        SessionUserResponse,
        CreateListRequest,
        UpdateListBody,
        CreatedListResponse,
        ListSummaryResponse,
        ListDetailResponse,
        ListMetadataResponse,
        RepairMetadataResponse,
        AddItemRequest,
        UpdateItemRequest,
        ReorderItemsRequest,
        ItemAttributesBody,
        ListItemResponse,
        ItemIdResponse,
        ReorderItemsResponse,
        AttributeChangesResponse,
    )),
    tags(
        (name = "session", description = "Anonymous session bootstrap"),
        (name = "lists", description = "Operations on a user's lists"),
        (name = "items", description = "Operations on the items of one list"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
