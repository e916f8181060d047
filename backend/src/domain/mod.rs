//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities shared by the HTTP adapter and the
//! storage actors. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - UserId (alias to `user::UserId`) — owner of a set of lists.
//! - List, ListItem, ListMetadata — the stored aggregates.
//! - ListService — use cases behind the driving ports.

pub mod attributes;
pub mod error;
pub mod list;
pub mod list_item;
mod list_name;
mod list_service;
pub mod metadata;
pub mod ports;
mod slug;
pub mod trace_id;
pub mod user;

pub use self::attributes::{AttributeChanges, AttributeKind, ItemAttributes, UnknownAttributeKind};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::list::{
    CreatedList, LIST_NAME_MAX, List, ListId, ListSummary, ListType, ListUpdate,
    ListValidationError, NewList, SHORT_ID_LEN, ShortId,
};
pub use self::list_item::{InvalidListItemId, ListItem, ListItemId, ListItemUpdate, NewListItem};
pub use self::list_name::generate_list_name;
pub use self::list_service::ListService;
pub use self::metadata::{ListMetadata, ListRegistration};
pub use self::slug::slugify;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use lists::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
