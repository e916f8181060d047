//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod items;
pub mod lists;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the `/api/v1` handlers and their extractor error handlers.
///
/// The caller supplies the session middleware and [`state::HttpState`].
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use lists::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::start_anonymous_session)
        .service(lists::list_lists)
        .service(lists::create_list)
        .service(lists::list_metadata)
        .service(lists::repair_metadata)
        .service(lists::get_list)
        .service(lists::update_list)
        .service(lists::delete_list)
        .service(items::add_item)
        .service(items::reorder_items)
        .service(items::update_item)
        .service(items::delete_item)
        .service(items::set_item_attributes);
}
