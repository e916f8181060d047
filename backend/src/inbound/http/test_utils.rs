//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::UserId;
use crate::domain::ports::{ListsCommand, ListsQuery};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Path of the test-only route that signs the fixture user in.
pub const SIGN_IN_PATH: &str = "/test/sign-in";

/// User id persisted by [`sign_in`].
pub const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// The fixture user.
pub fn test_user() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id")
}

/// Test-only handler that stores the fixture user in the session.
pub async fn sign_in(session: SessionContext) -> ApiResult<HttpResponse> {
    session.persist_user(&test_user())?;
    Ok(HttpResponse::Ok().finish())
}

/// Register [`sign_in`] at [`SIGN_IN_PATH`].
pub fn sign_in_route(cfg: &mut web::ServiceConfig) {
    cfg.route(SIGN_IN_PATH, web::post().to(sign_in));
}

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Wrap command and query doubles in handler state.
pub fn state_with(
    command: impl ListsCommand + 'static,
    query: impl ListsQuery + 'static,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(Arc::new(command), Arc::new(query)))
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie set")
}
