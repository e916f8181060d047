//! Session bootstrap handlers.
//!
//! ```text
//! POST /api/v1/session/anonymous
//! ```

use actix_web::{HttpResponse, post};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;

/// Identity carried by the session cookie.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserResponse {
    /// User id stored in the session.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
}

/// Start an anonymous session, or return the one already established.
///
/// A fresh user id is minted only when the cookie carries none, so repeated
/// calls keep the same lists.
#[utoipa::path(
    post,
    path = "/api/v1/session/anonymous",
    responses(
        (status = 200, description = "Existing session", body = SessionUserResponse),
        (status = 201, description = "New anonymous session",
            body = SessionUserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "startAnonymousSession",
    security([])
)]
#[post("/session/anonymous")]
pub async fn start_anonymous_session(session: SessionContext) -> ApiResult<HttpResponse> {
    if let Some(user_id) = session.user_id()? {
        return Ok(HttpResponse::Ok().json(SessionUserResponse {
            user_id: user_id.to_string(),
        }));
    }
    let user_id = UserId::random();
    session.persist_user(&user_id)?;
    info!(%user_id, "started anonymous session");
    Ok(HttpResponse::Created().json(SessionUserResponse {
        user_id: user_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn anonymous_session_is_minted_once() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .service(web::scope("/api/v1").service(start_anonymous_session)),
        )
        .await;

        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/session/anonymous")
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let cookie = session_cookie(&first);
        let minted: SessionUserResponse = test::read_body_json(first).await;
        assert!(UserId::new(&minted.user_id).is_ok());

        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/session/anonymous")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::OK);
        let existing: SessionUserResponse = test::read_body_json(second).await;
        assert_eq!(existing.user_id, minted.user_id);
    }
}
