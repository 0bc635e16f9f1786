//! # REST API for Login
//!
//! `POST /api/login` with `{password}` sets the session cookie,
//! `POST /api/logout` clears it. [`require_session`] guards every other
//! REST route.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use super::ApiError;
use crate::AppState;
use shared::{LoginRequest, OkResponse};

pub const SESSION_COOKIE: &str = "expense_session";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    info!("POST /api/login");

    match state.session_service.login(&request.password) {
        Some(token) => {
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Json(OkResponse { ok: true })).into_response()
        }
        None => ApiError::new(StatusCode::UNAUTHORIZED, "Invalid password").into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    info!("POST /api/logout");

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.session_service.logout(cookie.value());
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(OkResponse { ok: true }),
    )
}

/// Reject requests without a live session cookie with 401 `{error}`
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let authorized = jar
        .get(SESSION_COOKIE)
        .map(|cookie| state.session_service.is_valid(cookie.value()))
        .unwrap_or(false);

    if !authorized {
        warn!("{} {} rejected: no session", request.method(), request.uri().path());
        return ApiError::unauthorized().into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, TEST_PASSWORD};
    use crate::create_router;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request as HttpRequest};
    use tower::ServiceExt;

    fn login_request(password: &str) -> HttpRequest<Body> {
        HttpRequest::post("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"password":"{}"}}"#, password)))
            .unwrap()
    }

    #[tokio::test]
    async fn protected_route_requires_login() {
        let (state, _dir) = test_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(HttpRequest::get("/api/expenses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: shared::ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Login required");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (state, _dir) = test_state().await;
        let response = create_router(state).oneshot(login_request("nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn session_cookie_opens_and_logout_closes() {
        let (state, _dir) = test_state().await;
        let app = create_router(state);

        let response = app.clone().oneshot(login_request(TEST_PASSWORD)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let listed = app
            .clone()
            .oneshot(
                HttpRequest::get("/api/expenses")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);

        app.clone()
            .oneshot(
                HttpRequest::post("/api/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let after = app
            .oneshot(
                HttpRequest::get("/api/expenses")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }
}
