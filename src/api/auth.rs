//! Authentication API Endpoints
//!
//! The Google sign-in flow, session cookie handling, and the `CurrentUser`
//! extractor that guards the dashboard endpoints. The allow-list is enforced
//! here, at the OAuth callback: only the configured account ever gets a
//! session.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::logging;
use crate::models::Session;
use crate::services::oauth;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "deer_session";

/// Name of the short-lived OAuth CSRF state cookie
pub const STATE_COOKIE: &str = "deer_oauth_state";

/// How long the state cookie may sit between /login and /callback
const STATE_COOKIE_MAX_AGE: i64 = 600;

/// Create authentication API routes
pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// The signed-in session, extracted from the session cookie
///
/// Rejects with 401 when the cookie is missing, forged, revoked, or expired.
pub struct CurrentUser(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthorized)?;

        let session = state
            .sessions
            .authenticate(cookie.value(), Utc::now().timestamp())
            .await?;

        Ok(CurrentUser(session))
    }
}

/// Query parameters Google sends to the callback
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Response body for /api/auth/me
#[derive(Debug, Serialize)]
struct MeResponse {
    email: String,
    expires_at: i64,
}

/// Start the sign-in flow: set the CSRF state cookie and send the browser
/// to Google's consent screen
async fn login(State(app): State<AppState>) -> AppResult<Response> {
    let state_token = oauth::new_state_token();
    let authorize_url = app.oauth.authorize_url(&state_token)?;

    let state_cookie = build_cookie(
        STATE_COOKIE,
        &state_token,
        STATE_COOKIE_MAX_AGE,
        app.config.is_production(),
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, state_cookie)]),
        Redirect::temporary(&authorize_url),
    )
        .into_response())
}

/// Complete the sign-in flow
///
/// Verifies the CSRF state, exchanges the code, reads the identity from the
/// userinfo endpoint, and enforces the allow-list. Browser-facing failures
/// redirect back to the frontend with an error marker instead of rendering
/// JSON.
async fn callback(
    State(app): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> AppResult<Response> {
    let secure = app.config.is_production();
    let clear_state = clear_cookie(STATE_COOKIE, secure);

    // The user cancelled at the consent screen, or Google reported an error
    if params.error.is_some() {
        logging::log_authentication_event("callback", None, false);
        return Ok(redirect_with_error(&app, clear_state, "oauth"));
    }

    let expected_state = jar
        .get(STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::InvalidOauthState)?;
    let received_state = params.state.as_deref().ok_or(AppError::InvalidOauthState)?;
    if received_state != expected_state {
        return Err(AppError::InvalidOauthState);
    }

    let code = params
        .code
        .as_deref()
        .ok_or_else(|| AppError::bad_request("Missing authorization code"))?;

    let access_token = app.oauth.exchange_code(code).await?;
    let user = app.oauth.fetch_user(&access_token).await?;

    let Some(email) = user.verified_email() else {
        logging::log_authentication_event("signin", Some(&user.email), false);
        return Ok(redirect_with_error(&app, clear_state, "access_denied"));
    };

    if !email.eq_ignore_ascii_case(&app.config.allowed_email) {
        logging::log_authentication_event("signin", Some(email), false);
        return Ok(redirect_with_error(&app, clear_state, "access_denied"));
    }

    let (_, cookie_value) = app
        .sessions
        .create_session(email, Utc::now().timestamp())
        .await?;
    let session_cookie = build_cookie(
        SESSION_COOKIE,
        &cookie_value,
        app.sessions.ttl_seconds(),
        secure,
    );

    logging::log_authentication_event("signin", Some(email), true);

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session_cookie),
            (header::SET_COOKIE, clear_state),
        ]),
        Redirect::to(&frontend_url(&app, None)),
    )
        .into_response())
}

/// Sign out: revoke the server-side session and clear the cookie
async fn logout(
    State(app): State<AppState>,
    _user: CurrentUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        app.sessions.revoke(cookie.value()).await?;
    }

    let clear = clear_cookie(SESSION_COOKIE, app.config.is_production());
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, clear)]),
    )
        .into_response())
}

/// Who is signed in; the frontend uses this to pick login screen vs dashboard
async fn me(CurrentUser(session): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        email: session.email,
        expires_at: session.expires_at,
    })
}

/// Redirect back to the frontend, optionally with an error marker
fn redirect_with_error(app: &AppState, clear_state: String, error: &str) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, clear_state)]),
        Redirect::to(&frontend_url(app, Some(error))),
    )
        .into_response()
}

fn frontend_url(app: &AppState, error: Option<&str>) -> String {
    let base = app.config.frontend_origin.trim_end_matches('/');
    match error {
        Some(error) => format!("{}/?error={}", base, error),
        None => format!("{}/", base),
    }
}

fn build_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util;
    use axum_test::TestServer;

    fn server(state: AppState) -> TestServer {
        TestServer::new(crate::api::create_router(state).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_me_without_cookie_is_unauthorized() {
        let server = server(test_util::test_state().await);

        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn test_me_with_garbage_cookie_is_unauthorized() {
        let server = server(test_util::test_state().await);

        let response = server
            .get("/api/auth/me")
            .add_header(
                header::COOKIE,
                header::HeaderValue::from_static("deer_session=not-a-real-cookie"),
            )
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn test_me_with_valid_session() {
        let state = test_util::test_state().await;
        let (_, cookie_value) = state
            .sessions
            .create_session(test_util::TEST_ALLOWED_EMAIL, Utc::now().timestamp())
            .await
            .unwrap();
        let server = server(state);

        let response = server
            .get("/api/auth/me")
            .add_header(
                header::COOKIE,
                header::HeaderValue::from_str(&format!("deer_session={}", cookie_value)).unwrap(),
            )
            .await;

        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["email"], test_util::TEST_ALLOWED_EMAIL);
        assert!(body["expires_at"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_login_redirects_to_google_with_state_cookie() {
        let server = server(test_util::test_state().await);

        let response = server.get("/api/auth/login").await;
        assert_eq!(response.status_code(), 307);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(location.contains("client_id=test-client-id"));
        assert!(location.contains("state="));

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("deer_oauth_state="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=600"));
    }

    #[tokio::test]
    async fn test_callback_without_state_cookie_is_rejected() {
        let server = server(test_util::test_state().await);

        let response = server.get("/api/auth/callback?code=abc&state=xyz").await;
        assert_eq!(response.status_code(), 400);
    }

    #[tokio::test]
    async fn test_callback_with_mismatched_state_is_rejected() {
        let server = server(test_util::test_state().await);

        let response = server
            .get("/api/auth/callback?code=abc&state=not-the-cookie-value")
            .add_header(
                header::COOKIE,
                header::HeaderValue::from_static("deer_oauth_state=the-cookie-value"),
            )
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[tokio::test]
    async fn test_callback_provider_error_redirects_to_frontend() {
        let server = server(test_util::test_state().await);

        let response = server.get("/api/auth/callback?error=access_denied").await;
        assert_eq!(response.status_code(), 303);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(location, "http://localhost:5173/?error=oauth");
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let state = test_util::test_state().await;
        let (_, cookie_value) = state
            .sessions
            .create_session(test_util::TEST_ALLOWED_EMAIL, Utc::now().timestamp())
            .await
            .unwrap();
        let server = server(state);
        let cookie_header =
            header::HeaderValue::from_str(&format!("deer_session={}", cookie_value)).unwrap();

        let response = server
            .post("/api/auth/logout")
            .add_header(header::COOKIE, cookie_header.clone())
            .await;
        assert_eq!(response.status_code(), 204);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("deer_session=;"));
        assert!(set_cookie.contains("Max-Age=0"));

        // The session is gone server-side, not just in the browser
        let response = server
            .get("/api/auth/me")
            .add_header(header::COOKIE, cookie_header)
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn test_logout_without_session_is_unauthorized() {
        let server = server(test_util::test_state().await);

        let response = server.post("/api/auth/logout").await;
        assert_eq!(response.status_code(), 401);
    }

    #[test]
    fn test_cookie_building() {
        let cookie = build_cookie("deer_session", "value", 2_592_000, false);
        assert_eq!(
            cookie,
            "deer_session=value; Path=/; HttpOnly; SameSite=Lax; Max-Age=2592000"
        );

        let cookie = build_cookie("deer_session", "value", 60, true);
        assert!(cookie.ends_with("; Secure"));

        let cleared = clear_cookie("deer_session", false);
        assert!(cleared.starts_with("deer_session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}
