//! Deterrent API Endpoints
//!
//! Dashboard control over the sprinkler deterrent: read the current state,
//! arm, and disarm.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Deserialize;

use super::{AppState, CurrentUser};
use crate::error::AppResult;
use crate::models::{DeterrentMode, DeterrentState};

/// Create deterrent API routes
pub fn create_deterrent_routes() -> Router<AppState> {
    Router::new().route("/", get(get_deterrent).post(update_deterrent))
}

/// Mode change request from the dashboard
#[derive(Debug, Deserialize)]
struct UpdateDeterrentRequest {
    mode: DeterrentMode,
}

/// Current deterrent state
async fn get_deterrent(
    State(app): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<DeterrentState>> {
    let state = app.detections.deterrent_state(Utc::now().timestamp()).await?;
    Ok(Json(state))
}

/// Arm or disarm the deterrent
async fn update_deterrent(
    State(app): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<UpdateDeterrentRequest>,
) -> AppResult<Json<DeterrentState>> {
    let state = app
        .detections
        .set_mode(request.mode, Utc::now().timestamp())
        .await?;
    Ok(Json(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util;
    use axum::http::header;
    use axum_test::TestServer;
    use serde_json::json;

    fn server(state: AppState) -> TestServer {
        TestServer::new(crate::api::create_router(state).unwrap()).unwrap()
    }

    async fn session_cookie(state: &AppState) -> header::HeaderValue {
        let (_, cookie_value) = state
            .sessions
            .create_session(test_util::TEST_ALLOWED_EMAIL, Utc::now().timestamp())
            .await
            .unwrap();
        header::HeaderValue::from_str(&format!("deer_session={}", cookie_value)).unwrap()
    }

    #[tokio::test]
    async fn test_deterrent_requires_session() {
        let server = server(test_util::test_state().await);

        let response = server.get("/api/deterrent").await;
        assert_eq!(response.status_code(), 401);

        let response = server
            .post("/api/deterrent")
            .json(&json!({"mode": "armed"}))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn test_default_state_is_disarmed() {
        let state = test_util::test_state().await;
        let cookie = session_cookie(&state).await;
        let server = server(state);

        let response = server
            .get("/api/deterrent")
            .add_header(header::COOKIE, cookie)
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["mode"], "disarmed");
        assert_eq!(body["activation_count"], 0);
    }

    #[tokio::test]
    async fn test_arm_and_disarm() {
        let state = test_util::test_state().await;
        let cookie = session_cookie(&state).await;
        let server = server(state);

        let response = server
            .post("/api/deterrent")
            .add_header(header::COOKIE, cookie.clone())
            .json(&json!({"mode": "armed"}))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["mode"], "armed");

        let response = server
            .post("/api/deterrent")
            .add_header(header::COOKIE, cookie)
            .json(&json!({"mode": "disarmed"}))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["mode"], "disarmed");
    }

    #[tokio::test]
    async fn test_unknown_mode_rejected() {
        let state = test_util::test_state().await;
        let cookie = session_cookie(&state).await;
        let server = server(state);

        let response = server
            .post("/api/deterrent")
            .add_header(header::COOKIE, cookie)
            .json(&json!({"mode": "sprinkle"}))
            .await;
        assert_eq!(response.status_code(), 422);
    }
}
