//! API module for the Deer Deterrent backend
//!
//! Contains all REST API endpoints, routing, and the shared state handed to
//! handlers.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{DetectionService, OauthService, SessionService};

pub mod auth;
pub mod detections;
pub mod deterrent;

pub use auth::CurrentUser;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionService>,
    pub oauth: Arc<OauthService>,
    pub detections: Arc<DetectionService>,
}

/// Build the application router
pub fn create_router(state: AppState) -> AppResult<Router> {
    // Credentials (the session cookie) require a concrete origin, never a
    // wildcard.
    let cors_origin: HeaderValue = state
        .config
        .frontend_origin
        .parse()
        .map_err(|_| AppError::internal_error("Frontend origin is not a valid header value"))?;

    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let api = Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth::create_auth_routes())
        .nest("/detections", detections::create_detection_routes())
        .nest("/deterrent", deterrent::create_deterrent_routes());

    Ok(Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

/// Liveness check used by the container healthcheck
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::database::DatabaseManager;

    pub const TEST_SECRET: &str = "a-sufficiently-long-session-secret-key";
    pub const TEST_ALLOWED_EMAIL: &str = "owner@rndpig.com";
    pub const TEST_DETECTOR_KEY: &str = "test-detector-key";

    pub fn test_config() -> Config {
        Config {
            google_client_id: "test-client-id".to_string(),
            google_client_secret: "test-client-secret".to_string(),
            allowed_email: TEST_ALLOWED_EMAIL.to_string(),
            session_secret: TEST_SECRET.to_string(),
            detector_api_key: TEST_DETECTOR_KEY.to_string(),
            ..Config::default()
        }
    }

    pub async fn test_state() -> AppState {
        test_state_with_config(test_config()).await
    }

    pub async fn test_state_with_config(config: Config) -> AppState {
        let db = DatabaseManager::in_memory().await.unwrap();
        test_state_with(config, db)
    }

    pub fn test_state_with(config: Config, db: DatabaseManager) -> AppState {
        let sessions = Arc::new(SessionService::new(
            db.clone(),
            &config.session_secret,
            config.session_ttl_seconds(),
        ));
        let oauth = Arc::new(OauthService::new(&config));
        let detections = Arc::new(DetectionService::new(db));

        AppState {
            config: Arc::new(config),
            sessions,
            oauth,
            detections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = test_util::test_state().await;
        let server = TestServer::new(create_router(state).unwrap()).unwrap();

        let response = server.get("/api/health").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let state = test_util::test_state().await;
        let server = TestServer::new(create_router(state).unwrap()).unwrap();

        let response = server.get("/api/nope").await;
        assert_eq!(response.status_code(), 404);
    }
}
