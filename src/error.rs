//! Error handling for the Deer Deterrent backend
//!
//! Centralized error types and handling for the application.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session error: {0}")]
    Session(#[from] crate::models::session::SessionError),

    #[error("Detection event error: {0}")]
    DetectionEvent(#[from] crate::models::detection_event::DetectionEventError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("OAuth state mismatch")]
    InvalidOauthState,

    #[error("OAuth exchange failed: {0}")]
    OauthExchange(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AppError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::Session(_)
            | AppError::DetectionEvent(_)
            | AppError::InvalidOauthState
            | AppError::UrlParse(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::OauthExchange(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DatabaseError",
            AppError::Session(_) => "SessionError",
            AppError::DetectionEvent(_) => "DetectionEventError",
            AppError::Unauthorized => "Unauthorized",
            AppError::AccessDenied => "AccessDenied",
            AppError::InvalidOauthState => "InvalidOauthState",
            AppError::OauthExchange(_) => "OauthExchangeError",
            AppError::Validation(_) => "ValidationError",
            AppError::NotFound(_) => "NotFound",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Internal(_) => "InternalError",
            AppError::Serialization(_) => "SerializationError",
            AppError::Io(_) => "IoError",
            AppError::HttpClient(_) => "HttpClientError",
            AppError::UrlParse(_) => "UrlParseError",
        }
    }

    /// Check if this error should be logged as an error vs warning
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Internal(_)
                | AppError::Io(_)
                | AppError::Serialization(_)
                | AppError::OauthExchange(_)
                | AppError::HttpClient(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(error = %message, code = %error_code, "Request failed");
        } else {
            tracing::warn!(error = %message, code = %error_code, "Request rejected");
        }

        let body = Json(json!({
            "error": error_code,
            "message": message,
            "timestamp": Utc::now().timestamp()
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation_error(message: &str) -> Self {
        AppError::Validation(message.to_string())
    }

    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{} not found", resource))
    }

    pub fn bad_request(message: &str) -> Self {
        AppError::BadRequest(message.to_string())
    }

    pub fn internal_error(message: &str) -> Self {
        AppError::Internal(message.to_string())
    }

    pub fn oauth_exchange_failed(message: &str) -> Self {
        AppError::OauthExchange(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidOauthState.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::OauthExchange("test".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_codes() {
        assert_eq!(AppError::Unauthorized.error_code(), "Unauthorized");
        assert_eq!(AppError::AccessDenied.error_code(), "AccessDenied");
        assert_eq!(AppError::NotFound("test".to_string()).error_code(), "NotFound");
        assert_eq!(AppError::Internal("test".to_string()).error_code(), "InternalError");
    }

    #[test]
    fn test_server_error_detection() {
        assert!(AppError::Internal("test".to_string()).is_server_error());
        assert!(AppError::Database(sqlx::Error::RowNotFound).is_server_error());
        assert!(AppError::OauthExchange("test".to_string()).is_server_error());
        assert!(!AppError::Unauthorized.is_server_error());
        assert!(!AppError::AccessDenied.is_server_error());
    }

    #[test]
    fn test_convenience_constructors() {
        let error = AppError::validation_error("Invalid input");
        assert!(matches!(error, AppError::Validation(_)));

        let error = AppError::not_found("Session");
        assert!(matches!(error, AppError::NotFound(_)));

        let error = AppError::oauth_exchange_failed("token endpoint returned 500");
        assert!(matches!(error, AppError::OauthExchange(_)));
    }

    #[test]
    fn test_error_response_format() {
        let error = AppError::AccessDenied;
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
