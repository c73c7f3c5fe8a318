//! Configuration management for the Deer Deterrent backend
//!
//! Handles environment variables and application settings.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Placeholder secrets that are acceptable in development only
const PLACEHOLDER_SESSION_SECRET: &str = "change-me-in-production-change-me!!";
const PLACEHOLDER_DETECTOR_KEY: &str = "change-me-in-production";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Database URL
    pub database_url: String,

    /// Data directory for the SQLite database
    pub data_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,

    /// Log level
    pub log_level: String,

    /// Google OAuth client identifier
    pub google_client_id: String,

    /// Google OAuth client secret
    pub google_client_secret: String,

    /// The single allow-listed Google account
    pub allowed_email: String,

    /// HMAC key for session and OAuth state cookies
    pub session_secret: String,

    /// Shared key the on-site detector sends with ingested events
    pub detector_api_key: String,

    /// Public base URL of this backend (builds the OAuth redirect URI)
    pub public_url: String,

    /// Frontend origin for CORS and post-login redirects
    pub frontend_origin: String,

    /// Session lifetime in days
    pub session_ttl_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite:deer-deterrent.db".to_string(),
            data_dir: PathBuf::from("./data"),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            allowed_email: "dev@example.com".to_string(),
            session_secret: PLACEHOLDER_SESSION_SECRET.to_string(),
            detector_api_key: PLACEHOLDER_DETECTOR_KEY.to_string(),
            public_url: "http://localhost:8080".to_string(),
            frontend_origin: "http://localhost:5173".to_string(),
            session_ttl_days: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server configuration
        if let Ok(host) = env::var("DEER_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("DEER_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }

        // Database configuration
        if let Ok(database_url) = env::var("DEER_DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(data_dir) = env::var("DEER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        // Environment
        if let Ok(environment) = env::var("DEER_ENVIRONMENT") {
            config.environment = environment;
        }

        // Logging
        if let Ok(log_level) = env::var("DEER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        // OAuth credentials keep their unprefixed deployment names
        if let Ok(client_id) = env::var("GOOGLE_CLIENT_ID") {
            config.google_client_id = client_id;
        }

        if let Ok(client_secret) = env::var("GOOGLE_CLIENT_SECRET") {
            config.google_client_secret = client_secret;
        }

        // Access control
        if let Ok(allowed_email) = env::var("DEER_ALLOWED_EMAIL") {
            config.allowed_email = allowed_email;
        }

        if let Ok(session_secret) = env::var("DEER_SESSION_SECRET") {
            config.session_secret = session_secret;
        }

        if let Ok(detector_api_key) = env::var("DEER_DETECTOR_API_KEY") {
            config.detector_api_key = detector_api_key;
        }

        // URLs
        if let Ok(public_url) = env::var("DEER_PUBLIC_URL") {
            config.public_url = public_url;
        }

        if let Ok(frontend_origin) = env::var("DEER_FRONTEND_ORIGIN") {
            config.frontend_origin = frontend_origin;
        }

        // Session lifetime
        if let Ok(ttl_days) = env::var("DEER_SESSION_TTL_DAYS") {
            config.session_ttl_days = ttl_days
                .parse()
                .map_err(|_| ConfigError::InvalidSessionTtl(ttl_days))?;
        }

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate session secret
        if self.session_secret == PLACEHOLDER_SESSION_SECRET && self.is_production() {
            return Err(ConfigError::InsecureProductionSecret);
        }

        if self.session_secret.len() < 32 {
            return Err(ConfigError::SessionSecretTooShort);
        }

        if self.detector_api_key == PLACEHOLDER_DETECTOR_KEY && self.is_production() {
            return Err(ConfigError::InsecureProductionSecret);
        }

        // Google credentials are required once deployed
        if self.is_production()
            && (self.google_client_id.is_empty() || self.google_client_secret.is_empty())
        {
            return Err(ConfigError::MissingGoogleCredentials);
        }

        // Validate allow-listed email
        if !self.allowed_email.contains('@') {
            return Err(ConfigError::InvalidAllowedEmail(self.allowed_email.clone()));
        }

        // Validate port
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }

        // Validate database URL
        if self.database_url.is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        // Validate data directory
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        // Validate URLs
        Self::validate_http_url(&self.public_url)?;
        Self::validate_http_url(&self.frontend_origin)?;

        // Validate session lifetime
        if self.session_ttl_days == 0 {
            return Err(ConfigError::InvalidSessionTtl(
                self.session_ttl_days.to_string(),
            ));
        }

        Ok(())
    }

    fn validate_http_url(value: &str) -> Result<(), ConfigError> {
        let parsed = Url::parse(value).map_err(|_| ConfigError::InvalidUrl(value.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(value.to_string()));
        }
        Ok(())
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the OAuth redirect URI registered with the provider
    pub fn redirect_uri(&self) -> String {
        format!("{}/api/auth/callback", self.public_url.trim_end_matches('/'))
    }

    /// Get session lifetime in seconds
    pub fn session_ttl_seconds(&self) -> i64 {
        i64::from(self.session_ttl_days) * 86_400
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Create data directory if it doesn't exist
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| ConfigError::DataDirCreationFailed(e.to_string()))?;
        Ok(())
    }

    /// Get full database path if using a relative SQLite file
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.database_url.starts_with("sqlite:") {
            let path = self
                .database_url
                .strip_prefix("sqlite:")
                .unwrap_or(&self.database_url);
            if path == ":memory:" {
                return None;
            }
            let path = PathBuf::from(path);

            if path.is_relative() {
                let mut full_path = self.data_dir.clone();
                full_path.push(path);
                Some(full_path)
            } else {
                Some(path)
            }
        } else {
            None
        }
    }

    /// Log configuration (excluding sensitive data)
    pub fn log_config(&self) {
        info!("Configuration loaded:");
        info!("  Environment: {}", self.environment);
        info!("  Bind address: {}", self.bind_address());
        info!("  Database URL: {}", self.database_url);
        info!("  Data directory: {:?}", self.data_dir);
        info!("  Log level: {}", self.log_level);
        info!("  Public URL: {}", self.public_url);
        info!("  Redirect URI: {}", self.redirect_uri());
        info!("  Frontend origin: {}", self.frontend_origin);
        info!("  Allowed email: {}", mask_email(&self.allowed_email));
        info!("  Session lifetime: {} days", self.session_ttl_days);

        if self.session_secret == PLACEHOLDER_SESSION_SECRET {
            warn!("Using default session secret - CHANGE IN PRODUCTION!");
        }
        if self.google_client_id.is_empty() {
            warn!("GOOGLE_CLIENT_ID is not set - sign-in will fail");
        }
    }
}

/// Mask an email address for logging
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let shown = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", shown, domain)
        }
        None => "***".to_string(),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid session lifetime: {0}")]
    InvalidSessionTtl(String),

    #[error("Insecure secret for production environment")]
    InsecureProductionSecret,

    #[error("Session secret too short (minimum 32 characters)")]
    SessionSecretTooShort,

    #[error("GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET are required in production")]
    MissingGoogleCredentials,

    #[error("Invalid allow-listed email: {0}")]
    InvalidAllowedEmail(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Empty database URL")]
    EmptyDatabaseUrl,

    #[error("Empty data directory")]
    EmptyDataDir,

    #[error("Data directory creation failed: {0}")]
    DataDirCreationFailed(String),
}
