//! Google OAuth Service
//!
//! Implements the authorization-code flow against Google's OAuth 2.0 and
//! OpenID Connect endpoints: building the consent URL, exchanging the
//! callback code for tokens, and reading the signed-in identity from the
//! userinfo endpoint.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::GoogleUser;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Successful response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth client for the Google sign-in flow
#[derive(Debug, Clone)]
pub struct OauthService {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl OauthService {
    /// Create a service pointed at Google's production endpoints
    pub fn new(config: &Config) -> Self {
        Self::with_endpoints(
            config,
            GOOGLE_AUTH_URL.to_string(),
            GOOGLE_TOKEN_URL.to_string(),
            GOOGLE_USERINFO_URL.to_string(),
        )
    }

    /// Create a service with explicit endpoints, used by tests
    pub fn with_endpoints(
        config: &Config,
        auth_url: String,
        token_url: String,
        userinfo_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.redirect_uri(),
            auth_url,
            token_url,
            userinfo_url,
        }
    }

    /// Build the consent URL the browser is redirected to
    pub fn authorize_url(&self, state: &str) -> AppResult<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OauthExchange(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in identity from the userinfo endpoint
    pub async fn fetch_user(&self, access_token: &str) -> AppResult<GoogleUser> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::OauthExchange(format!(
                "userinfo endpoint returned {}",
                status
            )));
        }

        let user: GoogleUser = response.json().await?;
        Ok(user)
    }
}

/// Generate a random URL-safe token for the OAuth `state` parameter
pub fn new_state_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
