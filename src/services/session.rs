//! Session Service
//!
//! Creates, authenticates, and revokes the database-backed login sessions
//! behind the browser cookie. Cookie values are `<id>.<mac>` where the MAC
//! is HMAC-SHA256 over the session id, so a forged or truncated cookie is
//! rejected before any database lookup.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::logging;
use crate::models::Session;

type HmacSha256 = Hmac<Sha256>;

/// Session management service
#[derive(Debug, Clone)]
pub struct SessionService {
    db: DatabaseManager,
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl SessionService {
    /// Create a session service over the given database
    pub fn new(db: DatabaseManager, secret: &str, ttl_seconds: i64) -> Self {
        Self {
            db,
            secret: secret.as_bytes().to_vec(),
            ttl_seconds,
        }
    }

    /// Session lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Create and persist a session, returning it with its signed cookie value
    pub async fn create_session(&self, email: &str, now: i64) -> AppResult<(Session, String)> {
        let session = Session::new(email, now, self.ttl_seconds)?;
        self.db.insert_session(&session).await?;

        let cookie_value = format!("{}.{}", session.id, self.sign(&session.id)?);

        logging::log_session_created(&session.id, session.expires_at);
        Ok((session, cookie_value))
    }

    /// Authenticate a cookie value against the session store
    ///
    /// Expired rows encountered here are deleted rather than left to the
    /// pruning task.
    pub async fn authenticate(&self, cookie_value: &str, now: i64) -> AppResult<Session> {
        let id = self.verify_cookie_value(cookie_value)?;

        let session = self
            .db
            .get_session(&id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if session.is_expired(now) {
            self.db.delete_session(&session.id).await?;
            return Err(AppError::Unauthorized);
        }

        Ok(session)
    }

    /// Revoke the session behind a cookie value
    ///
    /// Invalid cookies are treated as already signed out.
    pub async fn revoke(&self, cookie_value: &str) -> AppResult<()> {
        if let Ok(id) = self.verify_cookie_value(cookie_value) {
            self.db.delete_session(&id).await?;
            logging::log_session_revoked(&id);
        }
        Ok(())
    }

    /// Delete expired session rows, returning the number removed
    pub async fn prune_expired(&self, now: i64) -> AppResult<u64> {
        let removed = self.db.delete_expired_sessions(now).await?;
        logging::log_sessions_pruned(removed);
        Ok(removed)
    }

    /// Verify the MAC on a cookie value and extract the session id
    fn verify_cookie_value(&self, cookie_value: &str) -> AppResult<String> {
        let (id, mac_hex) = cookie_value
            .split_once('.')
            .ok_or(AppError::Unauthorized)?;

        if id.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let mac_bytes = hex::decode(mac_hex).map_err(|_| AppError::Unauthorized)?;

        let mut mac = self.mac()?;
        mac.update(id.as_bytes());
        mac.verify_slice(&mac_bytes)
            .map_err(|_| AppError::Unauthorized)?;

        Ok(id.to_string())
    }

    fn sign(&self, id: &str) -> AppResult<String> {
        let mut mac = self.mac()?;
        mac.update(id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal_error(&format!("Invalid HMAC key: {}", e)))
    }
}
