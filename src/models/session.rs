//! Session Model
//!
//! Server-side login sessions backing the browser cookie. A session row is
//! the source of truth: deleting it logs the account out everywhere, and
//! rows outliving their expiry are treated as absent.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Opaque session identifier (UUIDv4)
    pub id: String,

    /// Email of the signed-in account
    pub email: String,

    /// Creation timestamp (Unix seconds, UTC)
    pub created_at: i64,

    /// Expiry timestamp (Unix seconds, UTC)
    pub expires_at: i64,
}

impl Session {
    /// Create a new session for an account, valid for `ttl_seconds` from `now`
    pub fn new(email: &str, now: i64, ttl_seconds: i64) -> Result<Self, SessionError> {
        if !email.contains('@') {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }
        if ttl_seconds <= 0 {
            return Err(SessionError::InvalidTtl(ttl_seconds));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + ttl_seconds,
        })
    }

    /// Check whether the session has expired at the given instant
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Seconds of validity left at the given instant
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Session validation errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid email '{0}'")]
    InvalidEmail(String),

    #[error("Invalid session lifetime {0} seconds")]
    InvalidTtl(i64),
}
