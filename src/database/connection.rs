//! Database connection manager
//!
//! Owns the SQLite pool and all queries. The deployment target is a single
//! container with one database file, so there is no multi-backend
//! abstraction here.

use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, query_scalar, SqlitePool};
use tracing::{debug, info};

use crate::models::{DetectionEvent, DeterrentState, Session};

/// Database connection manager
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    /// Create a new database manager for the given SQLite URL or file path
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Connecting to database: {}", database_url);

        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| anyhow::anyhow!("Invalid database URL '{}': {}", database_url, e))?
            .create_if_missing(true);

        // A shared on-disk pool is fine; :memory: gives every connection its
        // own database, so the pool must stay at a single connection there.
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

        debug!("Successfully connected to SQLite database");

        Ok(Self { pool })
    }

    /// Create an in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        let manager = Self::new("sqlite::memory:").await?;
        manager.migrate().await?;
        Ok(manager)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");

        self.create_tables().await?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Create database tables
    async fn create_tables(&self) -> Result<()> {
        // Sessions table
        query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Detection events table
        query(
            r#"
            CREATE TABLE IF NOT EXISTS detection_events (
                id TEXT PRIMARY KEY,
                camera_id TEXT NOT NULL,
                confidence REAL NOT NULL,
                deterrent_fired BOOLEAN NOT NULL DEFAULT FALSE,
                detected_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Deterrent state table (single row, id = 'default')
        query(
            r#"
            CREATE TABLE IF NOT EXISTS deterrent_state (
                id TEXT PRIMARY KEY,
                mode TEXT NOT NULL DEFAULT 'disarmed' CHECK (mode IN ('armed', 'disarmed')),
                last_activated_at INTEGER,
                activation_count INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("SQLite tables created successfully");
        Ok(())
    }

    /// Test database connection
    pub async fn test_connection(&self) -> Result<()> {
        query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!("Database connection test failed: {}", e))?;

        debug!("Database connection test successful");
        Ok(())
    }

    // Session queries

    /// Persist a new session row
    pub async fn insert_session(&self, session: &Session) -> Result<(), sqlx::Error> {
        query(
            r#"
            INSERT INTO sessions (id, email, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.email)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a session by id
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, sqlx::Error> {
        query_as::<_, Session>(
            r#"
            SELECT id, email, created_at, expires_at
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a session by id
    pub async fn delete_session(&self, id: &str) -> Result<(), sqlx::Error> {
        query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete all sessions that expired at or before `now`, returning the count
    pub async fn delete_expired_sessions(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Detection event queries

    /// Persist a detection event
    pub async fn insert_detection_event(&self, event: &DetectionEvent) -> Result<(), sqlx::Error> {
        query(
            r#"
            INSERT INTO detection_events (id, camera_id, confidence, deterrent_fired, detected_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.camera_id)
        .bind(event.confidence)
        .bind(event.deterrent_fired)
        .bind(event.detected_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List detection events, newest first
    pub async fn list_detection_events(&self, limit: i64) -> Result<Vec<DetectionEvent>, sqlx::Error> {
        query_as::<_, DetectionEvent>(
            r#"
            SELECT id, camera_id, confidence, deterrent_fired, detected_at
            FROM detection_events
            ORDER BY detected_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Total detection event count
    pub async fn count_detection_events(&self) -> Result<i64, sqlx::Error> {
        query_scalar::<_, i64>("SELECT COUNT(*) FROM detection_events")
            .fetch_one(&self.pool)
            .await
    }

    /// Count of events for which the deterrent fired
    pub async fn count_deterrent_activations(&self) -> Result<i64, sqlx::Error> {
        query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM detection_events WHERE deterrent_fired = TRUE",
        )
        .fetch_one(&self.pool)
        .await
    }

    /// Timestamp of the most recent detection, if any
    pub async fn last_detection_at(&self) -> Result<Option<i64>, sqlx::Error> {
        query_scalar::<_, Option<i64>>("SELECT MAX(detected_at) FROM detection_events")
            .fetch_one(&self.pool)
            .await
    }

    // Deterrent state queries

    /// Load the deterrent state row
    pub async fn get_deterrent_state(&self) -> Result<Option<DeterrentState>, sqlx::Error> {
        query_as::<_, DeterrentState>(
            r#"
            SELECT id, mode, last_activated_at, activation_count, updated_at
            FROM deterrent_state
            WHERE id = 'default'
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert or replace the deterrent state row
    pub async fn save_deterrent_state(&self, state: &DeterrentState) -> Result<(), sqlx::Error> {
        query(
            r#"
            INSERT OR REPLACE INTO deterrent_state (id, mode, last_activated_at, activation_count, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&state.id)
        .bind(state.mode)
        .bind(state.last_activated_at)
        .bind(state.activation_count)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
