//! Deer Deterrent backend entry point
//!
//! Serves the Google-sign-in-gated API behind the dashboard frontend and
//! accepts detection events from the on-site detector.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpListener;

use deer_deterrent::api::{self, AppState};
use deer_deterrent::config::Config;
use deer_deterrent::database::DatabaseManager;
use deer_deterrent::logging;
use deer_deterrent::services::{DetectionService, OauthService, SessionService};

/// How often expired sessions are swept out of the database
const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    logging::init_logging(&config.log_level);
    logging::log_startup();
    config.log_config();
    config.ensure_data_dir()?;

    // Relative SQLite files live under the data directory
    let database_url = config
        .database_path()
        .map(|path| format!("sqlite:{}", path.display()))
        .unwrap_or_else(|| config.database_url.clone());

    let db = DatabaseManager::new(&database_url).await?;
    db.migrate().await?;
    db.test_connection().await?;

    let sessions = Arc::new(SessionService::new(
        db.clone(),
        &config.session_secret,
        config.session_ttl_seconds(),
    ));
    let oauth = Arc::new(OauthService::new(&config));
    let detections = Arc::new(DetectionService::new(db));

    spawn_session_pruner(sessions.clone());

    let bind_address = config.bind_address();
    let state = AppState {
        config: Arc::new(config),
        sessions,
        oauth,
        detections,
    };
    let app = api::create_router(state)?;

    tracing::info!(address = %bind_address, "Listening");
    let listener = TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically delete expired session rows
fn spawn_session_pruner(sessions: Arc<SessionService>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = sessions.prune_expired(Utc::now().timestamp()).await {
                tracing::warn!(error = %e, "Session pruning failed");
            }
        }
    });
}
