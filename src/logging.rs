//! Logging configuration for the Deer Deterrent backend
//!
//! Structured logging setup with appropriate levels and formatting.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the application logging system
pub fn init_logging(default_level: &str) {
    let default_filter = format!(
        "deer_deterrent={default_level},tower_http=info,axum::rejection=trace"
    );

    // RUST_LOG takes precedence over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();

    tracing::info!("Logging system initialized");
}

/// Log application startup
pub fn log_startup() {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Deer Deterrent backend starting up"
    );
}

/// Log authentication event
pub fn log_authentication_event(event: &str, email: Option<&str>, success: bool) {
    if success {
        tracing::info!(
            event = %event,
            email = ?email,
            "Authentication successful"
        );
    } else {
        tracing::warn!(
            event = %event,
            email = ?email,
            "Authentication failed"
        );
    }
}

/// Log session creation
pub fn log_session_created(session_id: &str, expires_at: i64) {
    tracing::info!(
        session_id = %session_id,
        expires_at = %expires_at,
        "Session created"
    );
}

/// Log session revocation
pub fn log_session_revoked(session_id: &str) {
    tracing::info!(session_id = %session_id, "Session revoked");
}

/// Log expired session cleanup
pub fn log_sessions_pruned(removed: u64) {
    if removed > 0 {
        tracing::info!(removed = %removed, "Expired sessions pruned");
    } else {
        tracing::debug!("No expired sessions to prune");
    }
}

/// Log an ingested detection event
pub fn log_detection_event(camera_id: &str, confidence: f64, deterrent_fired: bool) {
    tracing::info!(
        camera_id = %camera_id,
        confidence = %confidence,
        deterrent_fired = %deterrent_fired,
        "Detection event recorded"
    );
}

/// Log deterrent mode change
pub fn log_deterrent_mode_change(mode: &str) {
    tracing::info!(mode = %mode, "Deterrent mode changed");
}
