//! Detection API Endpoints
//!
//! Ingestion from the on-site detector (API-key authenticated) and
//! dashboard queries (session authenticated).

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::{AppState, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::models::DetectionEvent;
use crate::services::DetectionSummary;

/// Header the detector authenticates with
pub const API_KEY_HEADER: &str = "x-api-key";

/// Create detection API routes
pub fn create_detection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_detections).post(ingest_detection))
        .route("/summary", get(detection_summary))
}

/// Event payload from the detector
#[derive(Debug, Deserialize)]
struct IngestRequest {
    camera_id: String,
    confidence: f64,
}

/// Query parameters for event listings
#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<i64>,
}

/// Record a sighting reported by the detector process
async fn ingest_detection(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> AppResult<impl IntoResponse> {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if key != app.config.detector_api_key {
        return Err(AppError::Unauthorized);
    }

    let event = app
        .detections
        .record_detection(&request.camera_id, request.confidence, Utc::now().timestamp())
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Recent events for the dashboard, newest first
async fn list_detections(
    State(app): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<DetectionEvent>>> {
    let events = app.detections.recent_events(params.limit).await?;
    Ok(Json(events))
}

/// Aggregate counters for the dashboard header
async fn detection_summary(
    State(app): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<DetectionSummary>> {
    let summary = app.detections.summary().await?;
    Ok(Json(summary))
}
