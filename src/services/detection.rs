//! Detection Service
//!
//! Business logic for detection-event ingestion, dashboard queries, and
//! deterrent arming. Ingestion is where the deterrent decision happens:
//! an armed installation fires on every reported sighting.

use serde::{Deserialize, Serialize};

use crate::database::DatabaseManager;
use crate::error::AppResult;
use crate::logging;
use crate::models::{DetectionEvent, DeterrentMode, DeterrentState};

/// Default and maximum page sizes for event listings
pub const DEFAULT_EVENT_LIMIT: i64 = 50;
pub const MAX_EVENT_LIMIT: i64 = 500;

/// Dashboard summary counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total_events: i64,
    pub deterrent_activations: i64,
    pub last_detection_at: Option<i64>,
}

/// Detection and deterrent service
#[derive(Debug, Clone)]
pub struct DetectionService {
    db: DatabaseManager,
}

impl DetectionService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Record a sighting reported by the detector
    ///
    /// When the deterrent is armed the event is stored with
    /// `deterrent_fired` set and the activation counters are updated.
    pub async fn record_detection(
        &self,
        camera_id: &str,
        confidence: f64,
        now: i64,
    ) -> AppResult<DetectionEvent> {
        let mut event = DetectionEvent::new(camera_id, confidence, now)?;

        let mut state = self.load_or_init_state(now).await?;
        if state.is_armed() {
            event.mark_deterrent_fired();
            state.record_activation(now);
            self.db.save_deterrent_state(&state).await?;
        }

        self.db.insert_detection_event(&event).await?;
        logging::log_detection_event(&event.camera_id, event.confidence, event.deterrent_fired);

        Ok(event)
    }

    /// List recent events, newest first; the limit is clamped to 1..=500
    pub async fn recent_events(&self, limit: Option<i64>) -> AppResult<Vec<DetectionEvent>> {
        let limit = limit.unwrap_or(DEFAULT_EVENT_LIMIT).clamp(1, MAX_EVENT_LIMIT);
        Ok(self.db.list_detection_events(limit).await?)
    }

    /// Dashboard summary counters
    pub async fn summary(&self) -> AppResult<DetectionSummary> {
        Ok(DetectionSummary {
            total_events: self.db.count_detection_events().await?,
            deterrent_activations: self.db.count_deterrent_activations().await?,
            last_detection_at: self.db.last_detection_at().await?,
        })
    }

    /// Current deterrent state, initialized disarmed on first access
    pub async fn deterrent_state(&self, now: i64) -> AppResult<DeterrentState> {
        self.load_or_init_state(now).await
    }

    /// Arm or disarm the deterrent
    pub async fn set_mode(&self, mode: DeterrentMode, now: i64) -> AppResult<DeterrentState> {
        let mut state = self.load_or_init_state(now).await?;
        if mode != state.mode {
            state.set_mode(mode, now);
            self.db.save_deterrent_state(&state).await?;
            logging::log_deterrent_mode_change(&mode.to_string());
        }
        Ok(state)
    }

    async fn load_or_init_state(&self, now: i64) -> AppResult<DeterrentState> {
        match self.db.get_deterrent_state().await? {
            Some(state) => Ok(state),
            None => {
                let state = DeterrentState::new(now);
                self.db.save_deterrent_state(&state).await?;
                Ok(state)
            }
        }
    }
}
