//! Detection Event Model
//!
//! A single deer sighting reported by the on-site detector, with the
//! deterrent outcome recorded alongside it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A deer detection reported by a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DetectionEvent {
    /// Unique identifier for the event (UUIDv4)
    pub id: String,

    /// Identifier of the reporting camera
    pub camera_id: String,

    /// Detector confidence in the range 0.0 to 1.0
    pub confidence: f64,

    /// Whether the deterrent was triggered for this sighting
    pub deterrent_fired: bool,

    /// Detection timestamp (Unix seconds, UTC)
    pub detected_at: i64,
}

impl DetectionEvent {
    /// Create a validated detection event
    pub fn new(
        camera_id: &str,
        confidence: f64,
        detected_at: i64,
    ) -> Result<Self, DetectionEventError> {
        Self::validate_camera_id(camera_id)?;
        Self::validate_confidence(confidence)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            camera_id: camera_id.to_string(),
            confidence,
            deterrent_fired: false,
            detected_at,
        })
    }

    fn validate_camera_id(camera_id: &str) -> Result<(), DetectionEventError> {
        if camera_id.trim().is_empty() {
            return Err(DetectionEventError::EmptyCameraId);
        }
        Ok(())
    }

    fn validate_confidence(confidence: f64) -> Result<(), DetectionEventError> {
        if !(0.0..=1.0).contains(&confidence) || confidence.is_nan() {
            return Err(DetectionEventError::InvalidConfidence(confidence));
        }
        Ok(())
    }

    /// Mark the deterrent as having fired for this event
    pub fn mark_deterrent_fired(&mut self) {
        self.deterrent_fired = true;
    }
}

/// Detection event validation errors
#[derive(Debug, thiserror::Error)]
pub enum DetectionEventError {
    #[error("Camera id must not be empty")]
    EmptyCameraId,

    #[error("Confidence {0} is invalid (must be 0.0-1.0)")]
    InvalidConfidence(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_event_creation() {
        let event = DetectionEvent::new("backyard-cam", 0.93, 1_700_000_000).unwrap();
        assert_eq!(event.camera_id, "backyard-cam");
        assert!((event.confidence - 0.93).abs() < f64::EPSILON);
        assert!(!event.deterrent_fired);
        assert_eq!(event.detected_at, 1_700_000_000);
    }

    #[test]
    fn test_empty_camera_id_rejected() {
        assert!(DetectionEvent::new("", 0.5, 0).is_err());
        assert!(DetectionEvent::new("   ", 0.5, 0).is_err());
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(DetectionEvent::new("cam", -0.01, 0).is_err());
        assert!(DetectionEvent::new("cam", 1.01, 0).is_err());
        assert!(DetectionEvent::new("cam", f64::NAN, 0).is_err());

        assert!(DetectionEvent::new("cam", 0.0, 0).is_ok());
        assert!(DetectionEvent::new("cam", 1.0, 0).is_ok());
    }

    #[test]
    fn test_mark_deterrent_fired() {
        let mut event = DetectionEvent::new("cam", 0.8, 0).unwrap();
        event.mark_deterrent_fired();
        assert!(event.deterrent_fired);
    }
}
