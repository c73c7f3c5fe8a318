//! Deterrent State Model
//!
//! Operating mode and activation history of the sprinkler deterrent.
//! A single row (id = "default") tracks the whole installation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Deterrent operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum DeterrentMode {
    #[serde(rename = "armed")]
    #[sqlx(rename = "armed")]
    Armed,
    #[serde(rename = "disarmed")]
    #[sqlx(rename = "disarmed")]
    Disarmed,
}

impl Default for DeterrentMode {
    fn default() -> Self {
        DeterrentMode::Disarmed
    }
}

impl std::fmt::Display for DeterrentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeterrentMode::Armed => write!(f, "armed"),
            DeterrentMode::Disarmed => write!(f, "disarmed"),
        }
    }
}

/// Persisted deterrent state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeterrentState {
    /// Row identifier, always "default"
    pub id: String,

    /// Current operating mode
    pub mode: DeterrentMode,

    /// Timestamp of the most recent activation (Unix seconds, UTC)
    pub last_activated_at: Option<i64>,

    /// Lifetime activation count
    pub activation_count: i64,

    /// Last update timestamp (Unix seconds, UTC)
    pub updated_at: i64,
}

impl DeterrentState {
    /// Create the initial state, disarmed with no activations
    pub fn new(now: i64) -> Self {
        Self {
            id: "default".to_string(),
            mode: DeterrentMode::default(),
            last_activated_at: None,
            activation_count: 0,
            updated_at: now,
        }
    }

    /// Whether a detection should trigger the deterrent
    pub fn is_armed(&self) -> bool {
        self.mode == DeterrentMode::Armed
    }

    /// Switch the operating mode
    pub fn set_mode(&mut self, mode: DeterrentMode, now: i64) {
        if mode != self.mode {
            self.mode = mode;
            self.updated_at = now;
        }
    }

    /// Record a deterrent activation
    pub fn record_activation(&mut self, now: i64) {
        self.last_activated_at = Some(now);
        self.activation_count += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DeterrentState::new(100);
        assert_eq!(state.id, "default");
        assert_eq!(state.mode, DeterrentMode::Disarmed);
        assert!(!state.is_armed());
        assert_eq!(state.activation_count, 0);
        assert!(state.last_activated_at.is_none());
    }

    #[test]
    fn test_mode_transitions() {
        let mut state = DeterrentState::new(100);

        state.set_mode(DeterrentMode::Armed, 200);
        assert!(state.is_armed());
        assert_eq!(state.updated_at, 200);

        // Setting the same mode does not touch the timestamp
        state.set_mode(DeterrentMode::Armed, 300);
        assert_eq!(state.updated_at, 200);

        state.set_mode(DeterrentMode::Disarmed, 400);
        assert!(!state.is_armed());
        assert_eq!(state.updated_at, 400);
    }

    #[test]
    fn test_record_activation() {
        let mut state = DeterrentState::new(100);

        state.record_activation(500);
        state.record_activation(600);

        assert_eq!(state.activation_count, 2);
        assert_eq!(state.last_activated_at, Some(600));
        assert_eq!(state.updated_at, 600);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(DeterrentMode::Armed.to_string(), "armed");
        assert_eq!(DeterrentMode::Disarmed.to_string(), "disarmed");
    }

    #[test]
    fn test_mode_serde_round_trip() {
        let json = serde_json::to_string(&DeterrentMode::Armed).unwrap();
        assert_eq!(json, "\"armed\"");
        let mode: DeterrentMode = serde_json::from_str("\"disarmed\"").unwrap();
        assert_eq!(mode, DeterrentMode::Disarmed);
    }
}
