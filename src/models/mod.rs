//! Models module for the Deer Deterrent backend
//!
//! Contains all data models and their validation logic.

pub mod detection_event;
pub mod deterrent;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use detection_event::DetectionEvent;
pub use deterrent::{DeterrentMode, DeterrentState};
pub use session::Session;
pub use user::GoogleUser;
