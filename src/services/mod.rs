//! Services module for the Deer Deterrent backend
//!
//! Contains all business logic and service implementations.

pub mod detection;
pub mod oauth;
pub mod session;

// Re-export commonly used services
pub use detection::{DetectionService, DetectionSummary};
pub use oauth::OauthService;
pub use session::SessionService;
