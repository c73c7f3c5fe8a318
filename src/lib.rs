//! Deer Deterrent backend library
//!
//! A Google-sign-in-gated API for the deer deterrent dashboard: a single
//! allow-listed account, 30-day database-backed sessions, detection-event
//! ingestion from the on-site detector, and deterrent control.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
