//! Database layer
//!
//! SQLite persistence for sessions, detection events, and deterrent state.

pub mod connection;

pub use connection::DatabaseManager;
