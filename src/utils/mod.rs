//! Configuration and time utilities.

/// Environment-based configuration.
pub mod config;
/// Civil-timezone timestamp formatting.
pub mod time;
