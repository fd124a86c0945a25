//! Infrastructure layer module
//!
//! - Configuration management (figment, serde_yaml)
//! - Logging infrastructure (tracing, tracing-subscriber, tracing-appender)

pub mod config;
pub mod logging;
