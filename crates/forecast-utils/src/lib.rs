//! Shared utilities for the forecast workspace
//!
//! Logging setup and the environment-driven log configuration used by the
//! command-line front end.

pub mod config;
pub mod logging;

pub use config::{LogConfig, LogFormat};
pub use logging::init_tracing;
