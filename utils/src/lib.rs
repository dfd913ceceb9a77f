//! Shared utilities for the Guardian governance engine.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, format_relative};
