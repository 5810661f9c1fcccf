//! # Observability Infrastructure
//!
//! Structured logging for the compiler and CLI.

pub mod logging;

pub use logging::{init_logging, log_settings};
