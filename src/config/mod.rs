//! # Configuration Management
//!
//! Settings for logging and the compile pass. The routing model itself is not
//! configuration; see [`crate::model`].

pub mod settings;

pub use settings::{CompilerConfig, ObservabilityConfig, Settings, ENV_PREFIX};
