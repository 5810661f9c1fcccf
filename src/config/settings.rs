//! # Configuration Settings
//!
//! Defines the settings structure for the routeplane compiler. Settings are
//! layered: built-in defaults, then an optional settings file, then
//! `ROUTEPLANE_*` environment variables (`__` separates nested keys, e.g.
//! `ROUTEPLANE_COMPILER__PARALLEL=true`).

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "ROUTEPLANE";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const OUTPUT_FORMATS: [&str; 2] = ["json", "yaml"];

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct Settings {
    /// Logging configuration
    #[validate(nested)]
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Compile pass behaviour
    #[validate(nested)]
    #[serde(default)]
    pub compiler: CompilerConfig,
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("observability.log_level", "info")?
            .set_default("observability.json_logging", false)?
            .set_default("compiler.default_format", "json")?
            .set_default("compiler.parallel", false)?
            .set_default("compiler.isolate_listeners", false)?;

        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        let level = self.observability.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config(format!(
                "Unknown log level '{}'; expected one of {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        let format = self.compiler.default_format.to_lowercase();
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(Error::config(format!(
                "Unsupported output format '{}'; use 'json' or 'yaml'",
                self.compiler.default_format
            )));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

/// Compile pass configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompilerConfig {
    /// Output format when the CLI is not told otherwise (json or yaml)
    #[validate(length(min = 1, message = "Output format cannot be empty"))]
    pub default_format: String,

    /// Compile listeners on parallel tasks
    pub parallel: bool,

    /// Skip listeners that fail to compile instead of aborting the pass
    pub isolate_listeners: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { default_format: "json".to_string(), parallel: false, isolate_listeners: false }
    }
}
