//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem. Logs are
//! written to stderr so stdout stays reserved for compiled output.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for a compile pass
#[macro_export]
macro_rules! compile_span {
    ($operation:expr, $listeners:expr) => {
        tracing::info_span!(
            "compile_pass",
            operation = %$operation,
            listeners = $listeners
        )
    };
    ($operation:expr, $listeners:expr, $($field:tt)*) => {
        tracing::info_span!(
            "compile_pass",
            operation = %$operation,
            listeners = $listeners,
            $($field)*
        )
    };
}

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install the global subscriber.
///
/// Fails when a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let builder = fmt().with_env_filter(env_filter(config)).with_writer(std::io::stderr);

    let result = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

/// Log settings at startup
pub fn log_settings(settings: &crate::config::Settings) {
    tracing::debug!(
        log_level = %settings.observability.log_level,
        json_logging = settings.observability.json_logging,
        default_format = %settings.compiler.default_format,
        parallel = settings.compiler.parallel,
        isolate_listeners = settings.compiler.isolate_listeners,
        "routeplane settings"
    );
}
