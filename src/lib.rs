//! # Routeplane
//!
//! Routeplane compiles a normalized routing model (listeners, route groups,
//! mappings, clusters, TLS contexts and HTTP filters) into the Envoy v1
//! listener configuration consumed by the data plane.
//!
//! ## Architecture
//!
//! ```text
//! RoutingModel → ConfigCompiler → ListenerCompiler → ListenerRecord
//!                                      ↓
//!                    GroupOrderer → RouteRecordBuilder*, FilterRecordBuilder*
//! ```
//!
//! Compilation is a pure, synchronous transformation over an immutable model
//! snapshot. Listeners only read shared state, so they can be compiled in
//! parallel; see [`envoy::ConfigCompiler::compile_parallel`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use routeplane::{envoy::ConfigCompiler, model::RoutingModel, Result};
//!
//! fn main() -> Result<()> {
//!     let model = RoutingModel::from_path(std::path::Path::new("model.yaml"))?;
//!     let config = ConfigCompiler::new().compile(&model)?;
//!     println!("{}", config.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod envoy;
pub mod errors;
pub mod model;
pub mod observability;

// Re-export commonly used types and traits
pub use crate::config::Settings;
pub use crate::envoy::{CompiledConfig, ConfigCompiler};
pub use crate::errors::{Error, Result};
pub use crate::model::RoutingModel;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
