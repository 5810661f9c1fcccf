//! # Envoy v1 Configuration
//!
//! Compiles a [`RoutingModel`](crate::model::RoutingModel) into Envoy v1
//! listener records. The pieces, leaves first:
//!
//! - [`filter`]: HTTP filter records for the connection manager chain
//! - [`route`]: one route record per route group
//! - [`ordering`]: evaluation order of route groups
//! - [`listener`]: one full listener record
//! - [`compiler`]: all listeners of a model, sequentially or in parallel
//!
//! ```rust
//! use routeplane::envoy::ConfigCompiler;
//! use routeplane::model::{Listener, RouteGroup, RoutingModel};
//!
//! let model = RoutingModel {
//!     listeners: vec![Listener::new(8080)],
//!     groups: vec![RouteGroup::new("/api/", 10).with_mapping("api", 100)],
//!     ..Default::default()
//! };
//!
//! let config = ConfigCompiler::new().compile(&model)?;
//! assert_eq!(config.listeners[0].address, "tcp://0.0.0.0:8080");
//! # Ok::<(), routeplane::Error>(())
//! ```

pub mod compiler;
pub mod filter;
pub mod listener;
pub mod ordering;
pub mod route;

pub use compiler::{CompiledConfig, ConfigCompiler, ListenerOutcome};
pub use filter::FilterRecord;
pub use listener::{compile_listener, ListenerRecord, SslContext};
pub use ordering::order_groups;
pub use route::{render_route, MatchKind, RenderedRoute, RouteRecord, DEFAULT_TIMEOUT_MS};
