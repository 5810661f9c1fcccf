//! Listeners and their TLS contexts

use serde::{Deserialize, Serialize};

/// Named bag of TLS settings attached to a listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cert_chain_file: Option<String>,
    #[serde(default)]
    pub private_key_file: Option<String>,
    #[serde(default)]
    pub alpn_protocols: Option<String>,
    #[serde(default)]
    pub cacert_chain_file: Option<String>,
    #[serde(default)]
    pub cert_required: Option<bool>,
}

/// A service port exposed by the data plane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    #[serde(default)]
    pub service_port: Option<u16>,
    #[serde(default)]
    pub use_proxy_proto: Option<bool>,
    /// Contexts merged in order; later contexts win per field
    #[serde(default)]
    pub tls_contexts: Vec<TlsContext>,
    #[serde(default)]
    pub require_tls: Option<bool>,
    #[serde(default)]
    pub tracing: bool,
}

impl Listener {
    pub fn new(service_port: u16) -> Self {
        Self { service_port: Some(service_port), ..Default::default() }
    }

    pub fn with_tls_context(mut self, context: TlsContext) -> Self {
        self.tls_contexts.push(context);
        self
    }

    /// Identity used in logs and errors, stable even when the port is missing
    pub fn describe(&self, index: usize) -> String {
        match self.service_port {
            Some(port) => format!("listener #{} (port {})", index, port),
            None => format!("listener #{}", index),
        }
    }
}
