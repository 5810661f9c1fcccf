//! Listener records
//!
//! Assembles one listener's v1 configuration: bind address, merged SSL
//! context, and a single `http_connection_manager` read filter that embeds the
//! virtual host route table and the HTTP filter chain.

use serde::Serialize;

use crate::envoy::filter::{build_filter_records, FilterRecord};
use crate::envoy::ordering::order_groups;
use crate::envoy::route::{render_route, RenderedRoute};
use crate::errors::{Error, Result};
use crate::model::{Listener, RoutingModel, TlsContext};

/// Access log line written by every listener
pub const ACCESS_LOG_FORMAT: &str = "ACCESS [%START_TIME%] \"%REQ(:METHOD)% %REQ(X-ENVOY-ORIGINAL-PATH?:PATH)% %PROTOCOL%\" %RESPONSE_CODE% %RESPONSE_FLAGS% %BYTES_RECEIVED% %BYTES_SENT% %DURATION% %RESP(X-ENVOY-UPSTREAM-SERVICE-TIME)% \"%REQ(X-FORWARDED-FOR)%\" \"%REQ(USER-AGENT)%\" \"%REQ(X-REQUEST-ID)%\" \"%REQ(:AUTHORITY)%\" \"%UPSTREAM_HOST%\"\n";

/// Access log sink (stdout of the data plane process)
pub const ACCESS_LOG_PATH: &str = "/dev/fd/1";

pub const HTTP_CONNECTION_MANAGER: &str = "http_connection_manager";
pub const STAT_PREFIX: &str = "ingress_http";
pub const VIRTUAL_HOST_NAME: &str = "backend";
pub const TRACING_OPERATION_NAME: &str = "egress";

/// Merged TLS settings for a listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SslContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_chain_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn_protocols: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cacert_chain_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_client_certificate: Option<bool>,
}

impl SslContext {
    /// Merge contexts in order, later contexts overwriting earlier ones per
    /// field. Returns `None` when no context carries a recognized field.
    pub fn merge(contexts: &[TlsContext]) -> Option<Self> {
        let mut merged = SslContext::default();
        let mut found_some = false;

        for ctx in contexts {
            found_some |= overwrite(&mut merged.cert_chain_file, &ctx.cert_chain_file);
            found_some |= overwrite(&mut merged.private_key_file, &ctx.private_key_file);
            found_some |= overwrite(&mut merged.alpn_protocols, &ctx.alpn_protocols);
            found_some |= overwrite(&mut merged.cacert_chain_file, &ctx.cacert_chain_file);
            found_some |= overwrite(&mut merged.require_client_certificate, &ctx.cert_required);
        }

        found_some.then_some(merged)
    }
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v.clone());
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<RenderedRoute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_ssl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteConfig {
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLog {
    pub format: String,
    pub path: String,
}

impl Default for AccessLog {
    fn default() -> Self {
        Self { format: ACCESS_LOG_FORMAT.to_string(), path: ACCESS_LOG_PATH.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracingOperation {
    pub operation_name: String,
    pub request_headers_for_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracingConfig {
    pub generate_request_id: bool,
    pub tracing: TracingOperation,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            generate_request_id: true,
            tracing: TracingOperation {
                operation_name: TRACING_OPERATION_NAME.to_string(),
                request_headers_for_tags: Vec::new(),
            },
        }
    }
}

/// Configuration of the wrapping HTTP connection manager filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpConnectionManagerConfig {
    pub codec_type: String,
    pub stat_prefix: String,
    pub access_log: Vec<AccessLog>,
    pub route_config: RouteConfig,
    pub filters: Vec<FilterRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_remote_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing: Option<TracingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkFilter {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub name: String,
    pub config: HttpConnectionManagerConfig,
}

/// Compiled v1 listener
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListenerRecord {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_proxy_proto: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_context: Option<SslContext>,
    pub filters: Vec<NetworkFilter>,
}

impl ListenerRecord {
    /// The connection manager config, which every compiled listener carries
    pub fn http_connection_manager(&self) -> Option<&HttpConnectionManagerConfig> {
        self.filters.iter().find(|f| f.name == HTTP_CONNECTION_MANAGER).map(|f| &f.config)
    }

    /// Routes of the single virtual host
    pub fn routes(&self) -> &[RenderedRoute] {
        self.http_connection_manager()
            .and_then(|hcm| hcm.route_config.virtual_hosts.first())
            .map(|vh| vh.routes.as_slice())
            .unwrap_or(&[])
    }
}

/// Render the ordered route table for the groups of a model
pub fn build_routes(model: &RoutingModel) -> Result<Vec<RenderedRoute>> {
    order_groups(&model.groups).into_iter().map(render_route).collect()
}

/// Compile one listener against the shared routing model.
///
/// `index` is the listener's position in the model and is only used to
/// identify it in errors and logs.
pub fn compile_listener(model: &RoutingModel, listener: &Listener, index: usize) -> Result<ListenerRecord> {
    let port = listener
        .service_port
        .ok_or_else(|| Error::missing_field(listener.describe(index), "service_port"))?;

    let routes = build_routes(model)?;
    let filters = build_filter_records(&model.filters);

    tracing::debug!(
        port,
        routes = routes.len(),
        filters = filters.len(),
        tls = !listener.tls_contexts.is_empty(),
        "Compiling listener"
    );

    let virtual_host = VirtualHost {
        name: VIRTUAL_HOST_NAME.to_string(),
        domains: vec!["*".to_string()],
        routes,
        require_ssl: listener.require_tls.unwrap_or(false).then(|| "all".to_string()),
    };

    let hcm = HttpConnectionManagerConfig {
        codec_type: "auto".to_string(),
        stat_prefix: STAT_PREFIX.to_string(),
        access_log: vec![AccessLog::default()],
        route_config: RouteConfig { virtual_hosts: vec![virtual_host] },
        filters,
        use_remote_address: model.ambassador.trusts_remote_address().then_some(true),
        tracing: listener.tracing.then(TracingConfig::default),
    };

    Ok(ListenerRecord {
        address: format!("tcp://0.0.0.0:{}", port),
        use_proxy_proto: listener.use_proxy_proto.unwrap_or(false).then_some(true),
        ssl_context: SslContext::merge(&listener.tls_contexts),
        filters: vec![NetworkFilter {
            filter_type: "read".to_string(),
            name: HTTP_CONNECTION_MANAGER.to_string(),
            config: hcm,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Filter, RouteGroup};
    use serde_json::json;

    fn tls(name: &str) -> TlsContext {
        TlsContext { name: name.to_string(), ..Default::default() }
    }

    fn model_with_listener(listener: Listener) -> RoutingModel {
        RoutingModel {
            listeners: vec![listener],
            groups: vec![RouteGroup::new("/", 0).with_mapping("default", 100)],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_listener_shape() {
        let model = model_with_listener(Listener::new(8080));
        let record = compile_listener(&model, &model.listeners[0], 0).expect("compile");

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "address": "tcp://0.0.0.0:8080",
                "filters": [{
                    "type": "read",
                    "name": "http_connection_manager",
                    "config": {
                        "codec_type": "auto",
                        "stat_prefix": "ingress_http",
                        "access_log": [{ "format": ACCESS_LOG_FORMAT, "path": "/dev/fd/1" }],
                        "route_config": {
                            "virtual_hosts": [{
                                "name": "backend",
                                "domains": ["*"],
                                "routes": [{
                                    "timeout_ms": 3000,
                                    "prefix": "/",
                                    "weighted_clusters": {
                                        "clusters": [{ "name": "default", "weight": 100 }]
                                    }
                                }]
                            }]
                        },
                        "filters": []
                    }
                }]
            })
        );
    }

    #[test]
    fn test_missing_service_port_is_fatal() {
        let model = model_with_listener(Listener::default());
        let err = compile_listener(&model, &model.listeners[0], 3).expect_err("no port");
        assert!(matches!(err, Error::MissingField { field: "service_port", .. }));
        assert!(err.to_string().contains("listener #3"));
    }

    #[test]
    fn test_optional_listener_flags() {
        let mut listener = Listener::new(443);
        listener.use_proxy_proto = Some(true);
        listener.require_tls = Some(true);
        listener.tracing = true;
        let mut model = model_with_listener(listener);
        model.ambassador.use_remote_address = Some(true);

        let record = compile_listener(&model, &model.listeners[0], 0).unwrap();
        assert_eq!(record.use_proxy_proto, Some(true));

        let hcm = record.http_connection_manager().expect("hcm");
        assert_eq!(hcm.use_remote_address, Some(true));
        assert_eq!(hcm.route_config.virtual_hosts[0].require_ssl.as_deref(), Some("all"));

        let value = serde_json::to_value(hcm).unwrap();
        assert_eq!(
            value["tracing"],
            json!({
                "generate_request_id": true,
                "tracing": { "operation_name": "egress", "request_headers_for_tags": [] }
            })
        );
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let mut listener = Listener::new(80);
        listener.use_proxy_proto = Some(false);
        listener.require_tls = Some(false);
        let mut model = model_with_listener(listener);
        model.ambassador.use_remote_address = Some(false);

        let value = serde_json::to_value(compile_listener(&model, &model.listeners[0], 0).unwrap()).unwrap();
        assert!(value.get("use_proxy_proto").is_none());
        let config = &value["filters"][0]["config"];
        assert!(config.get("use_remote_address").is_none());
        assert!(config.get("tracing").is_none());
        assert!(config["route_config"]["virtual_hosts"][0].get("require_ssl").is_none());
    }

    #[test]
    fn test_ssl_contexts_merge_last_write_wins() {
        let first = TlsContext {
            cert_chain_file: Some("/certs/a.crt".into()),
            private_key_file: Some("/certs/a.key".into()),
            ..tls("server")
        };
        let second = TlsContext {
            cert_chain_file: Some("/certs/b.crt".into()),
            alpn_protocols: Some("h2,http/1.1".into()),
            cacert_chain_file: Some("/certs/ca.crt".into()),
            cert_required: Some(true),
            ..tls("client")
        };

        let merged = SslContext::merge(&[first, second]).expect("recognized fields");
        assert_eq!(
            merged,
            SslContext {
                cert_chain_file: Some("/certs/b.crt".into()),
                private_key_file: Some("/certs/a.key".into()),
                alpn_protocols: Some("h2,http/1.1".into()),
                cacert_chain_file: Some("/certs/ca.crt".into()),
                require_client_certificate: Some(true),
            }
        );
    }

    #[test]
    fn test_ssl_context_omitted_without_recognized_fields() {
        let listener = Listener::new(443).with_tls_context(tls("empty-a")).with_tls_context(tls("empty-b"));
        let model = model_with_listener(listener);
        let value = serde_json::to_value(compile_listener(&model, &model.listeners[0], 0).unwrap()).unwrap();
        assert!(value.get("ssl_context").is_none());
    }

    #[test]
    fn test_cert_required_alone_produces_descriptor() {
        let ctx = TlsContext { cert_required: Some(false), ..tls("mtls") };
        let merged = SslContext::merge(&[ctx]).expect("descriptor");
        assert_eq!(serde_json::to_value(merged).unwrap(), json!({"require_client_certificate": false}));
    }

    #[test]
    fn test_filter_chain_is_embedded() {
        let mut model = model_with_listener(Listener::new(80));
        model.filters = vec![
            Filter::new("extauth", json!({"cluster": "auth"})).with_type("decoder"),
            Filter::new("cors", json!({})),
        ];
        let record = compile_listener(&model, &model.listeners[0], 0).unwrap();
        let value = serde_json::to_value(record.http_connection_manager().unwrap()).unwrap();
        assert_eq!(
            value["filters"],
            json!([
                {"name": "extauth", "config": {"cluster": "auth"}, "type": "decoder"},
                {"name": "cors", "config": {}}
            ])
        );
    }

    #[test]
    fn test_routes_follow_group_order() {
        let mut model = model_with_listener(Listener::new(80));
        model.groups = vec![
            RouteGroup::new("/one", 1).with_mapping("c1", 100),
            RouteGroup::new("/A", 3).with_mapping("c3a", 100),
            RouteGroup::new("/B", 3).with_mapping("c3b", 100),
            RouteGroup::new("/two", 2).with_mapping("c2", 100),
        ];
        let record = compile_listener(&model, &model.listeners[0], 0).unwrap();
        let prefixes: Vec<_> = record.routes().iter().map(|r| r["prefix"].clone()).collect();
        assert_eq!(prefixes, vec![json!("/B"), json!("/A"), json!("/two"), json!("/one")]);
    }
}
