//! Utilities for spinning up a prometheus metrics server.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::{IpAddr, SocketAddr};
use tracing::info;

/// Installs the global Prometheus recorder and serves it over HTTP on `addr:port`.
///
/// Must be called from within a tokio runtime.
pub fn init_prometheus_server(addr: IpAddr, port: u16) -> Result<SocketAddr, BuildError> {
    let prometheus_addr = SocketAddr::from((addr, port));
    PrometheusBuilder::new().with_http_listener(prometheus_addr).install()?;
    info!(target: "prometheus", "Serving metrics at: http://{prometheus_addr}");
    Ok(prometheus_addr)
}
