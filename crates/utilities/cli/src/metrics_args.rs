//! Prometheus metrics CLI args.

use crate::init_prometheus_server;
use clap::Args;
use metrics_exporter_prometheus::BuildError;
use std::net::IpAddr;

/// The metric configuration available in CLI.
#[derive(Debug, Clone, Args)]
pub struct MetricsArgs {
    /// Controls whether prometheus metrics are enabled.
    /// Disabled by default.
    #[arg(
        long = "metrics.enabled",
        global = true,
        default_value_t = false,
        env = "ETHUTILS_METRICS_ENABLED"
    )]
    pub enabled: bool,
    /// The port to serve prometheus metrics on.
    #[arg(
        long = "metrics.port",
        global = true,
        default_value = "9090",
        env = "ETHUTILS_METRICS_PORT"
    )]
    pub port: u16,
    /// The ip address to serve prometheus metrics on.
    #[arg(
        long = "metrics.addr",
        global = true,
        default_value = "0.0.0.0",
        env = "ETHUTILS_METRICS_ADDR"
    )]
    pub addr: IpAddr,
}

impl MetricsArgs {
    /// Starts the Prometheus exporter if metrics are enabled.
    ///
    /// Returns `true` if a recorder was installed.
    pub fn init_metrics(&self) -> Result<bool, BuildError> {
        if !self.enabled {
            return Ok(false);
        }
        init_prometheus_server(self.addr, self.port)?;
        Ok(true)
    }
}
