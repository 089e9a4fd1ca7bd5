#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metachris/ethutils-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod clap;
pub use clap::cli_styles;

pub mod log;
pub use log::{LogArgs, LogConfig};

mod tracing;
pub use tracing::{LogFormat, LogInitError, init_test_tracing};

mod prometheus;
pub use prometheus::init_prometheus_server;

pub mod metrics_args;
pub use metrics_args::MetricsArgs;
