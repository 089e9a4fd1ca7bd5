//! Contains the ethutils CLI.

use crate::commands::{BlocksCommand, LocateCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use ethutils_cli::{LogArgs, LogConfig, MetricsArgs, cli_styles};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Subcommands for the CLI.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Commands {
    /// Fetches a range of blocks together with their transaction receipts.
    Blocks(BlocksCommand),
    /// Finds the first block at or after a point in time.
    Locate(LocateCommand),
}

/// The ethutils CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub(crate) struct Cli {
    /// Logging arguments.
    #[command(flatten)]
    pub(crate) logs: LogArgs,
    /// Prometheus metrics arguments.
    #[command(flatten)]
    pub(crate) metrics: MetricsArgs,
    /// The subcommand to run.
    #[command(subcommand)]
    pub(crate) subcommand: Commands,
}

impl Cli {
    /// Runs the CLI.
    pub(crate) fn run(self) -> Result<()> {
        LogConfig::from(self.logs).init_tracing_subscriber(None)?;

        let metrics = self.metrics;
        match self.subcommand {
            Commands::Blocks(blocks) => {
                Self::run_until_ctrl_c(&metrics, |cancellation| blocks.run(cancellation))
            }
            Commands::Locate(locate) => Self::run_until_ctrl_c(&metrics, |_| locate.run()),
        }
    }

    /// Runs the command on a new runtime. The first Ctrl-C fires the cancellation token handed to
    /// the command.
    fn run_until_ctrl_c<F, Fut>(metrics: &MetricsArgs, command: F) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let rt = Self::tokio_runtime()?;
        rt.block_on(async {
            // The exporter spawns its listener onto the current runtime.
            if metrics.init_metrics()? {
                ethutils_fetch::Metrics::init();
            }

            let cancellation = CancellationToken::new();
            let signal = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!(target: "ethutils", "Received Ctrl-C, cancelling");
                    signal.cancel();
                }
            });

            command(cancellation).await
        })
    }

    /// Creates a new default tokio multi-thread [Runtime](tokio::runtime::Runtime) with all
    /// features enabled.
    fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocks_command() {
        let cli = Cli::parse_from([
            "ethutils",
            "-vv",
            "blocks",
            "--rpc",
            "http://localhost:8545",
            "--block",
            "12600000",
            "--len",
            "100",
            "--concurrency",
            "10",
        ]);
        assert_eq!(cli.logs.level, 2);
        let Commands::Blocks(blocks) = cli.subcommand else { panic!("expected blocks command") };
        assert_eq!(blocks.block, Some(12_600_000));
        assert_eq!(blocks.concurrency.get(), 10);
        assert_eq!(blocks.length, Some(ethutils_fetch::RangeLength::Blocks(100)));
    }

    #[test]
    fn test_parse_locate_command_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "ethutils",
            "locate",
            "--rpc",
            "http://localhost:8545",
            "--timestamp",
            "1619546404",
            "--metrics.enabled",
            "-q",
        ]);
        assert!(cli.metrics.enabled);
        assert!(cli.logs.stdout_quiet);
        assert!(matches!(cli.subcommand, Commands::Locate(_)));
    }

    #[test]
    fn test_block_and_date_conflict() {
        let result = Cli::try_parse_from([
            "ethutils",
            "blocks",
            "--rpc",
            "http://localhost:8545",
            "--block",
            "1",
            "--date",
            "2021-04-27",
        ]);
        assert!(result.is_err());
    }
}
