//! Locate Subcommand

use crate::flags::{LocatorArgs, RpcArgs, TimeArgs};
use anyhow::bail;
use clap::Parser;
use ethutils_fetch::{BlockHeightLocator, calendar::format_utc};
use std::sync::Arc;

/// The `locate` Subcommand
///
/// Prints the first block whose timestamp is at or after the given time.
///
/// # Usage
///
/// ```sh
/// ethutils locate --rpc <URL> (--timestamp <T> | --date <DATE> [--hour <H>] [--min <M>])
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Finds the first block at or after a point in time")]
pub(crate) struct LocateCommand {
    /// RPC arguments.
    #[command(flatten)]
    pub(crate) rpc: RpcArgs,
    /// Unix timestamp to look up.
    #[arg(long, conflicts_with = "date")]
    pub(crate) timestamp: Option<u64>,
    /// Date arguments.
    #[command(flatten)]
    pub(crate) time: TimeArgs,
    /// Locator tuning.
    #[command(flatten)]
    pub(crate) locator: LocatorArgs,
}

impl LocateCommand {
    /// Runs the subcommand.
    pub(crate) async fn run(self) -> anyhow::Result<()> {
        let Some(target) = self.timestamp.or(self.time.timestamp()?) else {
            bail!("Either --timestamp or --date is required");
        };

        let locator = BlockHeightLocator::new(Arc::new(self.rpc.gateway()), self.locator.config());
        let header = locator.locate(target).await?;
        debug!(target: "ethutils", %header, "Located block");

        println!("{}  {}  {}", header.number, format_utc(header.timestamp), header.hash);
        Ok(())
    }
}
