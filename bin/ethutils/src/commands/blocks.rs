//! Blocks Subcommand

use crate::{
    display::{BlockLine, Throughput},
    flags::{LocatorArgs, RpcArgs, TimeArgs},
};
use anyhow::bail;
use clap::Parser;
use ethutils_fetch::{
    BlockHeightLocator, BlockRangeFetcher, FetcherConfig, RangeLength, RangeStart,
    find_block_range,
};
use std::{num::NonZeroUsize, sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;

/// The `blocks` Subcommand
///
/// Resolves a block range from a starting block or date and a length, then fetches every block in
/// it together with its transaction receipts.
///
/// # Usage
///
/// ```sh
/// ethutils blocks --rpc <URL> (--block <N> | --date <DATE> [--hour <H>] [--min <M>]) [--len <L>]
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Fetches a range of blocks together with their transaction receipts")]
pub(crate) struct BlocksCommand {
    /// RPC arguments.
    #[command(flatten)]
    pub(crate) rpc: RpcArgs,
    /// Height of the first block.
    #[arg(long, conflicts_with = "date")]
    pub(crate) block: Option<u64>,
    /// Start time arguments.
    #[command(flatten)]
    pub(crate) time: TimeArgs,
    /// Number of blocks (40), a timespan (30s, 5m, 2h, 1d), or "." for up to the latest block.
    /// Defaults to a single block.
    #[arg(long = "len")]
    pub(crate) length: Option<RangeLength>,
    /// Number of blocks fetched concurrently.
    #[arg(long, default_value = "5", env = "ETHUTILS_CONCURRENCY")]
    pub(crate) concurrency: NonZeroUsize,
    /// Capacity of the work and result queues.
    #[arg(long = "queue", default_value_t = FetcherConfig::DEFAULT_QUEUE_CAPACITY, env = "ETHUTILS_QUEUE_CAPACITY")]
    pub(crate) queue_capacity: usize,
    /// Locator tuning, for date based ranges.
    #[command(flatten)]
    pub(crate) locator: LocatorArgs,
}

impl BlocksCommand {
    /// Runs the subcommand.
    pub(crate) async fn run(self, cancellation: CancellationToken) -> anyhow::Result<()> {
        let start = match (self.block, self.time.timestamp()?) {
            (Some(height), _) => RangeStart::Height(height),
            (None, Some(timestamp)) => RangeStart::Time(timestamp),
            (None, None) => bail!("Either --block or --date is required"),
        };

        let gateway = Arc::new(self.rpc.gateway());
        let locator = BlockHeightLocator::new(Arc::clone(&gateway), self.locator.config());
        let range = find_block_range(&locator, start, self.length.unwrap_or_default()).await?;
        info!(target: "ethutils", %range, blocks = range.len(), "Fetching blocks");

        let config = FetcherConfig::default()
            .with_concurrency(self.concurrency)
            .with_queue_capacity(self.queue_capacity);
        let fetcher = BlockRangeFetcher::new(gateway, config, cancellation);

        let started = Instant::now();
        let (mut records, handle) = fetcher.spawn_range(range, self.queue_capacity);
        let mut throughput = Throughput::default();
        while let Some(record) = records.recv().await {
            let line = BlockLine::from(&record);
            println!("{line}");
            throughput.record(&line);
        }
        let summary = handle.await?;
        println!("{}", throughput.report(started.elapsed()));

        if !summary.failed.is_empty() {
            warn!(target: "ethutils", heights = ?summary.failed, "Some blocks could not be fetched");
        }
        if summary.cancelled {
            bail!("Cancelled after {} of {} blocks", summary.emitted, summary.requested);
        }
        Ok(())
    }
}
