//! Locator tuning flags.

use clap::Args;
use ethutils_fetch::LocatorConfig;

/// Overrides for the timestamp to height search. Unset values keep the mainnet defaults.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct LocatorArgs {
    /// Height of a known block to start estimating from.
    #[arg(long = "locator.reference-height", requires = "reference_timestamp")]
    pub(crate) reference_height: Option<u64>,
    /// Timestamp of the block at the reference height.
    #[arg(long = "locator.reference-timestamp", requires = "reference_height")]
    pub(crate) reference_timestamp: Option<u64>,
    /// Assumed seconds between blocks.
    #[arg(long = "locator.block-interval", env = "ETHUTILS_BLOCK_INTERVAL")]
    pub(crate) block_interval: Option<u64>,
    /// Lowest block height the node serves.
    #[arg(long = "locator.earliest-height", env = "ETHUTILS_EARLIEST_HEIGHT")]
    pub(crate) earliest_height: Option<u64>,
}

impl LocatorArgs {
    /// Builds the locator configuration.
    pub(crate) fn config(&self) -> LocatorConfig {
        let mut config = LocatorConfig::default();
        if let (Some(height), Some(timestamp)) = (self.reference_height, self.reference_timestamp) {
            config = config.with_reference(height, timestamp);
        }
        if let Some(interval) = self.block_interval {
            config = config.with_block_interval(interval);
        }
        if let Some(height) = self.earliest_height {
            config = config.with_earliest_height(height);
        }
        config
    }
}
