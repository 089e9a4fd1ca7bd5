//! Contains the configuration for the [`BlockHeightLocator`](super::BlockHeightLocator).

use serde::{Deserialize, Serialize};

/// Tuning for the timestamp to height search.
///
/// The defaults describe Ethereum mainnet: the reference point is block 12,323,940 and the
/// assumed average block interval is 13 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocatorConfig {
    /// Height of a known block used to estimate the starting point.
    pub reference_height: u64,
    /// Timestamp of the block at `reference_height`.
    pub reference_timestamp: u64,
    /// Assumed seconds between blocks at the start of every search.
    pub initial_block_interval: u64,
    /// The assumed interval is never raised beyond this.
    pub max_block_interval: u64,
    /// Below this distance in seconds the search stops jumping and walks one block at a time.
    pub coarse_threshold: u64,
    /// The lowest height the chain serves.
    pub earliest_height: u64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            reference_height: 12_323_940,
            reference_timestamp: 1_619_546_404,
            initial_block_interval: 13,
            max_block_interval: 25,
            coarse_threshold: 80,
            earliest_height: 0,
        }
    }
}

impl LocatorConfig {
    /// Sets the reference point used for the initial estimate.
    pub const fn with_reference(mut self, height: u64, timestamp: u64) -> Self {
        self.reference_height = height;
        self.reference_timestamp = timestamp;
        self
    }

    /// Sets the lowest height the chain serves.
    pub const fn with_earliest_height(mut self, height: u64) -> Self {
        self.earliest_height = height;
        self
    }

    /// Sets the assumed block interval the search starts with.
    pub const fn with_block_interval(mut self, seconds: u64) -> Self {
        self.initial_block_interval = seconds;
        self
    }

    /// Roughly estimates the height of the block produced at `timestamp`, assuming a constant
    /// block interval from the reference point. The estimate may be far off and may be negative.
    pub fn estimate_height(&self, timestamp: u64) -> i64 {
        let seconds = self.reference_timestamp as i64 - timestamp as i64;
        self.reference_height as i64 - seconds / self.initial_block_interval.max(1) as i64
    }
}
