//! Finds the first block at or after a point in time.
//!
//! Block timestamps increase monotonically but irregularly, and nodes keep no index from time to
//! height. The search starts from a linear estimate, closes in with proportional jumps while far
//! from the target, and finishes with a single-step sweep from below so the answer is exact.

use crate::{BlockGateway, HeaderInfo};
use alloy_eips::BlockNumberOrTag;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

mod config;
pub use config::LocatorConfig;

mod error;
pub use error::LocatorError;

mod ring;
use ring::DeltaRing;

/// Converts a point in time into the height of the first block at or after it.
#[derive(Debug)]
pub struct BlockHeightLocator<G> {
    gateway: Arc<G>,
    config: LocatorConfig,
}

impl<G> Clone for BlockHeightLocator<G> {
    fn clone(&self) -> Self {
        Self { gateway: Arc::clone(&self.gateway), config: self.config }
    }
}

impl<G: BlockGateway> BlockHeightLocator<G> {
    /// Creates a new [`BlockHeightLocator`].
    pub const fn new(gateway: Arc<G>, config: LocatorConfig) -> Self {
        Self { gateway, config }
    }

    /// Returns the gateway the locator queries.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the locator configuration.
    pub const fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Returns the header of the first block whose timestamp is at or after `target` (unix
    /// seconds). If the target predates the earliest block, the earliest block is returned.
    ///
    /// Fails with [`LocatorError::TargetAfterTip`] if `target` is later than the latest block,
    /// and with [`LocatorError::Gateway`] as soon as any header fetch fails. Nothing is retried.
    pub async fn locate(&self, target: u64) -> Result<HeaderInfo, LocatorError> {
        let latest = self.gateway.header_by_height(BlockNumberOrTag::Latest).await?;
        if target > latest.timestamp {
            return Err(LocatorError::TargetAfterTip { target, tip: latest.timestamp });
        }

        let earliest = self.config.earliest_height;
        let highest = latest.number.max(earliest);
        let start = self.config.estimate_height(target).clamp(earliest as i64, highest as i64) as u64;
        debug!(
            target: "locator",
            timestamp = target,
            start,
            latest = latest.number,
            "Searching for first block at or after target time"
        );

        let mut state = SearchState::new(start, target, self.config.initial_block_interval);
        let mut probes = 0u64;
        loop {
            let header = self.gateway.header_by_height(state.height.into()).await?;
            probes += 1;
            #[cfg(feature = "metrics")]
            metrics::counter!(crate::Metrics::LOCATOR_PROBES).increment(1);
            trace!(
                target: "locator",
                height = header.number,
                delta = header.timestamp as i64 - target as i64,
                interval = state.interval,
                "Probed header"
            );

            if state.observe(header.timestamp, &self.config, highest) == Probe::Found {
                debug!(target: "locator", height = header.number, probes, "Located block");
                return Ok(header);
            }
        }
    }

    /// Same as [`Self::locate`], for a [`SystemTime`].
    pub async fn locate_time(&self, time: SystemTime) -> Result<HeaderInfo, LocatorError> {
        let target =
            time.duration_since(UNIX_EPOCH).map_err(|_| LocatorError::BeforeEpoch)?.as_secs();
        self.locate(target).await
    }
}

/// Outcome of observing one header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The probed header is the answer.
    Found,
    /// Probe the header at the updated height next.
    Next,
}

/// Mutable state of one search.
#[derive(Debug)]
struct SearchState {
    /// The height to probe next.
    height: u64,
    /// The target timestamp.
    target: u64,
    /// The currently assumed seconds per block. Only ever grows.
    interval: u64,
    /// Recently observed deltas, for cycle detection.
    recent: DeltaRing,
    /// Set once a probe landed before the target within the fine-grained range.
    narrowing_from_below: bool,
}

impl SearchState {
    fn new(height: u64, target: u64, interval: u64) -> Self {
        Self {
            height,
            target,
            interval: interval.max(1),
            recent: DeltaRing::default(),
            narrowing_from_below: false,
        }
    }

    /// Feeds the timestamp of the block at `self.height` into the search and picks the next
    /// height, keeping it within `[config.earliest_height, highest]`.
    fn observe(&mut self, timestamp: u64, config: &LocatorConfig, highest: u64) -> Probe {
        let delta = timestamp as i64 - self.target as i64;

        if self.recent.contains(delta) && self.interval < config.max_block_interval {
            self.interval += 1;
            debug!(
                target: "locator",
                delta,
                interval = self.interval,
                "Search revisited a delta, raising assumed block interval"
            );
        }
        self.recent.push(delta);

        if delta.unsigned_abs() < config.coarse_threshold || self.narrowing_from_below {
            if delta < 0 {
                self.narrowing_from_below = true;
                self.height += 1;
                return Probe::Next;
            }
            // Only accept a block reached by stepping up from below, unless nothing lies below.
            if self.narrowing_from_below || self.height <= config.earliest_height {
                return Probe::Found;
            }
            self.height -= 1;
            return Probe::Next;
        }

        if delta >= 0 && self.height <= config.earliest_height {
            return Probe::Found;
        }

        let jump = match delta / self.interval as i64 {
            0 => delta.signum(),
            jump => jump,
        };
        self.height = (self.height as i64 - jump)
            .clamp(config.earliest_height as i64, highest.max(config.earliest_height) as i64)
            as u64;
        Probe::Next
    }
}
