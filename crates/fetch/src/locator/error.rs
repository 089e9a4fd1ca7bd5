//! Errors returned by the [`BlockHeightLocator`](super::BlockHeightLocator).

use crate::GatewayError;

/// An error locating the block for a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// The target time is after the latest block.
    #[error("Target timestamp {target} is after the latest block timestamp {tip}")]
    TargetAfterTip {
        /// The requested timestamp.
        target: u64,
        /// The timestamp of the latest block.
        tip: u64,
    },
    /// The target time is before the unix epoch.
    #[error("Target time is before the unix epoch")]
    BeforeEpoch,
    /// A gateway call failed during the search.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
