//! The RPC capability consumed by the joiner, the fetcher and the locator.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::B256;
use alloy_transport::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The subset of a block header the locator and range finder work with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// The block hash.
    pub hash: B256,
    /// The block height.
    pub number: u64,
    /// The block timestamp, in unix seconds.
    pub timestamp: u64,
}

impl HeaderInfo {
    /// Creates a new [`HeaderInfo`].
    pub const fn new(hash: B256, number: u64, timestamp: u64) -> Self {
        Self { hash, number, timestamp }
    }
}

impl fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}) @ {}", self.number, self.hash, self.timestamp)
    }
}

/// A full block as returned by a [`BlockGateway`].
pub trait GatewayBlock {
    /// Returns the header fields of the block.
    fn header_info(&self) -> HeaderInfo;

    /// Returns the hashes of the block's transactions, in block order.
    fn transaction_hashes(&self) -> Vec<B256>;
}

/// Read access to a chain over RPC.
///
/// Implementations must tolerate concurrent calls: the fetcher shares one gateway between all of
/// its workers without any locking.
#[async_trait]
pub trait BlockGateway: Send + Sync {
    /// The full block type, including its transactions.
    type Block: GatewayBlock + Send + Sync + 'static;
    /// The transaction receipt type.
    type Receipt: Send + Sync + 'static;

    /// Fetches the full block at the given height.
    ///
    /// Returns [`GatewayError::BlockNotFound`] if the node does not know the height.
    async fn block_by_height(&self, height: u64) -> Result<Self::Block, GatewayError>;

    /// Fetches the header at the given height or tag.
    async fn header_by_height(&self, height: BlockNumberOrTag) -> Result<HeaderInfo, GatewayError>;

    /// Fetches the receipt of the transaction with the given hash.
    ///
    /// Returns [`GatewayError::ReceiptNotFound`] if the node has no receipt for it.
    async fn receipt_by_hash(&self, hash: B256) -> Result<Self::Receipt, GatewayError>;
}

/// An error returned by a [`BlockGateway`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Block not found.
    #[error("Block not found: {0}")]
    BlockNotFound(BlockNumberOrTag),
    /// Receipt not found.
    #[error("Receipt not found for transaction {0}")]
    ReceiptNotFound(B256),
    /// Transport error.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Returns `true` if the node answered but did not know the requested item.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound(_) | Self::ReceiptNotFound(_))
    }
}

impl From<RpcError<TransportErrorKind>> for GatewayError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        Self::Transport(err.to_string())
    }
}
