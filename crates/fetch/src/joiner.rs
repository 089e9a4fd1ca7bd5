//! Joins a block with the receipts of its transactions.

use crate::{BlockGateway, GatewayBlock, GatewayError};
use alloy_primitives::B256;
use std::collections::HashMap;

/// A block together with the receipts of its transactions, keyed by transaction hash.
///
/// Every key of `receipts` is the hash of a transaction in `block`. A transaction without an
/// entry is one for which the node reported no receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockWithReceipts<B, R> {
    /// The full block.
    pub block: B,
    /// Receipts by transaction hash.
    pub receipts: HashMap<B256, R>,
}

impl<B: GatewayBlock, R> BlockWithReceipts<B, R> {
    /// Returns the height of the block.
    pub fn height(&self) -> u64 {
        self.block.header_info().number
    }

    /// Returns the hashes of the block's transactions that have no receipt, in block order.
    pub fn missing_receipts(&self) -> Vec<B256> {
        self.block
            .transaction_hashes()
            .into_iter()
            .filter(|hash| !self.receipts.contains_key(hash))
            .collect()
    }

    /// Returns the receipt of the given transaction, if one was fetched.
    pub fn receipt(&self, tx_hash: &B256) -> Option<&R> {
        self.receipts.get(tx_hash)
    }

    /// Consumes the record, returning the block and the receipts.
    pub fn into_parts(self) -> (B, HashMap<B256, R>) {
        (self.block, self.receipts)
    }
}

/// An error joining a block with its receipts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// The block itself could not be fetched.
    #[error("Failed to fetch block {height}: {source}")]
    Block {
        /// The requested height.
        height: u64,
        /// The gateway error.
        source: GatewayError,
    },
    /// A receipt could not be fetched for a reason other than absence.
    #[error("Failed to fetch receipt for transaction {tx} in block {height}: {source}")]
    Receipt {
        /// The height of the block being joined.
        height: u64,
        /// The transaction whose receipt failed.
        tx: B256,
        /// The gateway error.
        source: GatewayError,
    },
}

impl JoinError {
    /// Returns the height the error belongs to.
    pub const fn height(&self) -> u64 {
        match self {
            Self::Block { height, .. } | Self::Receipt { height, .. } => *height,
        }
    }
}

/// Fetches the block at `height` and the receipt of every transaction in it.
///
/// A receipt the node reports as not found is left out of the record. Any other receipt error
/// fails the whole join, as does a failure to fetch the block.
pub async fn join_receipts<G>(
    gateway: &G,
    height: u64,
) -> Result<BlockWithReceipts<G::Block, G::Receipt>, JoinError>
where
    G: BlockGateway + ?Sized,
{
    let block = gateway
        .block_by_height(height)
        .await
        .map_err(|source| JoinError::Block { height, source })?;

    let tx_hashes = block.transaction_hashes();
    let mut receipts = HashMap::with_capacity(tx_hashes.len());
    for tx in tx_hashes {
        match gateway.receipt_by_hash(tx).await {
            Ok(receipt) => {
                receipts.insert(tx, receipt);
            }
            Err(GatewayError::ReceiptNotFound(_)) => {
                debug!(target: "joiner", height, %tx, "Receipt not found, omitting transaction");
            }
            Err(source) => return Err(JoinError::Receipt { height, tx, source }),
        }
    }

    trace!(target: "joiner", height, receipts = receipts.len(), "Joined block with receipts");
    Ok(BlockWithReceipts { block, receipts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixtureGateway, tx_hash};

    #[tokio::test]
    async fn test_join_collects_all_receipts() {
        let gateway = FixtureGateway::linear(100, 102, 1_000, 13, 3);

        let record = join_receipts(&gateway, 101).await.unwrap();

        assert_eq!(record.height(), 101);
        assert_eq!(record.receipts.len(), 3);
        for tx in record.block.transaction_hashes() {
            assert_eq!(record.receipt(&tx).unwrap().transaction_hash, tx);
        }
        assert!(record.missing_receipts().is_empty());
        assert_eq!(gateway.block_calls(), 1);
        assert_eq!(gateway.receipt_calls(), 3);
    }

    #[tokio::test]
    async fn test_join_empty_block() {
        let gateway = FixtureGateway::linear(100, 100, 1_000, 13, 0);

        let record = join_receipts(&gateway, 100).await.unwrap();

        assert_eq!(record.height(), 100);
        assert!(record.receipts.is_empty());
        assert_eq!(gateway.receipt_calls(), 0);
    }

    #[tokio::test]
    async fn test_join_skips_missing_receipt() {
        let missing = tx_hash(100, 1);
        let gateway = FixtureGateway::linear(100, 100, 1_000, 13, 3).without_receipt(missing);

        let record = join_receipts(&gateway, 100).await.unwrap();

        assert_eq!(record.receipts.len(), 2);
        assert!(record.receipt(&missing).is_none());
        assert_eq!(record.missing_receipts(), vec![missing]);
        assert_eq!(gateway.receipt_calls(), 3);
    }

    #[tokio::test]
    async fn test_join_fails_on_block_error() {
        let gateway = FixtureGateway::linear(100, 102, 1_000, 13, 2).fail_block(101);

        let err = join_receipts(&gateway, 101).await.unwrap_err();

        assert!(matches!(err, JoinError::Block { height: 101, .. }));
        assert_eq!(err.height(), 101);
        assert_eq!(gateway.receipt_calls(), 0);
    }

    #[tokio::test]
    async fn test_join_fails_on_unknown_height() {
        let gateway = FixtureGateway::linear(100, 102, 1_000, 13, 2);

        let err = join_receipts(&gateway, 500).await.unwrap_err();

        assert!(matches!(
            err,
            JoinError::Block { height: 500, source: GatewayError::BlockNotFound(_) }
        ));
    }

    #[tokio::test]
    async fn test_join_aborts_on_receipt_transport_error() {
        let broken = tx_hash(100, 0);
        let gateway = FixtureGateway::linear(100, 100, 1_000, 13, 3).fail_receipt(broken);

        let err = join_receipts(&gateway, 100).await.unwrap_err();

        assert_eq!(
            err,
            JoinError::Receipt {
                height: 100,
                tx: broken,
                source: GatewayError::Transport(format!("injected receipt failure for {broken}")),
            }
        );
        // The join stops at the first hard failure.
        assert_eq!(gateway.receipt_calls(), 1);
    }
}
