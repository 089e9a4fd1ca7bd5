//! A [`BlockGateway`] backed by an alloy provider.

use crate::{BlockGateway, GatewayBlock, GatewayError, HeaderInfo};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::B256;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{Block, TransactionReceipt};
use async_trait::async_trait;
use url::Url;

/// The [AlloyGateway] is a concrete implementation of the [BlockGateway] trait, providing
/// data over Ethereum JSON-RPC using an alloy provider as the backend.
///
/// Cloning is cheap; the inner provider is reference counted and safe to share between the
/// fetcher's workers.
#[derive(Debug, Clone)]
pub struct AlloyGateway {
    /// The inner Ethereum JSON-RPC provider.
    inner: RootProvider,
}

impl AlloyGateway {
    /// Creates a new [AlloyGateway] with the given alloy provider.
    pub const fn new(inner: RootProvider) -> Self {
        Self { inner }
    }

    /// Creates a new [AlloyGateway] from the provided [Url].
    pub fn new_http(url: Url) -> Self {
        Self::new(RootProvider::new_http(url))
    }

    /// Returns a reference to the inner provider.
    pub const fn provider(&self) -> &RootProvider {
        &self.inner
    }
}

impl GatewayBlock for Block {
    fn header_info(&self) -> HeaderInfo {
        HeaderInfo {
            hash: self.header.hash,
            number: self.header.number,
            timestamp: self.header.timestamp,
        }
    }

    fn transaction_hashes(&self) -> Vec<B256> {
        self.transactions.hashes().collect()
    }
}

#[async_trait]
impl BlockGateway for AlloyGateway {
    type Block = Block;
    type Receipt = TransactionReceipt;

    async fn block_by_height(&self, height: u64) -> Result<Block, GatewayError> {
        record_call("eth_getBlockByNumber_full");
        self.inner
            .get_block_by_number(height.into())
            .full()
            .await?
            .ok_or(GatewayError::BlockNotFound(height.into()))
    }

    async fn header_by_height(&self, height: BlockNumberOrTag) -> Result<HeaderInfo, GatewayError> {
        record_call("eth_getBlockByNumber");
        let block = self
            .inner
            .get_block_by_number(height)
            .await?
            .ok_or(GatewayError::BlockNotFound(height))?;
        Ok(block.header_info())
    }

    async fn receipt_by_hash(&self, hash: B256) -> Result<TransactionReceipt, GatewayError> {
        record_call("eth_getTransactionReceipt");
        self.inner.get_transaction_receipt(hash).await?.ok_or(GatewayError::ReceiptNotFound(hash))
    }
}

#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
fn record_call(method: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(crate::Metrics::RPC_CALLS, "method" => method).increment(1);
}
