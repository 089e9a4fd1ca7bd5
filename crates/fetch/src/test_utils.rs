//! Test utilities: a deterministic, in-memory [`BlockGateway`].

use crate::{BlockGateway, GatewayBlock, GatewayError, HeaderInfo};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{B256, keccak256};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Returns the deterministic hash of the `index`th transaction of the fixture block at `height`.
pub fn tx_hash(height: u64, index: usize) -> B256 {
    keccak256(format!("tx:{height}:{index}"))
}

/// Returns the deterministic hash of the fixture block at `height`.
pub fn block_hash(height: u64) -> B256 {
    keccak256(format!("block:{height}"))
}

/// A block served by the [`FixtureGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureBlock {
    /// The block header.
    pub header: HeaderInfo,
    /// The transaction hashes, in block order.
    pub transactions: Vec<B256>,
}

impl GatewayBlock for FixtureBlock {
    fn header_info(&self) -> HeaderInfo {
        self.header
    }

    fn transaction_hashes(&self) -> Vec<B256> {
        self.transactions.clone()
    }
}

/// A receipt served by the [`FixtureGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureReceipt {
    /// The hash of the transaction the receipt belongs to.
    pub transaction_hash: B256,
    /// The height of the including block.
    pub block_number: u64,
    /// The index of the transaction in the block.
    pub transaction_index: usize,
    /// Execution status.
    pub status: bool,
}

/// An in-memory chain with injectable failures, latency and call counters.
#[derive(Debug, Default)]
pub struct FixtureGateway {
    blocks: BTreeMap<u64, FixtureBlock>,
    receipts: HashMap<B256, FixtureReceipt>,
    failing_blocks: HashSet<u64>,
    failing_headers: HashSet<u64>,
    failing_receipts: HashSet<B256>,
    latency: Option<Duration>,
    block_calls: AtomicUsize,
    header_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    header_requests: Mutex<Vec<BlockNumberOrTag>>,
}

impl FixtureGateway {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain with heights `start..=end`, timestamps starting at `start_timestamp` and
    /// spaced `interval` seconds apart, each block holding `tx_count` transactions.
    pub fn linear(start: u64, end: u64, start_timestamp: u64, interval: u64, tx_count: usize) -> Self {
        Self::from_timestamps(
            start,
            (0..=end - start).map(|i| start_timestamp + i * interval),
            tx_count,
        )
    }

    /// Creates a chain starting at `start` with one block per timestamp.
    pub fn from_timestamps(
        start: u64,
        timestamps: impl IntoIterator<Item = u64>,
        tx_count: usize,
    ) -> Self {
        timestamps
            .into_iter()
            .zip(start..)
            .fold(Self::new(), |chain, (timestamp, height)| chain.with_block(height, timestamp, tx_count))
    }

    /// Adds a block at `height` with `tx_count` transactions, each with a successful receipt.
    pub fn with_block(mut self, height: u64, timestamp: u64, tx_count: usize) -> Self {
        let transactions: Vec<B256> = (0..tx_count).map(|i| tx_hash(height, i)).collect();
        for (index, hash) in transactions.iter().enumerate() {
            self.receipts.insert(
                *hash,
                FixtureReceipt {
                    transaction_hash: *hash,
                    block_number: height,
                    transaction_index: index,
                    status: true,
                },
            );
        }
        self.blocks.insert(
            height,
            FixtureBlock { header: HeaderInfo::new(block_hash(height), height, timestamp), transactions },
        );
        self
    }

    /// Removes the receipt of a transaction, so the gateway reports it as not found.
    pub fn without_receipt(mut self, hash: B256) -> Self {
        self.receipts.remove(&hash);
        self
    }

    /// Makes every block fetch at `height` fail with a transport error.
    pub fn fail_block(mut self, height: u64) -> Self {
        self.failing_blocks.insert(height);
        self
    }

    /// Makes every header fetch at `height` fail with a transport error.
    pub fn fail_header(mut self, height: u64) -> Self {
        self.failing_headers.insert(height);
        self
    }

    /// Makes every receipt fetch for `hash` fail with a transport error.
    pub fn fail_receipt(mut self, hash: B256) -> Self {
        self.failing_receipts.insert(hash);
        self
    }

    /// Delays every call by `latency`.
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the block at `height`.
    pub fn block(&self, height: u64) -> Option<&FixtureBlock> {
        self.blocks.get(&height)
    }

    /// Returns the timestamp of the block at `height`.
    pub fn timestamp(&self, height: u64) -> Option<u64> {
        self.blocks.get(&height).map(|block| block.header.timestamp)
    }

    /// Number of block fetches so far.
    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    /// Number of header fetches so far.
    pub fn header_calls(&self) -> usize {
        self.header_calls.load(Ordering::SeqCst)
    }

    /// Number of receipt fetches so far.
    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }

    /// The highest number of calls that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// The header requests received so far, in order.
    pub fn header_requests(&self) -> Vec<BlockNumberOrTag> {
        self.header_requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    async fn enter(&self, counter: &AtomicUsize) -> InFlight<'_> {
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }

    fn resolve(&self, tag: BlockNumberOrTag) -> Option<u64> {
        match tag {
            BlockNumberOrTag::Number(number) => Some(number),
            BlockNumberOrTag::Earliest => self.blocks.keys().next().copied(),
            _ => self.blocks.keys().next_back().copied(),
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlockGateway for FixtureGateway {
    type Block = FixtureBlock;
    type Receipt = FixtureReceipt;

    async fn block_by_height(&self, height: u64) -> Result<FixtureBlock, GatewayError> {
        let _guard = self.enter(&self.block_calls).await;
        if self.failing_blocks.contains(&height) {
            return Err(GatewayError::Transport(format!("injected block failure at {height}")));
        }
        self.blocks.get(&height).cloned().ok_or(GatewayError::BlockNotFound(height.into()))
    }

    async fn header_by_height(&self, height: BlockNumberOrTag) -> Result<HeaderInfo, GatewayError> {
        let _guard = self.enter(&self.header_calls).await;
        if let Ok(mut requests) = self.header_requests.lock() {
            requests.push(height);
        }
        let number = self.resolve(height).ok_or(GatewayError::BlockNotFound(height))?;
        if self.failing_headers.contains(&number) {
            return Err(GatewayError::Transport(format!("injected header failure at {number}")));
        }
        self.blocks
            .get(&number)
            .map(|block| block.header)
            .ok_or(GatewayError::BlockNotFound(height))
    }

    async fn receipt_by_hash(&self, hash: B256) -> Result<FixtureReceipt, GatewayError> {
        let _guard = self.enter(&self.receipt_calls).await;
        if self.failing_receipts.contains(&hash) {
            return Err(GatewayError::Transport(format!("injected receipt failure for {hash}")));
        }
        self.receipts.get(&hash).cloned().ok_or(GatewayError::ReceiptNotFound(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_latest_and_earliest() {
        let gateway = FixtureGateway::linear(100, 110, 100, 13, 1);

        let latest = gateway.header_by_height(BlockNumberOrTag::Latest).await.unwrap();
        let earliest = gateway.header_by_height(BlockNumberOrTag::Earliest).await.unwrap();

        assert_eq!(latest.number, 110);
        assert_eq!(latest.timestamp, 230);
        assert_eq!(earliest.number, 100);
        assert_eq!(gateway.header_calls(), 2);
        assert_eq!(
            gateway.header_requests(),
            vec![BlockNumberOrTag::Latest, BlockNumberOrTag::Earliest]
        );
    }

    #[tokio::test]
    async fn test_fixture_unknown_height() {
        let gateway = FixtureGateway::linear(100, 110, 100, 13, 1);
        let err = gateway.header_by_height(BlockNumberOrTag::Number(99)).await.unwrap_err();
        assert_eq!(err, GatewayError::BlockNotFound(BlockNumberOrTag::Number(99)));
    }
}
