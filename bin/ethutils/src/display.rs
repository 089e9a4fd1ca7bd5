//! Console output for fetched blocks.

use alloy_rpc_types_eth::{Block, TransactionReceipt};
use ethutils_fetch::{BlockWithReceipts, calendar::format_utc};
use std::{fmt, time::Duration};

/// The figures printed for one fetched block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockLine {
    pub(crate) height: u64,
    pub(crate) timestamp: u64,
    pub(crate) transactions: usize,
    pub(crate) receipts: usize,
    pub(crate) gas_used: u64,
}

impl From<&BlockWithReceipts<Block, TransactionReceipt>> for BlockLine {
    fn from(record: &BlockWithReceipts<Block, TransactionReceipt>) -> Self {
        let header = &record.block.header;
        Self {
            height: header.number,
            timestamp: header.timestamp,
            transactions: record.block.transactions.len(),
            receipts: record.receipts.len(),
            gas_used: header.gas_used,
        }
    }
}

impl fmt::Display for BlockLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  tx={}  receipts={}  gas={}",
            self.height,
            format_utc(self.timestamp),
            self.transactions,
            self.receipts,
            self.gas_used
        )
    }
}

/// Running totals over the blocks printed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Throughput {
    pub(crate) blocks: u64,
    pub(crate) transactions: u64,
}

impl Throughput {
    /// Adds a block to the totals.
    pub(crate) fn record(&mut self, line: &BlockLine) {
        self.blocks += 1;
        self.transactions += line.transactions as u64;
    }

    /// Formats the totals for a fetch that took `elapsed`.
    pub(crate) fn report(&self, elapsed: Duration) -> String {
        let seconds = elapsed.as_secs_f64();
        let rate = if seconds > 0.0 { self.transactions as f64 / seconds } else { 0.0 };
        format!(
            "Processed {} blocks with {} transactions in {seconds:.3} seconds ({rate:.2} tx/sec)",
            self.blocks, self.transactions
        )
    }
}
