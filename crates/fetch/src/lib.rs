#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metachris/ethutils-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod gateway;
pub use gateway::{BlockGateway, GatewayBlock, GatewayError, HeaderInfo};

mod alloy;
pub use alloy::AlloyGateway;

mod joiner;
pub use joiner::{BlockWithReceipts, JoinError, join_receipts};

mod fetcher;
pub use fetcher::{BlockRangeFetcher, FetchSummary, FetcherConfig};

mod locator;
pub use locator::{BlockHeightLocator, LocatorConfig, LocatorError};

mod range;
pub use range::{DateSpec, HeightRange, RangeError, RangeLength, RangeStart, find_block_range};

pub mod calendar;

mod metrics;
pub use metrics::Metrics;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
