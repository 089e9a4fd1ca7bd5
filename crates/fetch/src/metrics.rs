//! Metrics for the fetch crate.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of JSON-RPC calls made by the alloy gateway, by method.
    pub const RPC_CALLS: &str = "ethutils_fetch_rpc_calls";

    /// Identifier for the counter of records pushed into a fetcher sink.
    pub const BLOCKS_EMITTED: &str = "ethutils_fetch_blocks_emitted";

    /// Identifier for the counter of heights the fetcher skipped after an error.
    pub const HEIGHTS_FAILED: &str = "ethutils_fetch_heights_failed";

    /// Identifier for the counter of headers probed by the locator.
    pub const LOCATOR_PROBES: &str = "ethutils_fetch_locator_probes";

    /// Initializes metrics for the fetch crate.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`ethutils_fetch`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(Self::RPC_CALLS, "JSON-RPC calls made by the alloy gateway");
        metrics::describe_counter!(Self::BLOCKS_EMITTED, "Blocks emitted by the range fetcher");
        metrics::describe_counter!(Self::HEIGHTS_FAILED, "Heights skipped by the range fetcher");
        metrics::describe_counter!(Self::LOCATOR_PROBES, "Headers probed by the block locator");
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        for method in ["eth_getBlockByNumber", "eth_getBlockByNumber_full", "eth_getTransactionReceipt"]
        {
            metrics::counter!(Self::RPC_CALLS, "method" => method).absolute(0);
        }
        metrics::counter!(Self::BLOCKS_EMITTED).absolute(0);
        metrics::counter!(Self::HEIGHTS_FAILED).absolute(0);
        metrics::counter!(Self::LOCATOR_PROBES).absolute(0);
    }
}
