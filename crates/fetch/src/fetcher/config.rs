//! Contains the configuration for the [`BlockRangeFetcher`](super::BlockRangeFetcher).

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Sizing of the fetcher's worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetcherConfig {
    /// Number of workers, and so the maximum number of heights in flight.
    pub concurrency: NonZeroUsize,
    /// Capacity of the work queue between the producer and the workers.
    pub queue_capacity: usize,
}

impl FetcherConfig {
    /// The default number of workers.
    pub const DEFAULT_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(5).unwrap();

    /// The default work queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

    /// Sets the number of workers.
    pub const fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the capacity of the work queue.
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self { concurrency: Self::DEFAULT_CONCURRENCY, queue_capacity: Self::DEFAULT_QUEUE_CAPACITY }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.concurrency.get(), 5);
        assert_eq!(config.queue_capacity, 100);
    }

    #[test]
    fn test_deserialize_rejects_zero_concurrency() {
        assert!(serde_json::from_str::<FetcherConfig>(r#"{"concurrency": 0}"#).is_err());

        let config: FetcherConfig = serde_json::from_str(r#"{"concurrency": 8}"#).unwrap();
        assert_eq!(config.concurrency.get(), 8);
        assert_eq!(config.queue_capacity, 100);
    }
}
