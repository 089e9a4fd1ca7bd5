//! A bounded worker pool that fetches a range of blocks.
//!
//! Heights are fed in ascending order into a bounded work queue shared by a fixed number of
//! workers. Each worker pulls the next height, fetches it, and pushes the result into the caller's
//! sink. Results arrive in no particular order. A height that fails is logged and skipped; it
//! never stops the rest of the range.

use crate::{BlockGateway, BlockWithReceipts, HeightRange, join_receipts};
use std::{fmt, future::Future, sync::Arc};
use tokio::{
    select,
    sync::{Mutex, mpsc},
    task::{JoinHandle, JoinSet},
};
use tokio_util::sync::CancellationToken;

mod config;
pub use config::FetcherConfig;

/// The outcome of a range fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Number of heights in the requested range.
    pub requested: u64,
    /// Number of records pushed into the sink.
    pub emitted: u64,
    /// Heights that failed and were skipped, ascending.
    pub failed: Vec<u64>,
    /// Whether the fetch was stopped by its cancellation token.
    pub cancelled: bool,
}

impl FetchSummary {
    /// Returns `true` if every requested height was emitted.
    pub const fn is_complete(&self) -> bool {
        !self.cancelled && self.emitted == self.requested
    }
}

/// Fetches ranges of blocks with a fixed number of concurrent workers.
#[derive(Debug)]
pub struct BlockRangeFetcher<G> {
    /// The gateway shared by all workers.
    gateway: Arc<G>,
    /// Pool sizing.
    config: FetcherConfig,
    /// Stops every fetch started by this fetcher.
    cancellation: CancellationToken,
}

impl<G> Clone for BlockRangeFetcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: self.config,
            cancellation: self.cancellation.clone(),
        }
    }
}

impl<G> BlockRangeFetcher<G>
where
    G: BlockGateway + 'static,
{
    /// Creates a new [`BlockRangeFetcher`].
    pub const fn new(
        gateway: Arc<G>,
        config: FetcherConfig,
        cancellation: CancellationToken,
    ) -> Self {
        Self { gateway, config, cancellation }
    }

    /// Returns the pool configuration.
    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Returns the token that cancels this fetcher's work.
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Fetches every block in `range` with the receipts of its transactions, pushing each record
    /// into `sink` as soon as it is ready.
    ///
    /// Returns once every worker has exited. The sink is dropped on return, so the receiving side
    /// sees the end of the stream once it has drained the remaining records.
    pub async fn fetch_range(
        &self,
        range: HeightRange,
        sink: mpsc::Sender<BlockWithReceipts<G::Block, G::Receipt>>,
    ) -> FetchSummary {
        self.run_pool(range, sink, |gateway: Arc<G>, height| async move {
            join_receipts(gateway.as_ref(), height).await
        })
        .await
    }

    /// Fetches every block in `range` without receipts.
    pub async fn fetch_blocks(&self, range: HeightRange, sink: mpsc::Sender<G::Block>) -> FetchSummary {
        self.run_pool(range, sink, |gateway: Arc<G>, height| async move {
            gateway.block_by_height(height).await
        })
        .await
    }

    /// Spawns [`Self::fetch_range`] onto the runtime, returning the receiving end of a sink with
    /// room for `capacity` records and a handle resolving to the summary.
    pub fn spawn_range(
        &self,
        range: HeightRange,
        capacity: usize,
    ) -> (mpsc::Receiver<BlockWithReceipts<G::Block, G::Receipt>>, JoinHandle<FetchSummary>) {
        let (sink, records) = mpsc::channel(capacity.max(1));
        let fetcher = self.clone();
        let handle = tokio::spawn(async move { fetcher.fetch_range(range, sink).await });
        (records, handle)
    }

    async fn run_pool<T, E, F, Fut>(&self, range: HeightRange, sink: mpsc::Sender<T>, job: F) -> FetchSummary
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn(Arc<G>, u64) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let workers = self.config.concurrency.get();
        info!(target: "fetcher", %range, workers, "Fetching block range");

        // Local stop signal, also fired when the sink is closed.
        let stop = self.cancellation.child_token();
        let (queue, heights) = mpsc::channel(self.config.queue_capacity.max(1));
        let heights = Arc::new(Mutex::new(heights));

        let mut tasks = JoinSet::new();
        for id in 0..workers {
            tasks.spawn(work(
                id,
                Arc::clone(&self.gateway),
                Arc::clone(&heights),
                sink.clone(),
                job.clone(),
                stop.clone(),
            ));
        }
        drop(heights);
        drop(sink);

        for height in range.iter() {
            select! {
                biased;
                _ = stop.cancelled() => break,
                sent = queue.send(height) => if sent.is_err() {
                    // Every worker has already exited.
                    break;
                },
            }
        }
        drop(queue);

        let mut summary = FetchSummary { requested: range.len(), ..Default::default() };
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(report) => {
                    summary.emitted += report.emitted;
                    summary.failed.extend(report.failed);
                }
                Err(e) => error!(target: "fetcher", "Fetch worker terminated abnormally: {e}"),
            }
        }
        summary.failed.sort_unstable();
        summary.cancelled = self.cancellation.is_cancelled();

        info!(
            target: "fetcher",
            %range,
            emitted = summary.emitted,
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "Finished fetching block range"
        );
        summary
    }
}

/// What a single worker did before it exited.
#[derive(Debug, Default)]
struct WorkerReport {
    emitted: u64,
    failed: Vec<u64>,
}

/// Pulls heights from the shared queue until it is drained or `stop` fires.
async fn work<G, T, E, F, Fut>(
    id: usize,
    gateway: Arc<G>,
    heights: Arc<Mutex<mpsc::Receiver<u64>>>,
    sink: mpsc::Sender<T>,
    job: F,
    stop: CancellationToken,
) -> WorkerReport
where
    E: fmt::Display,
    F: Fn(Arc<G>, u64) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut report = WorkerReport::default();
    loop {
        let next = {
            let mut heights = heights.lock().await;
            select! {
                biased;
                _ = stop.cancelled() => None,
                height = heights.recv() => height,
            }
        };
        let Some(height) = next else { break };

        let result = select! {
            biased;
            _ = stop.cancelled() => break,
            result = job(Arc::clone(&gateway), height) => result,
        };

        match result {
            Ok(item) => {
                select! {
                    biased;
                    _ = stop.cancelled() => break,
                    sent = sink.send(item) => if sent.is_err() {
                        debug!(target: "fetcher", worker = id, "Result sink closed, stopping fetch");
                        stop.cancel();
                        break;
                    },
                }
                report.emitted += 1;
                #[cfg(feature = "metrics")]
                metrics::counter!(crate::Metrics::BLOCKS_EMITTED).increment(1);
                trace!(target: "fetcher", worker = id, height, "Emitted block");
            }
            Err(e) => {
                warn!(target: "fetcher", worker = id, height, "Skipping height: {e}");
                report.failed.push(height);
                #[cfg(feature = "metrics")]
                metrics::counter!(crate::Metrics::HEIGHTS_FAILED).increment(1);
            }
        }
    }
    report
}
