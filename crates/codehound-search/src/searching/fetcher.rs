//! Bounded-concurrency retrieval of hit contents
//!
//! All hits are placed on a closed [`HitQueue`] before any worker starts.
//! `max_concurrency` workers then pull from the queue, each with at most one
//! request in flight, and push decoded files into a results channel. The
//! channel is drained only after every worker has been joined.

use super::queue::HitQueue;
use crate::error::{SearchError, SearchResult};
use crate::github::{CodeSearchBackend, SearchHit};
use codehound_common::CorrelationId;
use codehound_config::FetchFailurePolicy;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A hit together with its decoded file text
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub hit: SearchHit,
    pub content: String,
}

/// Counters for one fetch batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Hits queued for fetching
    pub attempted: usize,
    /// Hits whose content was fetched and decoded
    pub fetched: usize,
    /// Hits dropped under `FetchFailurePolicy::Skip`
    pub skipped: usize,
}

/// Result of a fetch batch; `files` are in no particular order
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub files: Vec<FetchedFile>,
    pub stats: FetchStats,
}

pub struct ConcurrentFetcher {
    backend: Arc<dyn CodeSearchBackend>,
    policy: FetchFailurePolicy,
    cancel: CancellationToken,
}

impl ConcurrentFetcher {
    pub fn new(
        backend: Arc<dyn CodeSearchBackend>,
        policy: FetchFailurePolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            policy,
            cancel,
        }
    }

    /// Fetch and decode the content of every hit with `max_concurrency`
    /// workers (at least one)
    ///
    /// # Errors
    /// Under `FetchFailurePolicy::Abort`, the first per-hit failure. In any
    /// mode, `SearchError::Cancelled` if the token fires and
    /// `SearchError::Worker` if a worker task panics.
    #[tracing::instrument(skip(self, hits), fields(hits = hits.len(), policy = %self.policy, correlation_id = %correlation_id))]
    pub async fn fetch_all(
        &self,
        hits: Vec<SearchHit>,
        max_concurrency: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<FetchOutcome> {
        let attempted = hits.len();
        let workers = max_concurrency.max(1);
        let queue = HitQueue::prefilled(hits);
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let skipped = Arc::new(AtomicUsize::new(0));
        // Cancelled by the caller's token, or by a worker aborting the batch
        let batch_cancel = self.cancel.child_token();

        let mut join_set = tokio::task::JoinSet::new();
        for worker_id in 0..workers.min(attempted.max(1)) {
            let worker = FetchWorker {
                worker_id,
                backend: Arc::clone(&self.backend),
                queue: queue.clone(),
                results: results_tx.clone(),
                policy: self.policy,
                cancel: batch_cancel.clone(),
                skipped: Arc::clone(&skipped),
                correlation_id: correlation_id.clone(),
            };
            join_set.spawn(worker.run());
        }
        drop(results_tx);

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Fetch worker task panicked");
                    first_error.get_or_insert(SearchError::Worker(e.to_string()));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled {
                correlation_id: correlation_id.clone(),
            });
        }

        let mut files = Vec::with_capacity(attempted);
        while let Some(file) = results_rx.recv().await {
            files.push(file);
        }

        let stats = FetchStats {
            attempted,
            fetched: files.len(),
            skipped: skipped.load(Ordering::Relaxed),
        };
        tracing::info!(
            attempted = stats.attempted,
            fetched = stats.fetched,
            skipped = stats.skipped,
            "Content fetch complete"
        );

        Ok(FetchOutcome { files, stats })
    }
}

struct FetchWorker {
    worker_id: usize,
    backend: Arc<dyn CodeSearchBackend>,
    queue: HitQueue,
    results: mpsc::UnboundedSender<FetchedFile>,
    policy: FetchFailurePolicy,
    cancel: CancellationToken,
    skipped: Arc<AtomicUsize>,
    correlation_id: CorrelationId,
}

impl FetchWorker {
    async fn run(self) -> SearchResult<()> {
        let worker_id = self.worker_id;
        tracing::debug!("Fetch worker {worker_id} starting");

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("Fetch worker {worker_id}: cancelled");
                break;
            }

            let Some(hit) = self.queue.pop().await else {
                break;
            };

            let fetched = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                fetched = self.fetch_one(&hit) => fetched,
            };

            match fetched {
                Ok(content) => {
                    if self.results.send(FetchedFile { hit, content }).is_err() {
                        break;
                    }
                }
                Err(e) if self.policy == FetchFailurePolicy::Skip && e.is_per_hit() => {
                    tracing::warn!(
                        worker = worker_id,
                        url = %hit.url,
                        path = %hit.path,
                        error = %e,
                        "Skipping hit whose content could not be fetched"
                    );
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::error!(worker = worker_id, url = %hit.url, error = %e, "Aborting fetch batch");
                    self.cancel.cancel();
                    return Err(e);
                }
            }
        }

        tracing::debug!("Fetch worker {worker_id} shutting down");
        Ok(())
    }

    async fn fetch_one(&self, hit: &SearchHit) -> SearchResult<String> {
        self.backend
            .fetch_file(&hit.url, &self.correlation_id)
            .await?
            .decoded_content()
    }
}
