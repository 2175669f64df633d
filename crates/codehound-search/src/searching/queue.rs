//! Work queue feeding the fetch workers
//!
//! The queue is filled and closed before any worker starts, so a worker that
//! sees `None` from [`HitQueue::pop`] knows there is no more work coming.

use crate::github::SearchHit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

type HitReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<SearchHit>>>;

/// Closed, pre-filled queue of hits shared by the fetch workers
#[derive(Clone)]
pub struct HitQueue {
    rx: HitReceiver,
    len: Arc<AtomicUsize>,
}

impl HitQueue {
    /// Enqueue every hit and close the queue
    pub fn prefilled(hits: Vec<SearchHit>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut len = 0_usize;
        for hit in hits {
            // The receiver is alive until this function returns, so sends succeed
            if tx.send(hit).is_ok() {
                len = len.saturating_add(1);
            }
        }
        // Dropping the only sender closes the channel
        drop(tx);

        Self {
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
            len: Arc::new(AtomicUsize::new(len)),
        }
    }

    /// Take the next hit, `None` once the queue is drained
    ///
    /// Each hit is handed to exactly one caller.
    pub async fn pop(&self) -> Option<SearchHit> {
        let hit = self.rx.lock().await.recv().await?;
        self.len.fetch_sub(1, Ordering::Relaxed);
        Some(hit)
    }

    /// Hits not yet taken
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searching::test_utils::hit;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_prefilled_queue_drains_then_closes() {
        let queue = HitQueue::prefilled(vec![hit("acme/a", "a.go"), hit("acme/b", "b.go")]);
        assert_eq!(queue.len(), 2);

        assert!(queue.pop().await.is_some());
        assert!(queue.pop().await.is_some());
        assert!(queue.pop().await.is_none());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_consumers_take_each_hit_once() {
        let hits = (0..50)
            .map(|i| hit("acme/tool", &format!("file_{i}.go")))
            .collect::<Vec<_>>();
        let queue = HitQueue::prefilled(hits);

        let mut join_set = tokio::task::JoinSet::new();
        for _ in 0..4 {
            let queue = queue.clone();
            join_set.spawn(async move {
                let mut taken = Vec::new();
                while let Some(hit) = queue.pop().await {
                    taken.push(hit.path);
                }
                taken
            });
        }

        let mut seen = HashSet::new();
        while let Some(Ok(taken)) = join_set.join_next().await {
            for path in taken {
                assert!(seen.insert(path), "hit handed out twice");
            }
        }
        assert_eq!(seen.len(), 50);
    }
}
