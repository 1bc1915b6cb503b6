//! In-memory observation buffer
//!
//! Collectors push observations here; the pipeline waits until enough have
//! accumulated, then drains them as one batch. Nothing is persisted until a
//! batch is reconciled, so a batch that fails is handed back with
//! [`ObservationBatcher::requeue`].

use crate::config::BatcherConfig;
use crate::error::ReconcileError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;
use vigil_domain::{now_secs, PendingObservation};

/// Buffer of observations waiting to be reconciled
///
/// # Examples
///
/// ```
/// use vigil_reconciler::{BatcherConfig, ObservationBatcher};
///
/// let batcher = ObservationBatcher::new(BatcherConfig {
///     min_batch_size: 2,
///     max_batch_size: 4,
/// }).unwrap();
///
/// batcher.push("screen", "Reading docs", "input_text");
/// assert!(!batcher.is_ready());
/// batcher.push("screen", "Writing tests", "input_text");
/// assert!(batcher.is_ready());
///
/// let batch = batcher.pop_batch();
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batcher.size(), 0);
/// ```
#[derive(Debug)]
pub struct ObservationBatcher {
    config: BatcherConfig,
    buffer: Mutex<VecDeque<PendingObservation>>,
    ready: Notify,
    next_id: AtomicU64,
}

impl ObservationBatcher {
    /// Create an empty batcher after validating the configuration
    pub fn new(config: BatcherConfig) -> Result<Self, ReconcileError> {
        config.validate()?;
        Ok(Self {
            config,
            buffer: Mutex::new(VecDeque::new()),
            ready: Notify::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<PendingObservation>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append an observation and return its local id
    pub fn push(
        &self,
        source: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
    ) -> u64 {
        let local_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = PendingObservation {
            local_id,
            source: source.into(),
            content: content.into(),
            content_type: content_type.into(),
            pushed_at: now_secs(),
        };

        let size = {
            let mut buffer = self.buffer();
            buffer.push_back(item);
            buffer.len()
        };
        debug!("Buffered observation {} (size: {})", local_id, size);

        self.ready.notify_waiters();
        local_id
    }

    /// Push every item of a failed batch back, in order
    ///
    /// Re-pushed items receive new local ids, which are returned.
    pub fn requeue(&self, items: Vec<PendingObservation>) -> Vec<u64> {
        items
            .into_iter()
            .map(|item| self.push(item.source, item.content, item.content_type))
            .collect()
    }

    /// Number of buffered observations
    pub fn size(&self) -> usize {
        self.buffer().len()
    }

    /// Whether a batch is ready to be popped
    pub fn is_ready(&self) -> bool {
        let size = self.size();
        size >= self.config.min_batch_size || size >= self.config.max_batch_size
    }

    /// Wait until a batch is ready
    ///
    /// Returns immediately when one already is.
    pub async fn wait_for_batch_ready(&self) {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            // register before checking so a push in between is not missed
            notified.as_mut().enable();

            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }

    /// Drain the whole buffer, oldest first
    pub fn pop_batch(&self) -> Vec<PendingObservation> {
        let batch: Vec<_> = self.buffer().drain(..).collect();
        if !batch.is_empty() {
            debug!("Popped batch of {} observations", batch.len());
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn batcher(min: usize, max: usize) -> ObservationBatcher {
        ObservationBatcher::new(BatcherConfig {
            min_batch_size: min,
            max_batch_size: max,
        })
        .unwrap()
    }

    #[test]
    fn test_ids_increase() {
        let b = batcher(1, 10);
        let a = b.push("screen", "one", "input_text");
        let c = b.push("screen", "two", "input_text");
        assert!(c > a);
        assert_eq!(b.size(), 2);
    }

    #[test]
    fn test_pop_keeps_order_and_clears() {
        let b = batcher(1, 10);
        for i in 0..3 {
            b.push("screen", format!("item {}", i), "input_text");
        }
        let batch = b.pop_batch();
        let contents: Vec<_> = batch.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["item 0", "item 1", "item 2"]);
        assert_eq!(b.size(), 0);
        assert!(b.pop_batch().is_empty());
    }

    #[test]
    fn test_requeue_assigns_new_ids() {
        let b = batcher(1, 10);
        b.push("screen", "first", "input_text");
        b.push("keyboard", "second", "input_text");
        let batch = b.pop_batch();
        let old_ids: Vec<_> = batch.iter().map(|p| p.local_id).collect();

        let new_ids = b.requeue(batch);
        assert_eq!(new_ids.len(), 2);
        assert!(new_ids.iter().all(|id| !old_ids.contains(id)));

        let again = b.pop_batch();
        assert_eq!(again[0].content, "first");
        assert_eq!(again[1].source, "keyboard");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ObservationBatcher::new(BatcherConfig {
            min_batch_size: 5,
            max_batch_size: 2,
        });
        assert!(matches!(result, Err(ReconcileError::Config(_))));
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_ready() {
        let b = batcher(1, 10);
        b.push("screen", "ready", "input_text");
        tokio::time::timeout(Duration::from_secs(1), b.wait_for_batch_ready())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_wakes_on_push() {
        let b = Arc::new(batcher(3, 10));
        let waiter = {
            let b = Arc::clone(&b);
            tokio::spawn(async move { b.wait_for_batch_ready().await })
        };

        b.push("screen", "1", "input_text");
        b.push("screen", "2", "input_text");
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        b.push("screen", "3", "input_text");
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.pop_batch().len(), 3);
        assert_eq!(b.size(), 0);
    }
}
