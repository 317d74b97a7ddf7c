use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::models::Report;

/// Service handing accepted report batches to the background drain task.
///
/// The HTTP layer never talks to the downstream pipeline directly: accepted
/// batches go into a bounded queue and the drain task owns the other end.
/// A full queue is surfaced as `Unavailable` instead of making the upload
/// handler wait, so backpressure never stretches request latency — that
/// would reopen the timing channel the slow-down layer closes.
///
/// # Counter Memory Ordering
///
/// All counters use `Ordering::Relaxed` because:
/// - They are monotonically increasing and used only for stats/metrics
/// - Eventual consistency is acceptable (exact real-time count not required)
/// - No other operations depend on their values for correctness
#[derive(Clone)]
pub struct IngestService {
    sender: mpsc::Sender<Vec<Report>>,
    /// Real uploads accepted into the queue (monotonic counter).
    uploads_accepted: Arc<AtomicU64>,
    /// Reports enqueued across all accepted uploads (monotonic counter).
    reports_enqueued: Arc<AtomicU64>,
    /// Decoy uploads received and discarded (monotonic counter).
    decoys_discarded: Arc<AtomicU64>,
}

impl IngestService {
    /// Create the service and the receiving end of its handoff queue.
    ///
    /// The caller is expected to hand the receiver to a drain task; once
    /// that task drops it, further enqueues fail with `Unavailable`.
    pub fn new(queue_depth: usize) -> (Self, mpsc::Receiver<Vec<Report>>) {
        let (sender, receiver) = mpsc::channel(queue_depth);

        let service = Self {
            sender,
            uploads_accepted: Arc::new(AtomicU64::new(0)),
            reports_enqueued: Arc::new(AtomicU64::new(0)),
            decoys_discarded: Arc::new(AtomicU64::new(0)),
        };

        (service, receiver)
    }

    /// Hand one validated batch to the drain task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the queue is full or the drain
    /// task has shut down.
    #[instrument(skip(self, reports), fields(batch_size = reports.len()))]
    pub fn enqueue(&self, reports: Vec<Report>) -> AppResult<()> {
        let count = reports.len() as u64;

        self.sender.try_send(reports).map_err(|e| match e {
            TrySendError::Full(_) => {
                AppError::Unavailable("Ingest queue is at capacity".to_string())
            }
            TrySendError::Closed(_) => {
                AppError::Unavailable("Ingest pipeline has shut down".to_string())
            }
        })?;

        self.uploads_accepted.fetch_add(1, Ordering::Relaxed);
        self.reports_enqueued.fetch_add(count, Ordering::Relaxed);

        debug!(count, "Batch enqueued for drain");
        Ok(())
    }

    /// Record a discarded decoy upload.
    pub fn record_decoy(&self) {
        self.decoys_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether the drain task is still holding the receiving end.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Total real uploads accepted.
    pub fn uploads_accepted(&self) -> u64 {
        self.uploads_accepted.load(Ordering::Relaxed)
    }

    /// Total reports enqueued.
    pub fn reports_enqueued(&self) -> u64 {
        self.reports_enqueued.load(Ordering::Relaxed)
    }

    /// Total decoy uploads discarded.
    pub fn decoys_discarded(&self) -> u64 {
        self.decoys_discarded.load(Ordering::Relaxed)
    }
}
