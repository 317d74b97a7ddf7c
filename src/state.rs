//! Shared application state for Axum handlers.
//!
//! This module provides thread-safe, clonable state shared across all
//! request handlers:
//!
//! - **Ingest service**: bounded handoff queue for accepted report batches
//! - **Noise source**: the padding-delay distribution, built once at startup
//! - **Configuration**: immutable runtime configuration access
//!
//! # Thread Safety
//!
//! All components are wrapped in `Arc` or are `Copy`; nothing here is
//! mutated during request handling, so handlers never take a lock.
//!
//! # Structured Concurrency
//!
//! The background drain task is managed with `tokio_util::task::TaskTracker`
//! and a `CancellationToken` for proper lifecycle management. Call
//! `shutdown()` to gracefully stop it before application exit.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::Config;
use crate::delay::NoiseDelay;
use crate::error::AppResult;
use crate::models::Report;
use crate::services::IngestService;

/// Shared application state for Axum handlers.
///
/// This struct is cloned for each request handler. All internal data is
/// either `Copy` or wrapped in `Arc` for efficient sharing.
///
/// # Lifecycle
///
/// The drain task is spawned when the state is created. Call `shutdown()`
/// before dropping to ensure it finishes cleanly:
///
/// ```rust,ignore
/// let state = AppState::new(config)?;
/// // ... serve requests ...
/// state.shutdown().await;  // Drain task completes before exit
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Handoff queue between the HTTP layer and the drain task
    pub ingest: IngestService,
    /// Padding-delay distribution for the slow-down layer
    pub noise: NoiseDelay,
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Tracks the drain task for graceful shutdown
    task_tracker: TaskTracker,
    /// Cancellation token for signaling the drain task to stop
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Create new application state from configuration.
    ///
    /// # Background Tasks
    ///
    /// This spawns the drain task that consumes accepted batches from the
    /// ingest queue. Call `shutdown()` to terminate it gracefully.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the noise distribution parameters in
    /// the configuration are invalid.
    pub fn new(config: Config) -> AppResult<Self> {
        let noise = NoiseDelay::from_config(&config)?;
        let (ingest, receiver) = IngestService::new(config.ingest_queue_depth);
        let task_tracker = TaskTracker::new();
        let cancellation_token = CancellationToken::new();

        let state = Self {
            config: Arc::new(config),
            ingest,
            noise,
            started_at: Instant::now(),
            task_tracker,
            cancellation_token,
        };

        state.spawn_drain_task(receiver);

        Ok(state)
    }

    /// Spawn the background drain task.
    ///
    /// The task is the single consumer of the ingest queue and the
    /// integration point for a durable downstream: a real deployment would
    /// forward each batch to its persistence pipeline from here.
    ///
    /// The task is tracked by `task_tracker` and respects
    /// `cancellation_token` for graceful shutdown; batches already queued
    /// when cancellation arrives are still drained before exit.
    fn spawn_drain_task(&self, mut receiver: mpsc::Receiver<Vec<Report>>) {
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            loop {
                tokio::select! {
                    biased; // Check cancellation first

                    _ = cancel.cancelled() => {
                        debug!("Drain task received cancellation signal");
                        break;
                    }
                    batch = receiver.recv() => {
                        match batch {
                            Some(reports) => drain_batch(reports),
                            None => {
                                debug!("Ingest queue closed, drain task exiting");
                                return;
                            }
                        }
                    }
                }
            }

            // Flush whatever was accepted before the cancellation signal.
            receiver.close();
            while let Ok(reports) = receiver.try_recv() {
                drain_batch(reports);
            }

            debug!("Drain task shutting down");
        });
    }

    /// Gracefully shutdown the background drain task.
    ///
    /// This method:
    /// 1. Signals the task to stop via the cancellation token
    /// 2. Closes the task tracker (prevents new tasks)
    /// 3. Waits for the task to finish draining and complete
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Consume one accepted batch.
///
/// This build stops at the handoff boundary: the batch is acknowledged and
/// dropped. Downstream persistence plugs in here.
fn drain_batch(reports: Vec<Report>) {
    debug!(count = reports.len(), "Drained report batch");
}
