//! Periodic Refresh Background Task
//!
//! Calls [`RefreshTarget::load_data`] once immediately and then on a fixed
//! period until stopped. Each iteration runs in its own task:
//!
//! - a tick that finds the previous iteration still running is dropped and
//!   counted, never queued
//! - stopping prevents future ticks but leaves an in-flight iteration to
//!   finish on its own
//!
//! The task holds only a weak reference to its target, so it never keeps
//! the service alive and exits once the service is dropped.
//!
//! # Configuration
//!
//! ```rust
//! use courtside_sync::jobs::RefreshConfig;
//! use std::time::Duration;
//!
//! let config = RefreshConfig {
//!     interval: Duration::from_secs(5), // Re-pull every 5 seconds
//! };
//! ```

use async_trait::async_trait;
use courtside_core::constants::DEFAULT_REFRESH_INTERVAL_MS;
use courtside_core::SyncResult;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the refresh background task.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between refresh ticks (default: 5 seconds)
    pub interval: Duration,
}

/// Shortest period the loop will tick at. A zero period is raised to this.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

impl RefreshConfig {
    /// The interval actually used, never below [`MIN_REFRESH_INTERVAL`].
    pub fn period(&self) -> Duration {
        self.interval.max(MIN_REFRESH_INTERVAL)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
        }
    }
}

// ============================================================================
// TARGET
// ============================================================================

/// Something the refresh loop can reload.
#[async_trait]
pub trait RefreshTarget: Send + Sync + 'static {
    /// Reload the full dataset, returning how many records were loaded.
    async fn load_data(&self) -> SyncResult<usize>;
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for refresh activity.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Ticks observed, including dropped ones
    pub ticks: AtomicU64,

    /// Iterations that completed successfully
    pub runs: AtomicU64,

    /// Iterations that returned an error
    pub failures: AtomicU64,

    /// Ticks skipped because an iteration was still in flight
    pub ticks_dropped: AtomicU64,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> RefreshSnapshot {
        RefreshSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            runs: self.runs.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of refresh metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSnapshot {
    pub ticks: u64,
    pub runs: u64,
    pub failures: u64,
    pub ticks_dropped: u64,
}

// ============================================================================
// HANDLE
// ============================================================================

/// Control handle for a running refresh loop.
///
/// Dropping the handle stops the loop as if [`stop`](Self::stop) was called.
#[derive(Debug)]
pub struct RefreshHandle {
    shutdown_tx: watch::Sender<bool>,
    metrics: Arc<RefreshMetrics>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Signal the loop to stop. Idempotent.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Whether the loop task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn metrics(&self) -> RefreshSnapshot {
        self.metrics.snapshot()
    }

    /// Stop the loop and wait for it to exit. In-flight iterations are not
    /// awaited.
    pub async fn shutdown(self) -> RefreshSnapshot {
        self.stop();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Refresh task ended abnormally");
        }
        self.metrics.snapshot()
    }
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Spawn the refresh loop on the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_refresh_task<T: RefreshTarget>(target: Weak<T>, config: RefreshConfig) -> RefreshHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let metrics = Arc::new(RefreshMetrics::new());
    let task = tokio::spawn(refresh_task(
        target,
        config,
        shutdown_rx,
        Arc::clone(&metrics),
    ));

    RefreshHandle {
        shutdown_tx,
        metrics,
        task,
    }
}

async fn refresh_task<T: RefreshTarget>(
    target: Weak<T>,
    config: RefreshConfig,
    mut shutdown_rx: watch::Receiver<bool>,
    metrics: Arc<RefreshMetrics>,
) {
    let in_flight = Arc::new(AtomicBool::new(false));

    let period = config.period();
    if period != config.interval {
        tracing::warn!(
            requested_ms = config.interval.as_millis() as u64,
            period_ms = period.as_millis() as u64,
            "Refresh interval below minimum, raised"
        );
    }
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_ms = period.as_millis() as u64,
        "Refresh task started"
    );

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Refresh task shutting down");
                    break;
                }
            }

            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else {
                    tracing::info!("Refresh target dropped, stopping refresh task");
                    break;
                };
                metrics.ticks.fetch_add(1, Ordering::Relaxed);

                if in_flight.swap(true, Ordering::AcqRel) {
                    metrics.ticks_dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("Previous refresh still running, tick dropped");
                    continue;
                }

                tokio::spawn(run_once(target, Arc::clone(&metrics), Arc::clone(&in_flight)));
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        ticks = snapshot.ticks,
        runs = snapshot.runs,
        failures = snapshot.failures,
        ticks_dropped = snapshot.ticks_dropped,
        "Refresh task completed"
    );
}

/// Clears the in-flight flag when dropped, including on panic or abort.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Perform one refresh iteration and release the in-flight flag.
async fn run_once<T: RefreshTarget>(
    target: Arc<T>,
    metrics: Arc<RefreshMetrics>,
    in_flight: Arc<AtomicBool>,
) {
    let _guard = InFlightGuard(in_flight);
    match target.load_data().await {
        Ok(count) => {
            metrics.runs.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(count, "Refresh iteration completed");
        }
        Err(e) => {
            metrics.failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %e, "Refresh iteration failed");
        }
    }
}
