//! Cancellable once-per-period tick driver.
//!
//! [`TickScheduler::spawn`] runs a tokio task that calls [`TickTarget::on_tick`]
//! every period. Late ticks are skipped rather than replayed, so a stalled
//! runtime never makes timers jump by more than one second per tick.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::LaundryState;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Something driven by the scheduler
#[async_trait]
pub trait TickTarget: Send + Sync + 'static {
    async fn on_tick(&self);
}

#[async_trait]
impl TickTarget for Arc<Mutex<LaundryState>> {
    async fn on_tick(&self) {
        let summary = self.lock().await.tick();
        if !summary.changes.is_empty() {
            debug!(
                advanced = %summary.advanced,
                changes = ?summary.changes,
                "Tick changed machine status"
            );
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    period: Duration,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking `target`. The first tick lands one full period from now.
    pub fn spawn<T: TickTarget>(&self, target: T) -> TickHandle {
        let period = self.period;
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let first_tick = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut interval = interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;

                    // Fires on stop() and when the handle is dropped
                    _ = stop_rx.changed() => break,

                    _ = interval.tick() => {
                        target.on_tick().await;
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            debug!("Tick loop exited");
        });

        info!(period_ms = %period.as_millis(), "Tick scheduler started");

        TickHandle {
            stop_tx,
            task: Some(task),
            ticks,
        }
    }
}

/// Handle to a running tick loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct TickHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl TickHandle {
    /// Ticks applied so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the loop and wait for it to exit. No tick is applied after this
    /// returns. Returns the total number of ticks applied.
    pub async fn stop(mut self) -> u64 {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Tick loop ended abnormally");
            }
        }

        let ticks = self.ticks();
        info!(ticks = %ticks, "Tick scheduler stopped");
        ticks
    }
}
