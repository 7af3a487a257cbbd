use tokio::sync::watch;
use tracing::{info, warn};

/// Graceful shutdown coordinator for the dashboard
///
/// Resolves on Ctrl-C or when any [`ShutdownTrigger`] fires, whichever
/// comes first.
pub struct ShutdownCoordinator {
    trigger: watch::Sender<bool>,
    signal: watch::Receiver<bool>,
}

/// Cloneable handle that requests shutdown
#[derive(Clone)]
pub struct ShutdownTrigger {
    trigger: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn shutdown(&self) {
        // send_replace never fails, even without receivers
        self.trigger.send_replace(true);
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (trigger, signal) = watch::channel(false);
        Self { trigger, signal }
    }

    pub fn trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger {
            trigger: self.trigger.clone(),
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.signal.borrow()
    }

    /// Wait for a trigger only, ignoring OS signals
    pub async fn wait_for_trigger(&self) {
        let mut signal = self.signal.clone();
        // The coordinator owns a sender, so this only ends on a real trigger
        let _ = signal.wait_for(|stop| *stop).await;
    }

    /// Wait for Ctrl-C or a trigger
    pub async fn wait_for_shutdown(&self) {
        info!("Shutdown coordinator ready - will shutdown gracefully on Ctrl-C");

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received Ctrl-C, shutting down"),
                    Err(e) => {
                        warn!(error = %e, "Failed to listen for Ctrl-C");
                        // Without a signal handler, fall back to triggers only
                        self.wait_for_trigger().await;
                    }
                }
            }
            _ = self.wait_for_trigger() => info!("Shutdown requested"),
        }

        self.trigger.send_replace(true);
    }
}
