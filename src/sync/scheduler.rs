use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::config::SyncOutcome;
use super::manager::SyncManager;

/// Messages to control the sync scheduler
#[derive(Debug)]
pub enum SyncSchedulerMessage {
    /// Run a pass now (still subject to the time gate)
    Trigger,
    /// Stop the loop
    Shutdown,
}

/// Handle for the periodic sync scheduler
pub struct SyncScheduler {
    sender: mpsc::Sender<SyncSchedulerMessage>,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Ask for a pass outside the regular cadence
    pub fn trigger(&self) {
        let _ = self.sender.try_send(SyncSchedulerMessage::Trigger);
    }

    /// Shut down the scheduler
    pub fn shutdown(&self) {
        let _ = self.sender.try_send(SyncSchedulerMessage::Shutdown);
    }

    /// Get a clone of the internal sender for external message producers
    pub fn sender_clone(&self) -> mpsc::Sender<SyncSchedulerMessage> {
        self.sender.clone()
    }

    /// Wait for the loop to finish after [`shutdown`](Self::shutdown)
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            log::error!("Sync scheduler: task ended abnormally: {}", e);
        }
    }
}

/// Start the periodic sync scheduler.
///
/// Runs a pass immediately, then every `period`, until shut down. Every pass
/// goes through the manager's time gate, so a short `period` only means the
/// gate is checked more often.
pub fn start_sync_scheduler(manager: Arc<SyncManager>, period: Duration) -> SyncScheduler {
    let (tx, rx) = mpsc::channel(32);

    let handle = tokio::spawn(async move {
        sync_scheduler_loop(manager, period, rx).await;
    });

    SyncScheduler { sender: tx, handle }
}

async fn run_scheduled_pass(manager: &SyncManager, reason: &str) {
    match manager.run_pass().await {
        Ok(SyncOutcome::Completed(report)) => {
            log::info!(
                "Sync scheduler: {} pass complete - created={}, appended={}",
                reason,
                report.documents_created,
                report.increments_appended,
            );
        }
        Ok(SyncOutcome::RateGated { elapsed_minutes }) => {
            log::debug!(
                "Sync scheduler: {} pass skipped, last sync {:.1} minutes ago",
                reason,
                elapsed_minutes
            );
        }
        Ok(SyncOutcome::AlreadyRunning) => {
            log::debug!("Sync scheduler: {} pass skipped, already running", reason);
        }
        Err(e) => {
            log::error!("Sync scheduler: {} pass failed: {}", reason, e);
        }
    }
}

/// Main scheduler loop
async fn sync_scheduler_loop(
    manager: Arc<SyncManager>,
    period: Duration,
    mut receiver: mpsc::Receiver<SyncSchedulerMessage>,
) {
    log::info!(
        "Sync scheduler started, checking every {:.0}s",
        period.as_secs_f64()
    );

    run_scheduled_pass(&manager, "startup").await;

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the startup pass covered it
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_scheduled_pass(&manager, "periodic").await;
            }

            msg = receiver.recv() => {
                match msg {
                    Some(SyncSchedulerMessage::Trigger) => {
                        log::info!("Sync scheduler: manual trigger");
                        run_scheduled_pass(&manager, "manual").await;
                    }
                    Some(SyncSchedulerMessage::Shutdown) | None => {
                        log::info!("Sync scheduler: shutting down");
                        break;
                    }
                }
            }
        }
    }
}
