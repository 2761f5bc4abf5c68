use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use super::{SessionManager, SweepReport};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that periodically purges dead sessions.
///
/// Validation already removes expired and orphaned sessions lazily; the
/// sweeper bounds how long unobserved ones linger in memory.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    manager: Arc<SessionManager>,
    interval: Duration,
}

impl SessionSweeper {
    /// Intervals shorter than one second are raised to one second.
    pub fn new(manager: Arc<SessionManager>, interval: Duration) -> Self {
        Self {
            manager,
            interval: interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sweep_once(&self) -> SweepReport {
        let report = self.manager.purge_expired();
        if report.removed() > 0 {
            debug!(
                expired = report.expired,
                orphaned = report.orphaned,
                remaining = self.manager.len(),
                "Session sweep removed dead sessions"
            );
        }
        report
    }

    /// Spawn the sweep loop on the current Tokio runtime. Abort the returned
    /// handle to stop it.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }
}
