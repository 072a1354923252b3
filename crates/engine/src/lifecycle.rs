use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use common::{Error, Result};

use crate::scanner::Scanner;

/// Cloneable handle that stops a running `Scheduler`.
#[derive(Clone)]
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Ask the scheduler to stop. A scan already in progress finishes first.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Runs the scanner every `period`, one scan at a time.
pub struct Scheduler {
    scanner: Scanner,
    period: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl Scheduler {
    /// Fails on a zero `period`.
    pub fn new(scanner: Scanner, period: Duration) -> Result<(Self, SchedulerHandle)> {
        if period.is_zero() {
            return Err(Error::InvalidParameter(
                "scan period must be greater than zero".into(),
            ));
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok((
            Self {
                scanner,
                period,
                shutdown_rx,
            },
            SchedulerHandle { shutdown_tx },
        ))
    }

    /// Scan immediately, then on every tick until shut down. Returns the
    /// number of scans started. A failed scan is logged and the next tick
    /// tries again.
    pub async fn run(mut self) -> usize {
        info!(period_secs = self.period.as_secs(), "Scheduler started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut scans = 0;

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    scans += 1;
                    match self.scanner.run_once().await {
                        Ok(summary) => info!(scan = scans, sent = summary.alerts_sent, "Scheduled scan finished"),
                        Err(e) => error!(scan = scans, error = %e, "Scheduled scan failed"),
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    // sender dropped counts as shutdown
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(scans, "Scheduler stopped");
        scans
    }
}
