use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use common::{Alert, Delivery, Notifier, Result};

/// Notifier for paper mode: alerts are logged and kept in memory, nothing
/// leaves the process.
///
/// Every alert counts as sent, so paper runs exercise dedup exactly like
/// live runs.
#[derive(Debug, Clone, Default)]
pub struct PaperNotifier {
    /// Alerts delivered so far, oldest first.
    sent: Arc<RwLock<Vec<Alert>>>,
}

impl PaperNotifier {
    pub fn new() -> Self {
        info!("PaperNotifier initialized, alerts will only be logged");
        Self::default()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.sent.read().await.clone()
    }

    /// Shared view of the delivered alerts (for tests and reporting).
    pub fn alerts_handle(&self) -> Arc<RwLock<Vec<Alert>>> {
        self.sent.clone()
    }
}

#[async_trait]
impl Notifier for PaperNotifier {
    async fn deliver(&self, alert: &Alert) -> Result<Delivery> {
        info!(
            pair = %alert.pair,
            action = %alert.action,
            wt1 = format!("{:.2}", alert.wave1),
            wt2 = format!("{:.2}", alert.wave2),
            interval = %alert.interval,
            time = %alert.local_time.format("%I:%M %p"),
            "[paper] alert"
        );
        self.sent.write().await.push(alert.clone());
        Ok(Delivery::Sent)
    }
}
