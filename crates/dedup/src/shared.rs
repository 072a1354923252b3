use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::store::{AlertCache, AlertKey};

/// Alert cache shared by concurrent scan workers.
///
/// A worker must `try_claim` a key before dispatching. The claim is the
/// check-then-act step: it fails if the key was already sent or another
/// worker holds it. After dispatch the worker either `confirm`s (sent) or
/// `release`s (failed or skipped) the claim.
#[derive(Debug, Clone, Default)]
pub struct SharedAlertCache {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    cache: AlertCache,
    in_flight: HashSet<String>,
}

impl SharedAlertCache {
    pub fn new(cache: AlertCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                cache,
                in_flight: HashSet::new(),
            })),
        }
    }

    /// Reserve `key` for dispatch. `false` means the alert is a duplicate.
    pub async fn try_claim(&self, key: &AlertKey) -> bool {
        let mut inner = self.inner.lock().await;
        let rendered = key.to_string();
        if inner.cache.is_duplicate(key) || inner.in_flight.contains(&rendered) {
            debug!(key = %rendered, "Alert key already sent or in flight");
            return false;
        }
        inner.in_flight.insert(rendered);
        true
    }

    /// Record a claimed key as sent.
    pub async fn confirm(&self, key: &AlertKey) {
        let mut inner = self.inner.lock().await;
        inner.in_flight.remove(&key.to_string());
        inner.cache.record(key);
    }

    /// Drop a claim without recording it.
    pub async fn release(&self, key: &AlertKey) {
        self.inner.lock().await.in_flight.remove(&key.to_string());
    }

    pub async fn is_duplicate(&self, key: &AlertKey) -> bool {
        self.inner.lock().await.cache.is_duplicate(key)
    }

    /// Copy of the sent-alert cache, for persisting at the end of a scan.
    pub async fn snapshot(&self) -> AlertCache {
        self.inner.lock().await.cache.clone()
    }
}
