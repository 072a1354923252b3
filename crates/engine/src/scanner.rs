use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use common::{
    Action, Alert, Asset, AssetUniverse, Candle, Delivery, Error, MarketDataSource, Notifier,
    Result,
};
use dedup::{AlertKey, AlertStore, SharedAlertCache, TimeBucket};
use strategy::{PriceSeries, TrendPulse};

use crate::config::ScanConfig;

/// What happened to one asset during a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    /// Pair unknown to the data source, or too few closed candles.
    NoData,
    /// Enough candles to fetch but fewer than the oscillator needs.
    Insufficient,
    NoSignal,
    Alerted(Action),
    /// Same asset, action and time bucket already alerted.
    DuplicateSuppressed(Action),
    /// The notifier declined to send; the key stays unrecorded.
    DeliverySkipped(Action),
    Failed(String),
}

/// Totals for one scan, folded from the per-asset outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub assets: usize,
    /// Assets that reached the classifier.
    pub processed: usize,
    pub signals: usize,
    pub alerts_sent: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScanSummary {
    fn absorb(mut self, outcome: &AssetOutcome) -> Self {
        self.assets += 1;
        match outcome {
            AssetOutcome::NoData | AssetOutcome::Insufficient => self.skipped += 1,
            AssetOutcome::NoSignal => self.processed += 1,
            AssetOutcome::Alerted(_) => {
                self.processed += 1;
                self.signals += 1;
                self.alerts_sent += 1;
            }
            AssetOutcome::DuplicateSuppressed(_) => {
                self.processed += 1;
                self.signals += 1;
                self.duplicates += 1;
            }
            AssetOutcome::DeliverySkipped(_) => {
                self.processed += 1;
                self.signals += 1;
                self.skipped += 1;
            }
            AssetOutcome::Failed(_) => self.failed += 1,
        }
        self
    }
}

impl FromIterator<AssetOutcome> for ScanSummary {
    fn from_iter<I: IntoIterator<Item = AssetOutcome>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ScanSummary::default(), |summary, outcome| summary.absorb(&outcome))
    }
}

/// One full pass over the universe: fetch, evaluate, dedup, notify.
pub struct Scanner {
    universe: Arc<dyn AssetUniverse>,
    market: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    pulse: TrendPulse,
    store: AlertStore,
    bucket: TimeBucket,
    scan: ScanConfig,
}

/// Everything one asset's evaluation needs. Owned and cheap to clone, so
/// each worker future is `'static` and the scan can run on a spawned task.
#[derive(Clone)]
struct Worker {
    market: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    pulse: TrendPulse,
    scan: Arc<ScanConfig>,
    cache: SharedAlertCache,
    bucket_label: Arc<str>,
    local_time: DateTime<FixedOffset>,
}

impl Scanner {
    pub fn new(
        universe: Arc<dyn AssetUniverse>,
        market: Arc<dyn MarketDataSource>,
        notifier: Arc<dyn Notifier>,
        pulse: TrendPulse,
        store: AlertStore,
        bucket: TimeBucket,
        scan: ScanConfig,
    ) -> Self {
        Self {
            universe,
            market,
            notifier,
            pulse,
            store,
            bucket,
            scan,
        }
    }

    pub async fn run_once(&self) -> Result<ScanSummary> {
        self.run_at(Utc::now()).await
    }

    /// Scan with `now` as the scan time. Per-asset problems are folded into
    /// the summary; only universe, cache load and cache save failures abort.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ScanSummary> {
        let local_time = self.bucket.local(now);
        let cache = SharedAlertCache::new(self.store.load_current(local_time.naive_local())?);
        let bucket_label = self.bucket.label(now);
        let worker = Worker {
            market: self.market.clone(),
            notifier: self.notifier.clone(),
            pulse: self.pulse.clone(),
            scan: Arc::new(self.scan.clone()),
            cache: cache.clone(),
            bucket_label: Arc::from(bucket_label.as_str()),
            local_time,
        };

        let assets = self.universe.assets().await?;
        info!(
            assets = assets.len(),
            interval = %self.scan.interval,
            bucket = %bucket_label,
            "Scan started"
        );

        let summary: ScanSummary = stream::iter(assets)
            .map(|asset| {
                let worker = worker.clone();
                async move { worker.scan_asset(asset).await }
            })
            .buffer_unordered(self.scan.concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

        self.store.save(&cache.snapshot().await)?;

        info!(
            assets = summary.assets,
            processed = summary.processed,
            signals = summary.signals,
            sent = summary.alerts_sent,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            failed = summary.failed,
            "Scan complete"
        );
        Ok(summary)
    }
}

impl Worker {
    async fn scan_asset(&self, asset: Asset) -> AssetOutcome {
        let pair = asset.pair(&self.scan.quote);

        if self.scan.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.scan.request_delay_ms)).await;
        }

        // one extra row for the candle still forming
        let fetched = self
            .market
            .candles(&pair, &self.scan.interval, self.scan.candle_limit + 1)
            .await;
        let candles = match fetched {
            Ok(Some(candles)) => candles,
            Ok(None) => {
                debug!(%pair, "No market data");
                return AssetOutcome::NoData;
            }
            Err(e) => {
                warn!(%pair, error = %e, "Candle fetch failed");
                return AssetOutcome::Failed(e.to_string());
            }
        };

        let closed = self.closed_window(candles);
        if closed.len() < self.scan.min_candles {
            debug!(%pair, closed = closed.len(), "Not enough closed candles");
            return AssetOutcome::NoData;
        }

        let evaluation = match PriceSeries::from_candles(&closed, self.scan.price_source)
            .and_then(|series| self.pulse.evaluate(&series))
        {
            Ok(evaluation) => evaluation,
            Err(Error::InsufficientData { required, available }) => {
                debug!(%pair, required, available, "Series too short for the oscillator");
                return AssetOutcome::Insufficient;
            }
            Err(e) => {
                warn!(%pair, error = %e, "Evaluation failed");
                return AssetOutcome::Failed(e.to_string());
            }
        };

        debug!(
            %pair,
            wt1 = evaluation.wave1(),
            wt2 = evaluation.wave2(),
            oversold = evaluation.oversold,
            overbought = evaluation.overbought,
            bullish_cross = evaluation.bullish_cross,
            bearish_cross = evaluation.bearish_cross,
            verdict = %evaluation.verdict,
            "Wave reading"
        );

        let Some(action) = evaluation.verdict.action() else {
            return AssetOutcome::NoSignal;
        };
        info!(
            %pair,
            %action,
            wt1 = evaluation.wave1(),
            wt2 = evaluation.wave2(),
            "Signal detected"
        );

        let key = AlertKey::new(pair.clone(), action, &*self.bucket_label);
        if !self.cache.try_claim(&key).await {
            info!(%key, "Duplicate alert suppressed");
            return AssetOutcome::DuplicateSuppressed(action);
        }

        let alert = Alert {
            asset,
            pair,
            action,
            wave1: evaluation.wave1(),
            wave2: evaluation.wave2(),
            interval: self.scan.interval.clone(),
            local_time: self.local_time,
            bucket: self.bucket_label.to_string(),
        };

        match self.notifier.deliver(&alert).await {
            Ok(Delivery::Sent) => {
                self.cache.confirm(&key).await;
                AssetOutcome::Alerted(action)
            }
            Ok(Delivery::Skipped { reason }) => {
                self.cache.release(&key).await;
                info!(%key, %reason, "Alert skipped by notifier");
                AssetOutcome::DeliverySkipped(action)
            }
            Err(e) => {
                self.cache.release(&key).await;
                warn!(%key, error = %e, "Alert delivery failed");
                AssetOutcome::Failed(e.to_string())
            }
        }
    }

    /// Closed candles only, newest `candle_limit` of them.
    fn closed_window(&self, candles: Vec<Candle>) -> Vec<Candle> {
        let mut closed: Vec<Candle> = candles.into_iter().filter(|c| c.is_closed).collect();
        if closed.len() > self.scan.candle_limit {
            closed.drain(..closed.len() - self.scan.candle_limit);
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_outcome() {
        let summary: ScanSummary = vec![
            AssetOutcome::NoData,
            AssetOutcome::Insufficient,
            AssetOutcome::NoSignal,
            AssetOutcome::Alerted(Action::Buy),
            AssetOutcome::DuplicateSuppressed(Action::Sell),
            AssetOutcome::DeliverySkipped(Action::Buy),
            AssetOutcome::Failed("boom".into()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            summary,
            ScanSummary {
                assets: 7,
                processed: 4,
                signals: 3,
                alerts_sent: 1,
                duplicates: 1,
                skipped: 3,
                failed: 1,
            }
        );
    }

    #[test]
    fn empty_scan_is_zeroed() {
        let summary: ScanSummary = Vec::<AssetOutcome>::new().into_iter().collect();
        assert_eq!(summary, ScanSummary::default());
    }
}
