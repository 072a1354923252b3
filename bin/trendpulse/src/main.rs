use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{Config, Notifier, NotifyMode};
use engine::{BinanceClient, CoinGeckoClient, ScannerFileConfig, Scanner, Scheduler};
use paper::PaperNotifier;
use strategy::TrendPulse;
use telegram::{ChartLinks, TelegramNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid environment configuration")?;
    let file = ScannerFileConfig::load(&cfg.scanner_config_path)
        .with_context(|| format!("failed to load {}", cfg.scanner_config_path))?;
    info!(
        mode = %cfg.notify_mode,
        interval = %file.scan.interval,
        every_secs = ?cfg.scan_interval_secs,
        "TrendPulse starting"
    );

    // ── Oscillator ────────────────────────────────────────────────────────────
    let pulse = TrendPulse::new(file.oscillator.clone()).context("invalid oscillator settings")?;
    let bucket = file.alerts.bucket().context("invalid alert bucket settings")?;

    // ── Collaborators ─────────────────────────────────────────────────────────
    let universe = CoinGeckoClient::new(file.universe.clone(), cfg.coingecko_api_key.clone())?;
    let market = BinanceClient::new()?;

    let notifier: Arc<dyn Notifier> = match cfg.notify_mode {
        NotifyMode::Live => {
            let token = cfg
                .telegram_token
                .clone()
                .context("TELEGRAM_BOT_TOKEN is required in live mode")?;
            let charts = ChartLinks::new(&file.notify.chart_exchange, file.notify.verify_chart_link)?;
            info!("Live mode, alerts go to Telegram");
            Arc::new(TelegramNotifier::new(token, &cfg.telegram_chat_ids, charts))
        }
        NotifyMode::Paper => {
            info!("Paper mode, alerts are only logged");
            Arc::new(PaperNotifier::new())
        }
    };

    let scanner = Scanner::new(
        Arc::new(universe),
        Arc::new(market),
        notifier,
        pulse,
        file.alerts.store(&cfg.alert_cache_path),
        bucket,
        file.scan.clone(),
    );

    // ── Run ───────────────────────────────────────────────────────────────────
    let Some(secs) = cfg.scan_interval_secs else {
        let summary = scanner.run_once().await.context("scan failed")?;
        info!(
            processed = summary.processed,
            signals = summary.signals,
            sent = summary.alerts_sent,
            "Single scan finished"
        );
        return Ok(());
    };

    let (scheduler, handle) =
        Scheduler::new(scanner, Duration::from_secs(secs)).context("invalid scan interval")?;
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping after the current scan"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, stopping"),
        }
        handle.shutdown();
    });

    let scans = scheduler.run().await;
    info!(scans, "TrendPulse stopped");
    Ok(())
}
