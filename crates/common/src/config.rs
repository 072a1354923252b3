use crate::{Error, NotifyMode, Result};

/// Process configuration loaded from environment variables at startup.
///
/// Secrets and file locations live here; tunables for the oscillator, the
/// universe and the scan loop live in the scanner TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    // Notification
    pub notify_mode: NotifyMode,
    pub telegram_token: Option<String>,
    pub telegram_chat_ids: Vec<i64>,

    // Data sources
    pub coingecko_api_key: Option<String>,

    // Files
    pub alert_cache_path: String,
    pub scanner_config_path: String,

    /// Seconds between scans. `None` runs a single scan and exits.
    pub scan_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let notify_mode = match optional("NOTIFY_MODE").map(|v| v.to_lowercase()).as_deref() {
            None | Some("paper") => NotifyMode::Paper,
            Some("live") => NotifyMode::Live,
            Some(other) => {
                return Err(Error::Config(format!(
                    "NOTIFY_MODE must be 'paper' or 'live', got: '{other}'"
                )))
            }
        };

        let telegram_chat_ids = match optional("TELEGRAM_CHAT_IDS") {
            Some(raw) => parse_chat_ids(&raw)?,
            None => Vec::new(),
        };
        let telegram_token = optional("TELEGRAM_BOT_TOKEN");

        if notify_mode == NotifyMode::Live {
            if telegram_token.is_none() {
                return Err(Error::Config(
                    "TELEGRAM_BOT_TOKEN is required when NOTIFY_MODE=live".into(),
                ));
            }
            if telegram_chat_ids.is_empty() {
                return Err(Error::Config(
                    "TELEGRAM_CHAT_IDS is required when NOTIFY_MODE=live".into(),
                ));
            }
        }

        let scan_interval_secs = match optional("SCAN_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    Error::Config(format!("SCAN_INTERVAL_SECS must be an integer, got: '{raw}'"))
                })?;
                (secs > 0).then_some(secs)
            }
            None => None,
        };

        Ok(Config {
            notify_mode,
            telegram_token,
            telegram_chat_ids,
            coingecko_api_key: optional("COINGECKO_API_KEY"),
            alert_cache_path: optional("ALERT_CACHE_PATH")
                .unwrap_or_else(|| "last_alerts.json".to_string()),
            scanner_config_path: optional("SCANNER_CONFIG_PATH")
                .unwrap_or_else(|| "config/trendpulse.toml".to_string()),
            scan_interval_secs,
        })
    }
}

fn parse_chat_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                Error::Config(format!("TELEGRAM_CHAT_IDS contains non-numeric ID: '{s}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_paper_single_run() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.notify_mode, NotifyMode::Paper);
        assert_eq!(cfg.alert_cache_path, "last_alerts.json");
        assert_eq!(cfg.scanner_config_path, "config/trendpulse.toml");
        assert!(cfg.scan_interval_secs.is_none());
        assert!(cfg.telegram_chat_ids.is_empty());
    }

    #[test]
    fn live_mode_requires_telegram_credentials() {
        let err = Config::from_lookup(lookup(&[("NOTIFY_MODE", "live")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let cfg = Config::from_lookup(lookup(&[
            ("NOTIFY_MODE", "LIVE"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_IDS", "42, -1001"),
        ]))
        .unwrap();
        assert_eq!(cfg.notify_mode, NotifyMode::Live);
        assert_eq!(cfg.telegram_chat_ids, vec![42, -1001]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("NOTIFY_MODE", "demo")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TELEGRAM_CHAT_IDS", "12,abc")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SCAN_INTERVAL_SECS", "soon")])).is_err());
    }

    #[test]
    fn zero_interval_means_run_once() {
        let cfg = Config::from_lookup(lookup(&[("SCAN_INTERVAL_SECS", "0")])).unwrap();
        assert!(cfg.scan_interval_secs.is_none());
        let cfg = Config::from_lookup(lookup(&[("SCAN_INTERVAL_SECS", "900")])).unwrap();
        assert_eq!(cfg.scan_interval_secs, Some(900));
    }
}
