use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use common::{Action, Result};

use crate::bucket::TimeBucket;

/// Identity of one alert: asset symbol, action and time bucket.
///
/// Rendered as `"{symbol}_{action}_{bucket}"`, e.g.
/// `BTCUSDT_buy_03:30 PM 01-05-2024`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub symbol: String,
    pub action: Action,
    pub bucket: String,
}

impl AlertKey {
    pub fn new(symbol: impl Into<String>, action: Action, bucket: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            bucket: bucket.into(),
        }
    }
}

impl std::fmt::Display for AlertKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.action, self.bucket)
    }
}

/// Alerts already sent, keyed by the rendered `AlertKey`.
///
/// Serialized as a flat JSON object of `key -> true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertCache {
    entries: BTreeMap<String, bool>,
}

impl AlertCache {
    pub fn is_duplicate(&self, key: &AlertKey) -> bool {
        self.entries.contains_key(&key.to_string())
    }

    /// Mark `key` as sent. Recording twice is a no-op.
    pub fn record(&mut self, key: &AlertKey) {
        self.entries.insert(key.to_string(), true);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Drop entries whose bucket started before `cutoff` (local time).
    /// Keys whose bucket cannot be parsed are kept. Returns how many went.
    pub fn prune_before(&mut self, cutoff: NaiveDateTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| match bucket_start(key) {
            Some(start) => start >= cutoff,
            None => true,
        });
        before - self.entries.len()
    }
}

fn bucket_start(key: &str) -> Option<NaiveDateTime> {
    let (_, bucket) = key.rsplit_once('_')?;
    NaiveDateTime::parse_from_str(bucket, TimeBucket::LABEL_FORMAT).ok()
}

/// JSON file holding the `AlertCache` between scans.
#[derive(Debug, Clone)]
pub struct AlertStore {
    path: PathBuf,
    /// How long entries are kept; `None` keeps them forever.
    retention: Option<Duration>,
}

impl AlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: None,
        }
    }

    /// Keep entries for `hours` after their bucket starts. 0 keeps everything.
    pub fn with_retention_hours(mut self, hours: u32) -> Self {
        self.retention = (hours > 0).then(|| Duration::hours(i64::from(hours)));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache. A missing or empty file is an empty cache.
    pub fn load(&self) -> Result<AlertCache> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No alert cache yet, starting empty");
                return Ok(AlertCache::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(AlertCache::default());
        }

        let cache: AlertCache = serde_json::from_str(&content)?;
        info!(path = %self.path.display(), entries = cache.len(), "Alert cache loaded");
        Ok(cache)
    }

    /// `load`, then drop entries older than the retention window as seen
    /// from `now` (local time).
    pub fn load_current(&self, now: NaiveDateTime) -> Result<AlertCache> {
        let mut cache = self.load()?;
        if let Some(retention) = self.retention {
            let pruned = cache.prune_before(now - retention);
            if pruned > 0 {
                debug!(pruned, remaining = cache.len(), "Expired alert keys dropped");
            }
        }
        Ok(cache)
    }

    /// Replace the file with `cache`: write a sibling temp file, sync it,
    /// then rename it over the target. The temp file never outlives a
    /// failed save.
    pub fn save(&self, cache: &AlertCache) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        let written = write_synced(&tmp, &serde_json::to_vec(cache)?)
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), entries = cache.len(), "Alert cache saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
