//! Per-host rate limiting and a time-based cache for registry lookups.
//!
//! Both are deliberately simple: a fixed queries-per-minute ceiling per
//! host with a sleep-until-window-clears wait, and a JSON-on-disk cache
//! keyed by `manager:name` whose only invalidation signal is age.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::sleep;

/// Documented per-host rate ceilings (queries per minute).
const HOST_LIMITS: &[(&str, u32)] = &[
    ("registry.npmjs.org", 300),
    ("pypi.org", 90),
    ("registry-1.docker.io", 100),
    ("crates.io", 60),
    ("proxy.golang.org", 120),
];

/// Fixed base for exponential backoff on 429 / connection-reset responses.
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const MAX_RETRIES: u32 = 5;

fn limit_for_host(host: &str) -> u32 {
    HOST_LIMITS
        .iter()
        .find(|(h, _)| *h == host)
        .map_or(60, |(_, limit)| *limit)
}

/// Tracks, per host, the timestamp of the last granted request and
/// enforces the minimum spacing implied by that host's queries-per-minute
/// limit. One instance is shared process-wide (behind an `Arc` at the call
/// site) across every [`super::PackageManager`] implementation.
pub struct HostRateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
}

impl HostRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self { last_request: Mutex::new(HashMap::new()) }
    }

    /// Blocks until it is this host's turn under its per-minute ceiling.
    pub async fn acquire(&self, host: &str) {
        let min_spacing = Duration::from_secs_f64(60.0 / f64::from(limit_for_host(host)));
        let wait = {
            let mut guard = self.last_request.lock().expect("rate limiter mutex poisoned");
            let now = Instant::now();
            let wait = guard
                .get(host)
                .map(|last| min_spacing.saturating_sub(now.duration_since(*last)))
                .unwrap_or(Duration::ZERO);
            guard.insert(host.to_owned(), now + wait);
            wait
        };
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    /// Retries `attempt` with fixed-constant exponential backoff on a
    /// transient failure (`attempt` returns `Ok(None)` to signal "retry
    /// me", matching a 429 or connection-reset response). Gives up after
    /// [`MAX_RETRIES`], returning `None`.
    pub async fn retry_with_backoff<F, Fut, T>(&self, mut attempt: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Option<T>>,
    {
        for retry in 0..MAX_RETRIES {
            if let Some(value) = attempt().await {
                return Some(value);
            }
            sleep(BACKOFF_BASE * 2u32.pow(retry)).await;
        }
        None
    }
}

impl Default for HostRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    stored_at_secs: u64,
}

/// A flat-file cache under `.pf/cache/deps/` keyed by `manager:name`,
/// separated into a versions cache (24h TTL) and a docs cache (7d TTL).
/// Invalidity is time-based only — there is no content hash or ETag.
pub struct DepCache {
    dir: PathBuf,
}

impl DepCache {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn get(&self, key: &str, ttl: Duration) -> Option<String> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
        if now.saturating_sub(entry.stored_at_secs) > ttl.as_secs() {
            return None;
        }
        Some(entry.value)
    }

    pub fn put(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let stored_at_secs =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let entry = CacheEntry { value: value.to_owned(), stored_at_secs };
        let serialized = serde_json::to_string(&entry).unwrap_or_default();
        fs::write(self.entry_path(key), serialized)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe_name}.json"))
    }
}

/// 24h TTL for resolved version lookups.
pub const VERSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// 7d TTL for fetched documentation.
pub const DOCS_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trips_within_ttl() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cache = DepCache::new(tmp.path().join("deps"));
        cache.put("npm:react", "18.2.0").expect("write cache entry");
        assert_eq!(cache.get("npm:react", VERSION_TTL).as_deref(), Some("18.2.0"));
    }

    #[test]
    fn cache_miss_on_unknown_key() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cache = DepCache::new(tmp.path().join("deps"));
        assert_eq!(cache.get("npm:does-not-exist", VERSION_TTL), None);
    }

    #[test]
    fn cache_entry_older_than_ttl_is_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cache = DepCache::new(tmp.path().join("deps"));
        let stale_path = cache.entry_path("npm:react");
        fs::create_dir_all(&tmp.path().join("deps")).expect("mkdir");
        let stale = CacheEntry { value: "18.2.0".to_owned(), stored_at_secs: 0 };
        fs::write(stale_path, serde_json::to_string(&stale).expect("serialize")).expect("write");
        assert_eq!(cache.get("npm:react", VERSION_TTL), None);
    }

    #[tokio::test]
    async fn retry_with_backoff_returns_first_success() {
        let limiter = HostRateLimiter::new();
        let mut calls = 0;
        let result = limiter
            .retry_with_backoff(|| {
                calls += 1;
                let succeed = calls >= 2;
                async move { if succeed { Some(42) } else { None } }
            })
            .await;
        assert_eq!(result, Some(42));
        assert_eq!(calls, 2);
    }
}
