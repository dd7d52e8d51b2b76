use super::types::AggregateStats;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const AGGREGATES_CACHE_KEY: &str = "aggregates:latest";

/// Get the platform-appropriate cache directory
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("competence-score/aggregates"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/competence-score/aggregates",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Aggregate statistics with the time they were computed
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedAggregates {
    pub stats: AggregateStats,
    pub computed_at: i64, // Unix millis
}

/// Short-lived disk cache of aggregate statistics.
///
/// Entries expire after `ttl` and are dropped whenever a new submission
/// is stored.
#[derive(Debug, Clone)]
pub struct AggregateCache {
    path: PathBuf,
    ttl: Duration,
}

impl AggregateCache {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self { path, ttl }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached stats if present and still within the freshness window
    pub fn read_fresh(&self) -> Option<AggregateStats> {
        let cached = read_cached(&self.path)?;
        if is_fresh(&cached, self.ttl, Utc::now().timestamp_millis()) {
            Some(cached.stats)
        } else {
            None
        }
    }

    pub fn write(&self, stats: &AggregateStats) -> Result<()> {
        let entry = CachedAggregates {
            stats: stats.clone(),
            computed_at: Utc::now().timestamp_millis(),
        };
        let json = serde_json::to_vec(&entry)?;
        cacache::write_sync(&self.path, AGGREGATES_CACHE_KEY, &json)
            .context("Failed to write aggregates cache")?;
        Ok(())
    }

    /// Drop the cached entry; a missing entry is not an error
    pub fn invalidate(&self) -> Result<()> {
        match cacache::remove_sync(&self.path, AGGREGATES_CACHE_KEY) {
            Ok(()) => Ok(()),
            Err(cacache::Error::EntryNotFound(..)) => Ok(()),
            Err(e) => Err(e).context("Failed to invalidate aggregates cache"),
        }
    }
}

fn read_cached(cache_path: &Path) -> Option<CachedAggregates> {
    let bytes = cacache::read_sync(cache_path, AGGREGATES_CACHE_KEY).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Fresh while younger than `ttl`; entries from the future are stale
pub fn is_fresh(cached: &CachedAggregates, ttl: Duration, now_millis: i64) -> bool {
    let age = now_millis - cached.computed_at;
    age >= 0 && (age as u128) < ttl.as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn cached_at(computed_at: i64) -> CachedAggregates {
        CachedAggregates {
            stats: AggregateStats::default(),
            computed_at,
        }
    }

    #[test]
    fn test_is_fresh_window() {
        let ttl = Duration::from_secs(60);
        assert!(is_fresh(&cached_at(1_000), ttl, 1_000));
        assert!(is_fresh(&cached_at(1_000), ttl, 60_999));
        assert!(!is_fresh(&cached_at(1_000), ttl, 61_000));
        assert!(!is_fresh(&cached_at(5_000), ttl, 1_000));
    }

    #[test]
    fn test_write_read_invalidate() {
        let path = env::temp_dir().join("competence_score_test_aggregates_cache");
        let _ = std::fs::remove_dir_all(&path);
        let cache = AggregateCache::new(path.clone(), Duration::from_secs(60));

        assert!(cache.read_fresh().is_none());

        let stats = AggregateStats {
            count: 3,
            avg_total_score: 47,
            ..Default::default()
        };
        cache.write(&stats).unwrap();
        assert_eq!(cache.read_fresh(), Some(stats));

        cache.invalidate().unwrap();
        assert!(cache.read_fresh().is_none());
        // Invalidating twice is fine
        cache.invalidate().unwrap();

        let _ = std::fs::remove_dir_all(&path);
    }

    #[test]
    fn test_zero_ttl_never_fresh() {
        let path = env::temp_dir().join("competence_score_test_aggregates_zero_ttl");
        let _ = std::fs::remove_dir_all(&path);
        let cache = AggregateCache::new(path.clone(), Duration::ZERO);
        cache.write(&AggregateStats::default()).unwrap();
        assert!(cache.read_fresh().is_none());
        let _ = std::fs::remove_dir_all(&path);
    }
}
