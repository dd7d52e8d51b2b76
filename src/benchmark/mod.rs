pub mod aggregates;
pub mod cache;
pub mod comparison;
pub mod types;

pub use aggregates::aggregate_submissions;
pub use cache::{get_cache_path, AggregateCache};
pub use comparison::calculate_market_comparison;
pub use types::{AggregateStats, BenchmarkEntry, ComparisonPoint, MarketBenchmark};

use anyhow::Result;
use std::path::Path;

/// Current aggregate statistics, from cache when fresh.
///
/// A stale or unreadable cache falls back to recomputing from the store.
/// Cache write failures are logged and otherwise ignored.
pub fn load_aggregates(
    store_path: &Path,
    cache: &AggregateCache,
    profiling_questions: &[String],
    refresh: bool,
) -> Result<AggregateStats> {
    if !refresh {
        if let Some(stats) = cache.read_fresh() {
            tracing::debug!(count = stats.count, "using cached aggregates");
            return Ok(stats);
        }
    }

    let store = crate::store::load_store(store_path)?;
    let stats = aggregate_submissions(&store.submissions, profiling_questions);
    tracing::debug!(count = stats.count, "recomputed aggregates from store");

    if let Err(e) = cache.write(&stats) {
        tracing::warn!(error = %e, "could not cache aggregates");
    }
    Ok(stats)
}
