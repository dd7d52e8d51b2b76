pub mod storage;
pub mod types;

pub use storage::{get_store_path, load_store, save_store};
pub use types::{SubmissionRecord, SubmissionStore, AREA_SCORES_KEY};

use crate::answers::AnswerValue;
use crate::benchmark::AggregateCache;
use crate::scoring::CalculationResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Build the stored form of a freshly scored submission.
///
/// Area scores are embedded under `_areaScores` so aggregates can be
/// recomputed without re-scoring every record. The contact email is the
/// first of `contact_fields` holding something that looks like an address.
pub fn record_submission(
    result: &CalculationResult,
    version: &str,
    contact_fields: &[String],
    group_field: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SubmissionRecord> {
    let mut answers = result.answers.clone();
    let area_scores =
        serde_json::to_value(&result.area_scores).context("Failed to serialize area scores")?;
    answers.insert(AREA_SCORES_KEY, AnswerValue::Raw(area_scores));

    let email = contact_fields
        .iter()
        .filter_map(|field| result.answers.scalar(field))
        .find(|value| value.contains('@'))
        .map(str::to_string);

    let group = group_field
        .and_then(|field| result.answers.scalar(field))
        .map(str::to_string);

    Ok(SubmissionRecord {
        id: format!("{}_{}", version, now.timestamp_millis()),
        timestamp: now,
        email,
        group,
        level: result.level.clone(),
        score: result.total_percent,
        version: version.to_string(),
        answers,
    })
}

/// Append a record to the store and invalidate cached aggregates.
/// Returns the id the record was stored under.
pub fn save_submission(
    store_path: &Path,
    cache: &AggregateCache,
    record: SubmissionRecord,
) -> Result<String> {
    let mut store = load_store(store_path)?;
    let id = store.push(record);
    save_store(store_path, &store)?;
    tracing::info!(%id, path = %store_path.display(), "stored submission");

    if let Err(e) = cache.invalidate() {
        tracing::warn!(error = %e, "could not invalidate aggregates cache");
    }
    Ok(id)
}
