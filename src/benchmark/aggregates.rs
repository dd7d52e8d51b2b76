use super::types::AggregateStats;
use crate::answers::AnswerValue;
use crate::scoring::rules::round_half_up;
use crate::store::{SubmissionRecord, AREA_SCORES_KEY};
use std::collections::BTreeMap;

/// Compute population statistics over stored submissions.
///
/// `profiling_questions` are the question ids whose answer distributions
/// are tracked. Area averages come from the area scores embedded in each
/// record at submission time.
pub fn aggregate_submissions(
    records: &[SubmissionRecord],
    profiling_questions: &[String],
) -> AggregateStats {
    let mut stats = AggregateStats {
        count: records.len() as u64,
        ..Default::default()
    };
    if records.is_empty() {
        return stats;
    }

    let mut score_sum = 0i64;
    let mut area_sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();

    for record in records {
        score_sum += record.score;
        if !record.level.is_empty() {
            *stats
                .level_distribution
                .entry(record.level.clone())
                .or_insert(0) += 1;
        }

        for question_id in profiling_questions {
            if !record.answers.contains(question_id) {
                continue;
            }
            let selections = record.answers.get(question_id).selections();
            let distribution = stats
                .question_distributions
                .entry(question_id.clone())
                .or_default();
            for value in selections {
                *distribution.entry(value).or_insert(0) += 1;
            }
        }

        for (area, percent) in embedded_area_percents(record.answers.get(AREA_SCORES_KEY)) {
            let entry = area_sums.entry(area).or_insert((0.0, 0));
            entry.0 += percent;
            entry.1 += 1;
        }
    }

    stats.avg_total_score = round_half_up(score_sum as f64 / records.len() as f64) as i64;
    stats.avg_area_scores = area_sums
        .into_iter()
        .map(|(area, (sum, n))| (area, round_half_up(sum / n as f64) as i64))
        .collect();

    stats
}

/// Area percents from an embedded `{A: {raw, max, percent}}` object;
/// a bare number is read as the percent.
fn embedded_area_percents(value: &AnswerValue) -> Vec<(String, f64)> {
    let AnswerValue::Raw(serde_json::Value::Object(areas)) = value else {
        return Vec::new();
    };
    areas
        .iter()
        .filter_map(|(area, data)| {
            let percent = match data {
                serde_json::Value::Object(fields) => fields.get("percent").and_then(|p| p.as_f64()),
                serde_json::Value::Number(n) => n.as_f64(),
                _ => None,
            }?;
            Some((area.clone(), percent))
        })
        .collect()
}
