use super::config::ScoringConfig;
use super::leveling::{apply_brakes, level_for_percent};
use super::metrics::{compute_secondary_metrics, MetricValue};
use super::rules::{behavior_points, percent_of, scale_points};
use crate::answers::AnswerSet;
use crate::ordered::OrderedMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points earned in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaScore {
    pub raw: f64,
    pub max: f64,
    pub percent: i64,
}

/// Area code -> score, in `framework.areas` order
pub type AreaScores = OrderedMap<AreaScore>;

/// Scored competence profile.
///
/// Derived entirely from `answers` and the configuration version, so a
/// stored result is a cache that can always be regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub total_score: f64,
    pub total_percent: i64,
    pub level: String,
    pub area_scores: AreaScores,
    pub brake_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake_explanation_key: Option<String>,
    pub answers: AnswerSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_metrics: Option<BTreeMap<String, MetricValue>>,
}

impl CalculationResult {
    /// Attach the configuration version the result was scored against
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Score an answer set against one configuration version.
///
/// Pure and infallible: missing or malformed answers contribute zero,
/// questions without a scoring rule are skipped, and missing optional
/// configuration sections contribute nothing.
pub fn calculate_score(answers: &AnswerSet, config: &ScoringConfig) -> CalculationResult {
    let area_max = config.framework.area_max_points;
    let mut area_scores = AreaScores::new();
    let mut total_raw = 0.0;

    for area in &config.framework.areas {
        let mut points = 0.0;

        if let Some(questions) = config.area_questions.get(area) {
            if let Some(scales) = &config.scales {
                let multiplier = scales.scale_0_4_to_points.multiplier;
                for question_id in &questions.scale {
                    points += scale_points(answers.get(question_id), multiplier);
                }
            }

            for question_id in &questions.behavior {
                // Rules may lag behind question lists across versions
                let Some(rule) = config.behavior_scoring.get(question_id) else {
                    continue;
                };
                points += behavior_points(rule, answers.get(question_id));
            }
        }

        let raw = points.min(area_max).max(0.0);
        area_scores.insert(
            area.clone(),
            AreaScore {
                raw,
                max: area_max,
                percent: percent_of(raw, area_max),
            },
        );
        total_raw += raw;
    }

    let total_percent = percent_of(total_raw, config.framework.total_max_points);
    let level = level_for_percent(config, total_percent);
    let outcome = apply_brakes(config, level, &area_scores);

    let secondary_metrics = config
        .secondary_metrics
        .as_ref()
        .map(|formulas| compute_secondary_metrics(formulas, answers));

    CalculationResult {
        total_score: total_raw,
        total_percent,
        level: outcome.level,
        area_scores,
        brake_applied: outcome.brake_applied,
        brake_explanation_key: outcome.brake_explanation_key,
        answers: answers.clone(),
        version: None,
        secondary_metrics,
    }
}
