use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scoring configuration for one questionnaire version.
///
/// Loaded once per version tag and never mutated. The schema evolved
/// additively: `scales` and `secondary_metrics` only exist in some
/// versions, and unknown fields are ignored.
///
/// Example YAML:
/// ```yaml
/// framework:
///   areas: [A, B]
///   area_max_points: 20
///   total_max_points: 40
/// scales:
///   scale_0_4_to_points: { multiplier: 2 }
/// behavior_scoring:
///   QA2: { mode: count_selected, points_per_item: 5, eligible_values: [x, y], exclusive_zero: none }
///   QB2: { map: { daily: 10, weekly: 5 } }
/// area_questions:
///   A: { scale: [QA1], behavior: [QA2] }
///   B: { behavior: [QB2] }
/// leveling:
///   levels:
///     - { name: Observer, min_percent: 0 }
///     - { name: Explorer, min_percent: 30 }
///   brakes: []
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoringConfig {
    pub framework: Framework,

    /// Scale multiplier; absent in versions without Likert questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,

    #[serde(default)]
    pub behavior_scoring: BTreeMap<String, BehaviorRule>,

    #[serde(default)]
    pub area_questions: BTreeMap<String, AreaQuestions>,

    pub leveling: Leveling,

    /// Named secondary indices; absent before they were introduced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_metrics: Option<BTreeMap<String, MetricFormula>>,

    /// Informational: question groups reported outside the total score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Extension>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Framework {
    /// Area codes in declaration (and scoring) order
    pub areas: Vec<String>,
    pub area_max_points: f64,
    pub total_max_points: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Scales {
    pub scale_0_4_to_points: ScaleRule,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScaleRule {
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,
}

/// Scoring mode of a behavior question.
///
/// Rules without a recognized mode are scored through their `map`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMode {
    CountSelected,
    WeightedSumSelected,
    #[serde(other)]
    Other,
}

/// Scoring rule for one behavior question.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct BehaviorRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<BehaviorMode>,

    /// Informational upper bound for the question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,

    /// Sentinel option ("none of the above") that zeroes the whole question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_zero: Option<String>,

    /// count_selected: points for each eligible selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_per_item: Option<f64>,

    /// count_selected: options that earn `points_per_item`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligible_values: Option<Vec<String>>,

    /// weighted_sum_selected: per-option weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,

    /// weighted_sum_selected: upper bound of the weighted sum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,

    /// Direct mode: answer value -> points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<BTreeMap<String, f64>>,
}

/// Questions contributing to one area, by scoring family.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AreaQuestions {
    #[serde(default)]
    pub scale: Vec<String>,
    #[serde(default)]
    pub behavior: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Extension {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub affects_total_score: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Leveling {
    /// Levels in ascending `min_percent` order
    pub levels: Vec<Level>,
    #[serde(default)]
    pub brakes: Vec<Brake>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Level {
    pub name: String,
    pub min_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BrakeKind {
    CapLevelByAreaScore,
    #[serde(other)]
    Unsupported,
}

/// Caps the achievable level based on one area's raw score.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Brake {
    #[serde(rename = "type")]
    pub kind: BrakeKind,
    pub area: String,
    #[serde(default)]
    pub rules: Vec<BrakeRule>,
    #[serde(default)]
    pub explanation_key: Option<String>,
}

/// `[min_area_points, max_area_points_exclusive)`; a missing bound is open.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BrakeRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_area_points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_area_points_exclusive: Option<f64>,
    /// `None` means the range matches but imposes no cap
    #[serde(default)]
    pub cap_level: Option<String>,
}

impl BrakeRule {
    pub fn matches(&self, area_points: f64) -> bool {
        let min_ok = self.min_area_points.map_or(true, |min| area_points >= min);
        let max_ok = self
            .max_area_points_exclusive
            .map_or(true, |max| area_points < max);
        min_ok && max_ok
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DerivedSumTag {
    DerivedSum,
}

/// Named secondary metric formula.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MetricFormula {
    /// Sum of direct metrics, resolved to a display band
    DerivedSum {
        #[serde(rename = "type")]
        kind: DerivedSumTag,
        components: Vec<String>,
        #[serde(default)]
        bands: Vec<Band>,
    },
    /// Single question looked up in a value -> number table
    Direct {
        question_id: String,
        map: BTreeMap<String, f64>,
    },
}

/// Inclusive `[min, max]` range with a label.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Band {
    pub range: (f64, f64),
    pub label: String,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.range.0 && value <= self.range.1
    }
}

impl ScoringConfig {
    /// Position of a level in the ascending level list
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.leveling.levels.iter().position(|l| l.name == name)
    }
}
