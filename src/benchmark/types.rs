use crate::ordered::OrderedMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// External market benchmark document for one questionnaire version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MarketBenchmark {
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Keyed by an opaque benchmark id, in declaration order
    pub benchmarks: OrderedMap<BenchmarkEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BenchmarkEntry {
    pub question_id: String,
    /// Option value -> market percent (`null` when no external data),
    /// in declaration order
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl BenchmarkEntry {
    /// Options with their market percent, in declaration order
    pub fn options(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_f64()))
    }
}

/// Population statistics over stored submissions.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub count: u64,
    pub avg_total_score: i64,
    #[serde(default)]
    pub avg_area_scores: BTreeMap<String, i64>,
    #[serde(default)]
    pub level_distribution: BTreeMap<String, u64>,
    /// Question id -> option value -> respondents selecting it
    #[serde(default)]
    pub question_distributions: BTreeMap<String, BTreeMap<String, u64>>,
}

/// One option of a benchmarked question, seen from the respondent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub label: String,
    /// Whether the respondent chose this option
    pub user_value: bool,
    pub market_percent: Option<f64>,
    pub internal_percent: i64,
}
