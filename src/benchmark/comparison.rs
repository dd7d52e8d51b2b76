use super::types::{AggregateStats, ComparisonPoint, MarketBenchmark};
use crate::answers::AnswerSet;
use crate::scoring::rules::percent_of;
use std::collections::BTreeMap;

/// Compare a respondent's answers with market data and internal aggregates.
///
/// Returns, per benchmarked question id, one point per option in the
/// benchmark's declaration order. Missing data yields `None` market
/// percentages and 0 internal percentages.
pub fn calculate_market_comparison(
    answers: &AnswerSet,
    benchmark: &MarketBenchmark,
    aggregates: &AggregateStats,
) -> BTreeMap<String, Vec<ComparisonPoint>> {
    let mut results = BTreeMap::new();
    let empty = BTreeMap::new();

    for entry in benchmark.benchmarks.values() {
        let question_id = &entry.question_id;
        let answer = answers.get(question_id);

        let distribution = aggregates
            .question_distributions
            .get(question_id)
            .unwrap_or(&empty);
        let total: u64 = distribution.values().sum();

        let points = entry
            .options()
            .map(|(option, market_percent)| {
                let count = distribution.get(option).copied().unwrap_or(0);
                ComparisonPoint {
                    label: option.to_string(),
                    user_value: answer.selects(option),
                    market_percent,
                    internal_percent: percent_of(count as f64, total as f64),
                }
            })
            .collect();

        results.insert(question_id.clone(), points);
    }

    results
}
