use super::config::MetricFormula;
use crate::answers::AnswerSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Computed secondary metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Derived {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `None` means unknown (unanswered or unmapped), not zero
    Direct(Option<f64>),
}

impl MetricValue {
    /// Numeric value usable as a derived-sum component
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Direct(v) => *v,
            MetricValue::Derived { .. } => None,
        }
    }
}

/// Evaluate secondary metrics in two passes: every direct lookup first,
/// then every derived sum over the direct results.
pub fn compute_secondary_metrics(
    formulas: &BTreeMap<String, MetricFormula>,
    answers: &AnswerSet,
) -> BTreeMap<String, MetricValue> {
    let mut computed = BTreeMap::new();

    for (name, formula) in formulas {
        if let MetricFormula::Direct { question_id, map } = formula {
            let value = answers
                .scalar(question_id)
                .and_then(|answer| map.get(answer))
                .copied();
            computed.insert(name.clone(), MetricValue::Direct(value));
        }
    }

    for (name, formula) in formulas {
        if let MetricFormula::DerivedSum { components, bands, .. } = formula {
            let value: f64 = components
                .iter()
                .map(|c| computed.get(c).and_then(MetricValue::as_number).unwrap_or(0.0))
                .fold(0.0, |acc, v| acc + v);
            let label = bands
                .iter()
                .filter(|band| band.contains(value))
                .last()
                .map(|band| band.label.clone());
            computed.insert(name.clone(), MetricValue::Derived { value, label });
        }
    }

    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerValue;
    use crate::scoring::config::{Band, DerivedSumTag};

    fn direct(question_id: &str, entries: &[(&str, f64)]) -> MetricFormula {
        MetricFormula::Direct {
            question_id: question_id.to_string(),
            map: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn derived(components: &[&str], bands: Vec<Band>) -> MetricFormula {
        MetricFormula::DerivedSum {
            kind: DerivedSumTag::DerivedSum,
            components: components.iter().map(|c| c.to_string()).collect(),
            bands,
        }
    }

    fn band(min: f64, max: f64, label: &str) -> Band {
        Band { range: (min, max), label: label.to_string() }
    }

    fn formulas() -> BTreeMap<String, MetricFormula> {
        let mut formulas = BTreeMap::new();
        // Derived name sorts before its components
        formulas.insert(
            "adoption_index".to_string(),
            derived(
                &["budget", "tooling"],
                vec![band(0.0, 2.0, "early"), band(3.0, 4.0, "growing"), band(5.0, 6.0, "mature")],
            ),
        );
        formulas.insert("budget".to_string(), direct("Q_BUDGET", &[("none", 0.0), ("some", 1.0), ("dedicated", 3.0)]));
        formulas.insert("tooling".to_string(), direct("Q_TOOLS", &[("free", 1.0), ("paid", 3.0)]));
        formulas
    }

    #[test]
    fn test_direct_and_derived() {
        let mut answers = AnswerSet::new();
        answers.insert("Q_BUDGET", AnswerValue::Scalar("dedicated".into()));
        answers.insert("Q_TOOLS", AnswerValue::Scalar("paid".into()));

        let metrics = compute_secondary_metrics(&formulas(), &answers);
        assert_eq!(metrics["budget"], MetricValue::Direct(Some(3.0)));
        assert_eq!(metrics["tooling"], MetricValue::Direct(Some(3.0)));
        assert_eq!(
            metrics["adoption_index"],
            MetricValue::Derived { value: 6.0, label: Some("mature".to_string()) }
        );
    }

    #[test]
    fn test_missing_answer_is_null_and_sums_as_zero() {
        let mut answers = AnswerSet::new();
        answers.insert("Q_TOOLS", AnswerValue::Scalar("paid".into()));

        let metrics = compute_secondary_metrics(&formulas(), &answers);
        assert_eq!(metrics["budget"], MetricValue::Direct(None));
        assert_eq!(
            metrics["adoption_index"],
            MetricValue::Derived { value: 3.0, label: Some("growing".to_string()) }
        );
    }

    #[test]
    fn test_unmapped_value_is_null() {
        let mut answers = AnswerSet::new();
        answers.insert("Q_BUDGET", AnswerValue::Scalar("unknown".into()));
        answers.insert("Q_TOOLS", AnswerValue::List(vec!["paid".into()]));

        let metrics = compute_secondary_metrics(&formulas(), &answers);
        assert_eq!(metrics["budget"], MetricValue::Direct(None));
        assert_eq!(metrics["tooling"], MetricValue::Direct(None));
    }

    #[test]
    fn test_band_gap_leaves_label_empty() {
        let mut answers = AnswerSet::new();
        answers.insert("Q_BUDGET", AnswerValue::Scalar("some".into()));
        answers.insert("Q_TOOLS", AnswerValue::Scalar("free".into()));
        let mut formulas = formulas();
        formulas.insert(
            "adoption_index".to_string(),
            derived(&["budget", "tooling"], vec![band(0.0, 1.0, "early")]),
        );

        let metrics = compute_secondary_metrics(&formulas, &answers);
        assert_eq!(metrics["adoption_index"], MetricValue::Derived { value: 2.0, label: None });
    }

    #[test]
    fn test_overlapping_bands_last_match_wins() {
        let answers = AnswerSet::new();
        let mut formulas = BTreeMap::new();
        formulas.insert(
            "index".to_string(),
            derived(&[], vec![band(0.0, 5.0, "first"), band(0.0, 0.0, "second")]),
        );
        let metrics = compute_secondary_metrics(&formulas, &answers);
        assert_eq!(
            metrics["index"],
            MetricValue::Derived { value: 0.0, label: Some("second".to_string()) }
        );
    }

    #[test]
    fn test_derived_component_counts_as_zero() {
        let answers = AnswerSet::new();
        let mut formulas = BTreeMap::new();
        formulas.insert("a".to_string(), derived(&[], vec![]));
        formulas.insert("b".to_string(), derived(&["a", "missing"], vec![]));
        let metrics = compute_secondary_metrics(&formulas, &answers);
        assert_eq!(metrics["b"], MetricValue::Derived { value: 0.0, label: None });
    }

    #[test]
    fn test_serialized_shape() {
        let direct = serde_json::to_string(&MetricValue::Direct(None)).unwrap();
        assert_eq!(direct, "null");
        let derived = serde_json::to_string(&MetricValue::Derived {
            value: 3.0,
            label: Some("growing".into()),
        })
        .unwrap();
        assert_eq!(derived, r#"{"value":3.0,"label":"growing"}"#);
    }
}
