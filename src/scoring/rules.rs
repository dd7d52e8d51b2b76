use super::config::{BehaviorMode, BehaviorRule};
use crate::answers::AnswerValue;

/// Half-up rounding to a whole percent (`floor(x + 0.5)`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `round(part / whole * 100)`; 0 when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> i64 {
    if whole <= 0.0 || !part.is_finite() {
        return 0;
    }
    round_half_up(part / whole * 100.0) as i64
}

/// Points a scale answer contributes with the given multiplier.
pub fn scale_points(answer: &AnswerValue, multiplier: f64) -> f64 {
    answer
        .as_scale_value()
        .map(|v| v as f64 * multiplier)
        .unwrap_or(0.0)
}

/// Points a behavior answer contributes under its rule.
///
/// Shape mismatches contribute 0: list modes need a list, map mode a scalar.
pub fn behavior_points(rule: &BehaviorRule, answer: &AnswerValue) -> f64 {
    match rule.mode {
        Some(BehaviorMode::CountSelected) => {
            let Some(selected) = answer.as_list() else {
                return 0.0;
            };
            if has_exclusive_zero(rule, selected) {
                return 0.0;
            }
            let eligible = rule.eligible_values.as_deref().unwrap_or(&[]);
            let count = selected.iter().filter(|v| eligible.contains(*v)).count();
            count as f64 * rule.points_per_item.unwrap_or(0.0)
        }
        Some(BehaviorMode::WeightedSumSelected) => {
            let Some(selected) = answer.as_list() else {
                return 0.0;
            };
            if has_exclusive_zero(rule, selected) {
                return 0.0;
            }
            let sum: f64 = selected
                .iter()
                .map(|v| {
                    rule.weights
                        .as_ref()
                        .and_then(|w| w.get(v))
                        .copied()
                        .unwrap_or(0.0)
                })
                .sum();
            match rule.cap {
                Some(cap) if cap != 0.0 => sum.min(cap),
                _ => sum,
            }
        }
        Some(BehaviorMode::Other) | None => {
            let (Some(map), Some(value)) = (rule.map.as_ref(), answer.as_scalar()) else {
                return 0.0;
            };
            map.get(value).copied().unwrap_or(0.0)
        }
    }
}

/// The sentinel anywhere in the selection forecloses all credit.
fn has_exclusive_zero(rule: &BehaviorRule, selected: &[String]) -> bool {
    match rule.exclusive_zero.as_deref() {
        Some(sentinel) if !sentinel.is_empty() => selected.iter().any(|v| v == sentinel),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn list(values: &[&str]) -> AnswerValue {
        AnswerValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    fn count_rule() -> BehaviorRule {
        BehaviorRule {
            mode: Some(BehaviorMode::CountSelected),
            points_per_item: Some(5.0),
            eligible_values: Some(vec!["x".to_string(), "y".to_string()]),
            exclusive_zero: Some("none".to_string()),
            ..Default::default()
        }
    }

    fn weighted_rule(cap: Option<f64>) -> BehaviorRule {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), 3.0);
        weights.insert("b".to_string(), 4.0);
        BehaviorRule {
            mode: Some(BehaviorMode::WeightedSumSelected),
            weights: Some(weights),
            cap,
            exclusive_zero: Some("none".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(59.5), 60.0);
        assert_eq!(round_half_up(59.49), 59.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(16.0, 20.0), 80);
        assert_eq!(percent_of(1.0, 3.0), 33);
        assert_eq!(percent_of(2.0, 3.0), 67);
        assert_eq!(percent_of(5.0, 0.0), 0);
    }

    #[test]
    fn test_scale_points() {
        assert_eq!(scale_points(&AnswerValue::Scalar("3".into()), 2.0), 6.0);
        assert_eq!(scale_points(&AnswerValue::Scalar("n/a".into()), 2.0), 0.0);
        assert_eq!(scale_points(&AnswerValue::Absent, 2.0), 0.0);
        assert_eq!(scale_points(&AnswerValue::Scalar("-4".into()), 2.0), 0.0);
    }

    #[test]
    fn test_count_selected() {
        assert_eq!(behavior_points(&count_rule(), &list(&["x", "y", "z"])), 10.0);
        assert_eq!(behavior_points(&count_rule(), &list(&[])), 0.0);
    }

    #[test]
    fn test_count_selected_needs_list() {
        assert_eq!(behavior_points(&count_rule(), &AnswerValue::Scalar("x".into())), 0.0);
        assert_eq!(behavior_points(&count_rule(), &AnswerValue::Absent), 0.0);
    }

    #[test]
    fn test_exclusive_zero_forecloses_credit() {
        let mixed = behavior_points(&count_rule(), &list(&["none", "x"]));
        let alone = behavior_points(&count_rule(), &list(&["none"]));
        assert_eq!(mixed, 0.0);
        assert_eq!(mixed, alone);

        let rule = weighted_rule(None);
        assert_eq!(behavior_points(&rule, &list(&["none", "a"])), 0.0);
        assert_eq!(behavior_points(&rule, &list(&["none"])), 0.0);
    }

    #[test]
    fn test_weighted_sum_and_cap() {
        assert_eq!(behavior_points(&weighted_rule(None), &list(&["a", "b", "c"])), 7.0);
        assert_eq!(behavior_points(&weighted_rule(Some(5.0)), &list(&["a", "b"])), 5.0);
        assert_eq!(behavior_points(&weighted_rule(Some(10.0)), &list(&["a"])), 3.0);
    }

    #[test]
    fn test_weighted_zero_cap_means_uncapped() {
        assert_eq!(behavior_points(&weighted_rule(Some(0.0)), &list(&["a", "b"])), 7.0);
    }

    #[test]
    fn test_direct_map() {
        let mut map = BTreeMap::new();
        map.insert("daily".to_string(), 10.0);
        let rule = BehaviorRule {
            map: Some(map),
            ..Default::default()
        };
        assert_eq!(behavior_points(&rule, &AnswerValue::Scalar("daily".into())), 10.0);
        assert_eq!(behavior_points(&rule, &AnswerValue::Scalar("never".into())), 0.0);
        assert_eq!(behavior_points(&rule, &AnswerValue::Absent), 0.0);
        assert_eq!(behavior_points(&rule, &list(&["daily"])), 0.0);
    }

    #[test]
    fn test_rule_without_map_or_mode() {
        let rule = BehaviorRule::default();
        assert_eq!(behavior_points(&rule, &AnswerValue::Scalar("x".into())), 0.0);
    }
}
