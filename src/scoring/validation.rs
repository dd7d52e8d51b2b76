use super::config::{BehaviorMode, BrakeKind, MetricFormula, ScoringConfig};
use std::collections::HashSet;

/// Validate a scoring configuration at load time.
/// Returns all validation errors at once (not just the first).
///
/// Scoring itself never re-checks these; it keeps scanning levels and
/// bands in configured order, which is only meaningful when they pass here.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    validate_framework(config, &mut errors);
    validate_area_questions(config, &mut errors);
    validate_behavior_rules(config, &mut errors);
    validate_levels(config, &mut errors);
    validate_brakes(config, &mut errors);
    validate_secondary_metrics(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_framework(config: &ScoringConfig, errors: &mut Vec<String>) {
    let framework = &config.framework;
    if framework.areas.is_empty() {
        errors.push("framework.areas: must declare at least one area".to_string());
    }
    let mut seen = HashSet::new();
    for area in &framework.areas {
        if !seen.insert(area.as_str()) {
            errors.push(format!("framework.areas: duplicate area '{}'", area));
        }
    }
    if framework.area_max_points <= 0.0 {
        errors.push("framework.area_max_points: must be positive".to_string());
    }
    if framework.total_max_points <= 0.0 {
        errors.push("framework.total_max_points: must be positive".to_string());
    }
    let reachable = framework.area_max_points * framework.areas.len() as f64;
    if framework.total_max_points > 0.0 && reachable > framework.total_max_points {
        errors.push(format!(
            "framework.total_max_points: {} is below the sum of area maxima ({})",
            framework.total_max_points, reachable
        ));
    }
    if let Some(scales) = &config.scales {
        if scales.scale_0_4_to_points.multiplier < 0.0 {
            errors.push("scales.scale_0_4_to_points.multiplier: must be non-negative".to_string());
        }
    }
}

fn validate_area_questions(config: &ScoringConfig, errors: &mut Vec<String>) {
    for area in config.area_questions.keys() {
        if !config.framework.areas.contains(area) {
            errors.push(format!(
                "area_questions.{}: area is not declared in framework.areas",
                area
            ));
        }
    }
    for (area, questions) in &config.area_questions {
        if !questions.scale.is_empty() && config.scales.is_none() {
            errors.push(format!(
                "area_questions.{}.scale: scale questions listed but no scales block",
                area
            ));
        }
    }
}

fn validate_behavior_rules(config: &ScoringConfig, errors: &mut Vec<String>) {
    for (question_id, rule) in &config.behavior_scoring {
        match rule.mode {
            Some(BehaviorMode::CountSelected) => {
                if rule.eligible_values.as_ref().map_or(true, |v| v.is_empty()) {
                    errors.push(format!(
                        "behavior_scoring.{}.eligible_values: required for count_selected",
                        question_id
                    ));
                }
                if rule.points_per_item.is_none() {
                    errors.push(format!(
                        "behavior_scoring.{}.points_per_item: required for count_selected",
                        question_id
                    ));
                }
            }
            Some(BehaviorMode::WeightedSumSelected) => {
                if rule.weights.as_ref().map_or(true, |w| w.is_empty()) {
                    errors.push(format!(
                        "behavior_scoring.{}.weights: required for weighted_sum_selected",
                        question_id
                    ));
                }
            }
            Some(BehaviorMode::Other) | None => {
                if rule.map.is_none() {
                    errors.push(format!(
                        "behavior_scoring.{}: needs a known mode or a map",
                        question_id
                    ));
                }
            }
        }
    }
}

fn validate_levels(config: &ScoringConfig, errors: &mut Vec<String>) {
    let levels = &config.leveling.levels;
    if levels.is_empty() {
        errors.push("leveling.levels: must declare at least one level".to_string());
        return;
    }

    let mut names = HashSet::new();
    for (i, level) in levels.iter().enumerate() {
        if !names.insert(level.name.as_str()) {
            errors.push(format!(
                "leveling.levels[{}].name: duplicate level '{}'",
                i, level.name
            ));
        }
    }

    for (i, pair) in levels.windows(2).enumerate() {
        if pair[1].min_percent <= pair[0].min_percent {
            errors.push(format!(
                "leveling.levels[{}].min_percent: {} must be greater than the previous threshold {}",
                i + 1,
                pair[1].min_percent,
                pair[0].min_percent
            ));
        }
    }
}

fn validate_brakes(config: &ScoringConfig, errors: &mut Vec<String>) {
    for (i, brake) in config.leveling.brakes.iter().enumerate() {
        if brake.kind == BrakeKind::Unsupported {
            errors.push(format!("leveling.brakes[{}].type: unsupported brake type", i));
            continue;
        }
        if !config.framework.areas.contains(&brake.area) {
            errors.push(format!(
                "leveling.brakes[{}].area: unknown area '{}'",
                i, brake.area
            ));
        }
        for (j, rule) in brake.rules.iter().enumerate() {
            if let (Some(min), Some(max)) = (rule.min_area_points, rule.max_area_points_exclusive) {
                if min >= max {
                    errors.push(format!(
                        "leveling.brakes[{}].rules[{}]: empty range [{}, {})",
                        i, j, min, max
                    ));
                }
            }
            if let Some(cap) = &rule.cap_level {
                if config.level_index(cap).is_none() {
                    errors.push(format!(
                        "leveling.brakes[{}].rules[{}].cap_level: unknown level '{}'",
                        i, j, cap
                    ));
                }
            }
        }
    }
}

fn validate_secondary_metrics(config: &ScoringConfig, errors: &mut Vec<String>) {
    let Some(metrics) = &config.secondary_metrics else {
        return;
    };

    for (name, formula) in metrics {
        let MetricFormula::DerivedSum { components, bands, .. } = formula else {
            continue;
        };
        for component in components {
            match metrics.get(component) {
                Some(MetricFormula::Direct { .. }) => {}
                Some(MetricFormula::DerivedSum { .. }) => errors.push(format!(
                    "secondary_metrics.{}.components: '{}' is derived; only direct metrics can be summed",
                    name, component
                )),
                None => errors.push(format!(
                    "secondary_metrics.{}.components: unknown metric '{}'",
                    name, component
                )),
            }
        }
        for (j, band) in bands.iter().enumerate() {
            if band.range.0 > band.range.1 {
                errors.push(format!(
                    "secondary_metrics.{}.bands[{}].range: min {} exceeds max {}",
                    name, j, band.range.0, band.range.1
                ));
            }
        }
        for (j, pair) in bands.windows(2).enumerate() {
            if pair[1].range.0 <= pair[0].range.1 {
                errors.push(format!(
                    "secondary_metrics.{}.bands[{}].range: overlaps or precedes the previous band",
                    name,
                    j + 1
                ));
            }
        }
    }
}
