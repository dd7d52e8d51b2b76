use super::config::{BrakeKind, ScoringConfig};
use super::engine::AreaScores;

/// Level after brakes, with the brake that last lowered it.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOutcome {
    pub level: String,
    pub brake_applied: bool,
    pub brake_explanation_key: Option<String>,
}

/// Highest level whose `min_percent` the total meets.
///
/// Walks the levels in configured order and keeps the last satisfied
/// one; levels must be listed in ascending threshold order. Falls back
/// to the first level when none is satisfied.
pub fn level_for_percent(config: &ScoringConfig, total_percent: i64) -> String {
    let levels = &config.leveling.levels;
    let mut current = levels.first().map(|l| l.name.clone()).unwrap_or_default();
    for level in levels {
        if total_percent as f64 >= level.min_percent {
            current = level.name.clone();
        }
    }
    current
}

/// Apply brakes in configured order. A brake only ever lowers the level
/// held at the time it is evaluated.
pub fn apply_brakes(
    config: &ScoringConfig,
    level: String,
    area_scores: &AreaScores,
) -> LevelOutcome {
    let mut outcome = LevelOutcome {
        level,
        brake_applied: false,
        brake_explanation_key: None,
    };

    for brake in &config.leveling.brakes {
        if brake.kind != BrakeKind::CapLevelByAreaScore {
            continue;
        }
        let area_points = area_scores.get(&brake.area).map_or(0.0, |s| s.raw);
        let Some(rule) = brake.rules.iter().find(|r| r.matches(area_points)) else {
            continue;
        };
        let Some(cap_level) = rule.cap_level.as_deref() else {
            continue;
        };
        let (Some(current_idx), Some(cap_idx)) = (
            config.level_index(&outcome.level),
            config.level_index(cap_level),
        ) else {
            continue;
        };
        if current_idx > cap_idx {
            outcome.level = cap_level.to_string();
            outcome.brake_applied = true;
            outcome.brake_explanation_key = brake.explanation_key.clone();
        }
    }

    outcome
}
