pub mod config;
pub mod engine;
pub mod leveling;
pub mod metrics;
pub mod rules;
pub mod validation;

pub use config::*;
pub use engine::{calculate_score, AreaScore, AreaScores, CalculationResult};
pub use metrics::MetricValue;
pub use validation::validate_scoring;
