use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application settings.
///
/// Example YAML:
/// ```yaml
/// configs_dir: /etc/competence-score/configs
/// default_version: v12
/// aggregates_ttl: 60s
/// log_level: info
/// profiling_questions: [Q0_1, Q1_2, QF2]
/// contact_fields: [QX2, Q0_EMAIL]
/// group_field: Q0_GROUP
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory of versioned scoring configurations
    #[serde(default)]
    pub configs_dir: Option<PathBuf>,

    /// Version used when a request names none or an unknown one
    #[serde(default)]
    pub default_version: Option<String>,

    /// Submission store file (defaults to the platform data directory)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Freshness window of cached aggregates, e.g. "60s" or "5m"
    #[serde(default = "default_aggregates_ttl")]
    pub aggregates_ttl: String,

    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Questions whose answer distributions are aggregated
    #[serde(default = "default_profiling_questions")]
    pub profiling_questions: Vec<String>,

    /// Answer fields that may hold the respondent's email, in priority order
    #[serde(default = "default_contact_fields")]
    pub contact_fields: Vec<String>,

    #[serde(default = "default_group_field")]
    pub group_field: Option<String>,
}

fn default_aggregates_ttl() -> String {
    "60s".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_profiling_questions() -> Vec<String> {
    ["Q0_1", "Q0_2", "Q1_2", "Q1_3", "Q1_5", "QB2", "QF2"]
        .iter()
        .map(|q| q.to_string())
        .collect()
}

fn default_contact_fields() -> Vec<String> {
    vec!["QX2".to_string(), "Q0_EMAIL".to_string()]
}

fn default_group_field() -> Option<String> {
    Some("Q0_GROUP".to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configs_dir: None,
            default_version: None,
            store_path: None,
            aggregates_ttl: default_aggregates_ttl(),
            log_level: default_log_level(),
            profiling_questions: default_profiling_questions(),
            contact_fields: default_contact_fields(),
            group_field: default_group_field(),
        }
    }
}

impl Settings {
    /// Parsed `aggregates_ttl`
    pub fn aggregates_ttl(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(self.aggregates_ttl.trim()).map_err(|e| {
            anyhow::anyhow!("aggregates_ttl: invalid duration '{}' - {}", self.aggregates_ttl, e)
        })
    }
}
