mod registry;
mod schema;

pub use registry::{ConfigRegistry, ResolvedConfig, VersionedConfig};
pub use schema::Settings;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/competence-score/)
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("competence-score")
}

/// Get the default settings file path (~/.config/competence-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Default directory of versioned scoring configurations
pub fn get_configs_dir() -> PathBuf {
    get_config_dir().join("configs")
}

/// Load settings from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to the settings file. If None, uses the default
///   path, and a missing default file yields default settings.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed
pub fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let settings: Settings = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_explicit_file_errors() {
        let path = env::temp_dir().join("competence_score_test_missing_settings.yaml");
        let _ = fs::remove_file(&path);
        let err = load_settings(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_settings_file() {
        let path = env::temp_dir().join("competence_score_test_settings.yaml");
        fs::write(&path, "default_version: v3\nlog_level: debug\n").unwrap();

        let settings = load_settings(Some(path.clone())).unwrap();
        assert_eq!(settings.default_version.as_deref(), Some("v3"));
        assert_eq!(settings.log_level, "debug");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_yaml_errors() {
        let path = env::temp_dir().join("competence_score_test_bad_settings.yaml");
        fs::write(&path, "default_version: [unclosed\n").unwrap();

        let err = load_settings(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = fs::remove_file(&path);
    }
}
