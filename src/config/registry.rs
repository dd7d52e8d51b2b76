use crate::benchmark::MarketBenchmark;
use crate::scoring::{validate_scoring, ScoringConfig};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];
const SCORING_STEM: &str = "scoring";
const BENCHMARK_STEM: &str = "market_benchmark";

/// One loaded questionnaire version.
#[derive(Debug, Clone)]
pub struct VersionedConfig {
    pub tag: String,
    pub source: PathBuf,
    pub scoring: ScoringConfig,
    pub benchmark: Option<MarketBenchmark>,
}

/// Outcome of resolving a requested version tag.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConfig<'a> {
    pub tag: &'a str,
    pub scoring: &'a ScoringConfig,
    pub benchmark: Option<&'a MarketBenchmark>,
    /// True when the requested tag was missing or unknown
    pub fell_back: bool,
}

/// All scoring configurations found in a configs directory, keyed by tag.
///
/// Layout:
/// ```text
/// configs/
///   v3/scoring.yaml
///   v3/market_benchmark.json   (optional)
///   v1.json                    (flat form, no benchmark)
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    versions: BTreeMap<String, VersionedConfig>,
    default_version: Option<String>,
}

impl ConfigRegistry {
    /// Discover and parse every version under `dir`.
    ///
    /// Errors if the directory holds no configurations, if two files claim
    /// the same tag, or if any file fails to parse.
    pub fn load(dir: &Path, default_version: Option<&str>) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Configs directory not found at {}", dir.display());
        }

        let mut versions = BTreeMap::new();
        for (tag, path) in discover(dir)? {
            let scoring: ScoringConfig = parse_file(&path)?;
            let benchmark = match path.parent().filter(|_| is_nested(dir, &path)) {
                Some(parent) => find_sibling(parent, BENCHMARK_STEM)
                    .map(|p| parse_file::<MarketBenchmark>(&p))
                    .transpose()?,
                None => None,
            };
            tracing::debug!(%tag, path = %path.display(), benchmark = benchmark.is_some(), "loaded scoring config");

            let config = VersionedConfig {
                tag: tag.clone(),
                source: path.clone(),
                scoring,
                benchmark,
            };
            if let Some(existing) = versions.insert(tag.clone(), config) {
                anyhow::bail!(
                    "Version '{}' defined twice: {} and {}",
                    tag,
                    existing.source.display(),
                    path.display()
                );
            }
        }

        if versions.is_empty() {
            anyhow::bail!("No scoring configurations found in {}", dir.display());
        }

        Ok(Self {
            versions,
            default_version: default_version.map(str::to_string),
        })
    }

    /// Version tags, oldest first
    pub fn versions(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        tags.sort_by_key(|tag| version_key(tag));
        tags
    }

    pub fn get(&self, tag: &str) -> Option<&VersionedConfig> {
        self.versions.get(tag)
    }

    /// The configured default version when known, else the highest tag
    pub fn latest(&self) -> Option<&VersionedConfig> {
        self.default_version
            .as_deref()
            .and_then(|tag| self.versions.get(tag))
            .or_else(|| {
                self.versions
                    .values()
                    .max_by_key(|c| version_key(&c.tag))
            })
    }

    /// Resolve a requested tag, falling back to the latest version.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ResolvedConfig<'_>> {
        let exact = requested.and_then(|tag| self.versions.get(tag));
        let fell_back = exact.is_none();
        let config = match exact {
            Some(config) => config,
            None => self
                .latest()
                .context("No scoring configurations are loaded")?,
        };

        if fell_back {
            tracing::debug!(
                requested = requested.unwrap_or("<none>"),
                resolved = %config.tag,
                "falling back to default version"
            );
        }

        Ok(ResolvedConfig {
            tag: &config.tag,
            scoring: &config.scoring,
            benchmark: config.benchmark.as_ref(),
            fell_back,
        })
    }

    /// Validate every loaded version.
    /// Errors are prefixed with the version tag.
    pub fn validate_all(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .versions()
            .into_iter()
            .filter_map(|tag| {
                let config = self.versions.get(tag)?;
                validate_scoring(&config.scoring).err().map(|errs| {
                    errs.into_iter()
                        .map(|e| format!("{}: {}", tag, e))
                        .collect::<Vec<_>>()
                })
            })
            .flatten()
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Sort key: numeric suffix of the tag, then the tag itself (`v12` > `v9`)
fn version_key(tag: &str) -> (u64, String) {
    let digits: String = tag
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (digits.parse().unwrap_or(0), tag.to_string())
}

/// (tag, scoring file) pairs for both nested and flat layouts
fn discover(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let root = glob::Pattern::escape(&dir.to_string_lossy());
    let mut found = Vec::new();

    for ext in CONFIG_EXTENSIONS {
        let nested = format!("{}/*/{}.{}", root, SCORING_STEM, ext);
        for path in glob_paths(&nested)? {
            let tag = path
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned());
            if let Some(tag) = tag {
                found.push((tag, path));
            }
        }

        let flat = format!("{}/*.{}", root, ext);
        for path in glob_paths(&flat)? {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if stem == BENCHMARK_STEM || stem == "config" {
                continue;
            }
            found.push((stem, path));
        }
    }

    found.sort();
    Ok(found)
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).with_context(|| format!("Invalid glob pattern {}", pattern))?;
    Ok(paths.filter_map(|entry| entry.ok()).filter(|p| p.is_file()).collect())
}

fn is_nested(root: &Path, path: &Path) -> bool {
    path.parent().is_some_and(|parent| parent != root)
}

fn find_sibling(dir: &Path, stem: &str) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
}

/// Parse a JSON or YAML file, chosen by extension
fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))
    }
}
