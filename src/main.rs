use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use competence_score::answers::AnswerSet;
use competence_score::benchmark::{self, AggregateCache};
use competence_score::config::{self, ConfigRegistry, Settings};
use competence_score::output;
use competence_score::scoring::{self, CalculationResult};
use competence_score::store;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;
const EXIT_STORAGE: i32 = 6;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an answers file and print the result
    Score {
        /// JSON file mapping question ids to answers
        #[arg(short, long)]
        answers: PathBuf,
        /// Questionnaire version (falls back to the default version)
        #[arg(long = "version")]
        version_tag: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Score an answers file and store the submission
    Submit {
        #[arg(short, long)]
        answers: PathBuf,
        #[arg(long = "version")]
        version_tag: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Recompute a stored submission from its raw answers
    Recompute {
        /// Submission id, as printed by `submit`
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Compare answers against the market benchmark and stored submissions
    Compare {
        #[arg(short, long)]
        answers: PathBuf,
        #[arg(long = "version")]
        version_tag: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show aggregate statistics over stored submissions
    Aggregates {
        #[arg(long)]
        json: bool,
        /// Ignore cached aggregates and recompute
        #[arg(long)]
        refresh: bool,
    },
    /// Validate every scoring configuration
    Validate,
    /// List available questionnaire versions
    Versions,
}

#[derive(Parser, Debug)]
#[command(name = "competence-score")]
#[command(about = "Questionnaire competence scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file (defaults to ~/.config/competence-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Print an error and exit with the given code
fn fail(code: i32, what: &str, err: impl Display) -> ! {
    eprintln!("{}: {:#}", what, err);
    std::process::exit(code);
}

fn load_registry(settings: &Settings) -> ConfigRegistry {
    let dir = settings
        .configs_dir
        .clone()
        .unwrap_or_else(config::get_configs_dir);
    match ConfigRegistry::load(&dir, settings.default_version.as_deref()) {
        Ok(registry) => registry,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    }
}

/// Load the registry and refuse to score with invalid configurations
fn load_valid_registry(settings: &Settings) -> ConfigRegistry {
    let registry = load_registry(settings);
    if let Err(errors) = registry.validate_all() {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    registry
}

fn read_answers(path: &Path) -> AnswerSet {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => fail(
            EXIT_INPUT,
            &format!("Failed to read answers file {}", path.display()),
            e,
        ),
    };
    match AnswerSet::from_json_str(&content) {
        Ok(answers) => answers,
        Err(e) => fail(EXIT_INPUT, "Invalid answers", e),
    }
}

fn score(registry: &ConfigRegistry, answers: &AnswerSet, version: Option<&str>) -> CalculationResult {
    let resolved = match registry.resolve(version) {
        Ok(r) => r,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    };
    if resolved.fell_back {
        if let Some(requested) = version {
            eprintln!("Unknown version '{}', using {}", requested, resolved.tag);
        }
    }
    scoring::calculate_score(answers, resolved.scoring).with_version(resolved.tag)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match output::format_json(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(EXIT_INPUT, "Failed to serialize output", e),
    }
}

fn print_result(result: &CalculationResult, json: bool) {
    if json {
        print_json(result);
    } else {
        let use_colors = output::should_use_colors();
        println!("{}", output::format_result(result, output::bar_width(), use_colors));
    }
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.map(PathBuf::from);
    let settings = match config::load_settings(config_path) {
        Ok(s) => s,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    };

    if let Err(e) = competence_score::telemetry::init(&settings.log_level, cli.verbose) {
        fail(EXIT_CONFIG, "Config error", e);
    }

    let ttl = match settings.aggregates_ttl() {
        Ok(ttl) => ttl,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    };
    let store_path = settings
        .store_path
        .clone()
        .unwrap_or_else(store::get_store_path);
    let cache = AggregateCache::new(benchmark::get_cache_path(), ttl);
    tracing::debug!(store = %store_path.display(), cache = %cache.path().display(), "paths resolved");

    match cli.command {
        Commands::Score {
            answers,
            version_tag,
            json,
        } => {
            let registry = load_valid_registry(&settings);
            let answers = read_answers(&answers);
            let result = score(&registry, &answers, version_tag.as_deref());
            print_result(&result, json);
        }
        Commands::Submit {
            answers,
            version_tag,
            json,
        } => {
            let registry = load_valid_registry(&settings);
            let answers = read_answers(&answers);
            let result = score(&registry, &answers, version_tag.as_deref());
            let version = result.version.clone().unwrap_or_default();

            let record = match store::record_submission(
                &result,
                &version,
                &settings.contact_fields,
                settings.group_field.as_deref(),
                Utc::now(),
            ) {
                Ok(r) => r,
                Err(e) => fail(EXIT_STORAGE, "Failed to build submission", e),
            };
            let id = match store::save_submission(&store_path, &cache, record) {
                Ok(id) => id,
                Err(e) => fail(EXIT_STORAGE, "Storage error", e),
            };

            if json {
                print_json(&serde_json::json!({ "id": id, "result": result }));
            } else {
                print_result(&result, false);
                println!();
                println!("Stored as {}", id);
            }
        }
        Commands::Recompute { id, json } => {
            let registry = load_valid_registry(&settings);
            let submissions = match store::load_store(&store_path) {
                Ok(s) => s,
                Err(e) => fail(EXIT_STORAGE, "Storage error", e),
            };
            let Some(record) = submissions.find(&id) else {
                fail(EXIT_INPUT, "Not found", format!("no submission with id '{}'", id));
            };
            let result = score(&registry, &record.raw_answers(), Some(&record.version));
            print_result(&result, json);
        }
        Commands::Compare {
            answers,
            version_tag,
            json,
        } => {
            let registry = load_valid_registry(&settings);
            let answers = read_answers(&answers);
            let resolved = match registry.resolve(version_tag.as_deref()) {
                Ok(r) => r,
                Err(e) => fail(EXIT_CONFIG, "Config error", e),
            };
            let Some(market) = resolved.benchmark else {
                fail(
                    EXIT_CONFIG,
                    "Config error",
                    format!("version {} has no market benchmark", resolved.tag),
                );
            };
            let stats = match benchmark::load_aggregates(
                &store_path,
                &cache,
                &settings.profiling_questions,
                false,
            ) {
                Ok(s) => s,
                Err(e) => fail(EXIT_STORAGE, "Storage error", e),
            };

            let comparison = benchmark::calculate_market_comparison(&answers, market, &stats);
            if json {
                print_json(&comparison);
            } else {
                println!("{}", output::format_comparison(&comparison, output::should_use_colors()));
            }
        }
        Commands::Aggregates { json, refresh } => {
            let stats = match benchmark::load_aggregates(
                &store_path,
                &cache,
                &settings.profiling_questions,
                refresh,
            ) {
                Ok(s) => s,
                Err(e) => fail(EXIT_STORAGE, "Storage error", e),
            };
            if json {
                print_json(&stats);
            } else {
                let use_colors = output::should_use_colors();
                println!("{}", output::format_aggregates(&stats, output::bar_width(), use_colors));
            }
        }
        Commands::Validate => {
            let registry = load_registry(&settings);
            match registry.validate_all() {
                Ok(()) => println!("{} versions valid", registry.versions().len()),
                Err(errors) => {
                    eprintln!("Scoring config errors:");
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        Commands::Versions => {
            let registry = load_registry(&settings);
            let latest = registry.latest().map(|c| c.tag.as_str());
            for tag in registry.versions() {
                let marker = if Some(tag) == latest { "*" } else { " " };
                let has_benchmark = registry
                    .get(tag)
                    .is_some_and(|c| c.benchmark.is_some());
                let suffix = if has_benchmark { "  (benchmark)" } else { "" };
                println!("{} {}{}", marker, tag, suffix);
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
