use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Filter directive used when RUST_LOG is unset
fn filter_directive(log_level: &str, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        log_level
    }
}

/// Install the global tracing subscriber (compact, to stderr).
///
/// RUST_LOG wins over `--verbose`, which wins over the configured level.
pub fn init(log_level: &str, verbose: bool) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = filter_directive(log_level, verbose);
            EnvFilter::try_new(directive)
                .with_context(|| format!("invalid log level/filter '{}'", directive))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("telemetry error: {}", e))
}
