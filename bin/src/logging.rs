//! Logging setup for the bluechip CLI.
//!
//! HTTP client internals (hyper, reqwest, h2, rustls) log at `warn` so the
//! screening progress stays readable. `RUST_LOG` overrides the whole filter.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Library modules that are capped at `warn`.
pub(crate) const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

fn directives(level: &str) -> String {
    NOISY_MODULES
        .iter()
        .fold(level.to_string(), |acc, module| format!("{acc},{module}=warn"))
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Install the global subscriber. Later calls are no-ops.
pub(crate) fn init_logging(level: &str, format: LogFormat) {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            let _ = subscriber.with(layer).try_init();
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = subscriber.with(layer).try_init();
        }
    }

    tracing::debug!(log_level = level, ?format, "Logging initialized");
}
