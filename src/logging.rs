//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
///
/// Console output goes to stderr so reports printed on stdout stay clean.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let layer: BoxedLayer = match (config.output.as_str(), config.format.as_str()) {
        ("file", format) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file_path)
                .with_context(|| {
                    format!("Failed to open log file {}", config.file_path.display())
                })?;
            let writer = Mutex::new(file);
            if format == "json" {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed()
            }
        }
        (_, "json") => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
