//! Diagnostic logging setup

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if matches!(config.output.as_str(), "console" | "both") {
        layers.push(console_layer(&config.format));
    }

    if matches!(config.output.as_str(), "file" | "both") {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.file_path)
            .with_context(|| format!("Failed to open log file {}", config.file_path))?;
        layers.push(file_layer(&config.format, file));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

// stdout carries the brief, diagnostics go to stderr
fn console_layer(format: &str) -> BoxedLayer {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if format == "json" {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn file_layer(format: &str, file: std::fs::File) -> BoxedLayer {
    let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
    if format == "json" {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}
