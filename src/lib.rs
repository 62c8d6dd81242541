//! # LayerSpeed
//!
//! Post-processor for sliced 3D-printer G-code that overrides print speed
//! and/or part-cooling fan speed for a range of layers, then restores them.
//!
//! ## Architecture
//!
//! 1. **layerspeed-core** - Error types, chunked streams, processor pipeline
//! 2. **layerspeed-settings** - Typed settings with JSON/TOML persistence
//! 3. **layerspeed-processor** - The per-layer speed change transform
//! 4. **layerspeed** - This crate: logging setup and the CLI

pub mod cli;

use anyhow::Context;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub use cli::Cli;
pub use layerspeed_core::{
    join_chunks, split_into_chunks, ChunkProcessor, Error, ProcessorHandle, ProcessorPipeline,
    Result, StreamError,
};
pub use layerspeed_processor::{
    RewriteOptions, RewriteReport, ScanPhase, SpeedChangeByLayer, TRANSFORM_VERSION,
};
pub use layerspeed_settings::{SettingValue, SettingsError, SpeedChangeSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout to the rewritten stream
/// - RUST_LOG environment variable support, `info` by default
/// - Pretty or JSON formatting
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Apply the command-line overrides on top of file or default settings
pub fn apply_overrides(settings: &mut SpeedChangeSettings, cli: &Cli) {
    if let Some(layer) = cli.layer {
        settings.layer_number = layer;
    }
    if let Some(layers) = cli.layers {
        settings.number_of_layers = layers;
    }
    if let Some(percent) = cli.print_speed {
        settings.change_print_speed = true;
        settings.print_speed = percent;
    }
    if let Some(percent) = cli.fan_speed {
        settings.change_fan_speed = true;
        settings.fan_speed = percent;
    }
}

/// Resolve the settings of every stacked application, in order
pub fn resolve_settings(cli: &Cli) -> anyhow::Result<Vec<SpeedChangeSettings>> {
    let mut resolved = if cli.config.is_empty() {
        vec![SpeedChangeSettings::default()]
    } else {
        cli.config
            .iter()
            .map(|path| {
                SpeedChangeSettings::load_from_file(path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    for settings in resolved.iter_mut() {
        apply_overrides(settings, cli);
        settings.validate().context("Invalid speed change settings")?;
    }

    Ok(resolved)
}

/// Build the pipeline of stacked speed change applications
pub fn build_pipeline(
    settings: Vec<SpeedChangeSettings>,
    options: RewriteOptions,
) -> ProcessorPipeline {
    let mut pipeline = ProcessorPipeline::new();
    for s in settings {
        pipeline.register(Arc::new(SpeedChangeByLayer::new(s).with_options(options)));
    }
    pipeline
}

/// Rewrite a whole G-code text with the given pipeline
pub fn process_text(text: &str, pipeline: &ProcessorPipeline) -> Result<String> {
    let mut chunks = split_into_chunks(text);
    layerspeed_core::ensure_layered(&chunks)?;
    pipeline.process_chunks(&mut chunks)?;
    Ok(join_chunks(&chunks))
}

/// Run the CLI: read, rewrite and write one G-code file
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.schema {
        let schema = serde_json::to_string_pretty(&SpeedChangeSettings::schema_json())?;
        println!("{}", schema);
        return Ok(());
    }

    let input = cli.input.as_deref().context("No input file given")?;

    let options = RewriteOptions {
        legacy_execution: cli.legacy_execution,
        prior_value_unknown: cli.prior_unknown,
    };
    let pipeline = build_pipeline(resolve_settings(cli)?, options);

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    tracing::info!(
        "Processing {} with {} speed change(s)",
        input.display(),
        pipeline.processor_count()
    );

    let output = process_text(&text, &pipeline)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    match cli.output.as_deref() {
        Some(path) => write_output(path, &output)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn write_output(path: &Path, output: &str) -> anyhow::Result<()> {
    std::fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
