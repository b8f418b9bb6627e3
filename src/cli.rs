use crate::config::{Config, load_config};
use crate::input::load_intensity_grid;
use crate::layout::LayoutEngine;
use crate::layout_dump::{LayoutDump, write_output_json};
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bblayout", version, about = "Place callout bubbles around a silhouette image")]
pub struct Args {
    /// Silhouette image; the red channel is read as intensity
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout, scene, render and theme overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Seed for reproducible bubble placement
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Number of bubbles seeded per pass
    #[arg(short = 'b', long = "bubbles")]
    pub bubbles: Option<usize>,

    /// Number of reset-and-relax passes; the last one is written out
    #[arg(short = 'p', long = "passes", default_value_t = 1)]
    pub passes: usize,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let grid = load_intensity_grid(&args.input)
        .with_context(|| format!("failed to load silhouette {}", args.input.display()))?;
    let mut engine = LayoutEngine::from_grid(&grid, &config.scene, config.layout.clone())?;

    for pass in 0..args.passes.max(1) {
        engine.reset()?;
        let steps = engine.run_to_completion();
        tracing::info!(pass, steps, "pass finished");
    }

    write_output(&engine, &config, args.output_format, args.output.as_deref())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(seed) = args.seed {
        config.layout.rng_seed = Some(seed);
    }
    if let Some(bubbles) = args.bubbles {
        config.layout.bubble_count = bubbles;
    }
}

fn write_output(
    engine: &LayoutEngine,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Svg => {
            let svg = render_svg(engine, &config.theme, &config.render);
            write_output_svg(&svg, output)
        }
        OutputFormat::Json => write_output_json(&LayoutDump::from_engine(engine), output),
        OutputFormat::Png => write_png(engine, config, output),
    }
}

#[cfg(feature = "png")]
fn write_png(engine: &LayoutEngine, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(engine, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_engine: &LayoutEngine, _config: &Config, _output: Option<&Path>) -> Result<()> {
    anyhow::bail!("png output requires the `png` feature")
}
