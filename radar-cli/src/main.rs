use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use radar_core::{MeasureError, MeasurementAggregator, RadarConfig, Reporter};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run a command under perf and print its measurements, one line per topic and metric.
#[derive(Parser, Debug)]
#[command(name = "radar-measure", version, about)]
struct Cli {
    /// Topic label to report every metric under (repeatable)
    #[arg(short = 't', long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,

    /// Metric to collect: task-clock, wall-clock, instructions, maxrss (repeatable)
    #[arg(short = 'm', long = "metric", value_name = "METRIC")]
    metrics: Vec<String>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Profiler program to use instead of `perf`
    #[arg(long, value_name = "PROGRAM")]
    profiler: Option<String>,

    /// Command to measure, passed through verbatim
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // A failing benchmark exits with its own status and prints nothing else.
        if let Some(code) = e.downcast_ref::<MeasureError>().and_then(MeasureError::exit_code) {
            std::process::exit(code);
        }
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RadarConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RadarConfig::default(),
    };
    if let Some(profiler) = cli.profiler {
        config = config.with_profiler_program(profiler);
    }

    let measurements = MeasurementAggregator::from_config(&config)
        .measure(&cli.command, &cli.metrics)?;

    Reporter::from_config(&config.output)
        .report(&mut io::stdout().lock(), &cli.topics, &measurements)
        .context("Failed to write measurements")?;

    Ok(())
}
