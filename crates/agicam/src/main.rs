mod inputs;
mod report;

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};

use agicam_core::ingestion::{ingest_readings, ReadingInput};
use agicam_core::{write_points, Config, OutputFormat, Precision, SystemClock};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::inputs::collect_inputs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flatten AGIcam readings into time-series points", long_about = None)]
struct Cli {
    /// Config file (defaults to $AGICAM_CONFIG, then ./agicam.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten readings and write the resulting points
    Flatten(FlattenArgs),
    /// Check that readings decode and flatten, without writing points
    Validate(ValidateArgs),
    /// Print the replicate/channel layout of emitted points
    Schema,
}

#[derive(Args, Debug)]
struct FlattenArgs {
    /// Reading files, glob patterns, or `-` for stdin
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<String>,
    /// Output format: json, line-protocol, csv, parquet
    #[arg(short, long)]
    format: Option<OutputFormat>,
    /// Line-protocol timestamp precision: ns, us, ms, s
    #[arg(short, long)]
    precision: Option<Precision>,
    /// Write points to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Skip readings that fail instead of aborting the batch
    #[arg(long)]
    keep_going: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Reading files, glob patterns, or `-` for stdin
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Flatten(args) => handle_flatten(args, cli.config.as_deref()),
        Command::Validate(args) => handle_validate(args),
        Command::Schema => {
            println!("{}", report::schema_table());
            println!("{}", report::field_table());
            Ok(())
        }
    }
}

fn handle_flatten(args: FlattenArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::resolve(config_path).context("failed to load configuration")?;
    let format = args.format.unwrap_or(config.output.format);
    let precision = args.precision.unwrap_or(config.output.precision);
    let destination = args.output.or(config.output.path);

    let sources = collect_inputs(&args.inputs)?;
    let readings: Vec<ReadingInput<'_>> = sources.iter().map(|source| source.as_input()).collect();
    let batch = ingest_readings(&readings, &SystemClock);

    if !args.keep_going {
        if let Some(failed) = batch.failures().next() {
            let reason = failed
                .error
                .as_ref()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            bail!(
                "reading '{}' could not be flattened: {} (use --keep-going to skip failing readings)",
                failed.label,
                reason
            );
        }
    }

    let skipped = batch.failures().count();
    let flattened = batch.flattened.len();
    let points = batch.into_points();

    match destination.as_deref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            write_points(&points, format, precision, BufWriter::new(file))
                .with_context(|| format!("failed to write points to '{}'", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            if format.is_binary() && stdout.is_terminal() {
                bail!("refusing to write {format} to a terminal; pass --output");
            }
            write_points(&points, format, precision, stdout.lock())
                .context("failed to write points to stdout")?;
        }
    }

    info!(
        readings = flattened,
        skipped,
        points = points.len(),
        format = format.as_str(),
        "wrote points"
    );
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let sources = collect_inputs(&args.inputs)?;
    let readings: Vec<ReadingInput<'_>> = sources.iter().map(|source| source.as_input()).collect();
    let batch = ingest_readings(&readings, &SystemClock);

    println!("{}", report::validation_table(&batch));

    let failed = batch.failures().count();
    if failed > 0 {
        bail!("{} of {} readings failed validation", failed, batch.reports.len());
    }
    Ok(())
}
