use std::{env, fs, path::PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::LevelFilter;

use runtime_bench::{
    execute_all,
    formats::{Format, FormatterRegistry},
    modes::{BenchmarkMode, OperatorRegistry},
};

/// Run benchmarks across runtimes, and generate comparative report data.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Suite files to run, as glob patterns
    #[arg(default_value = "benchmarks/**/*.json")]
    suites: Vec<String>,

    /// Benchmark mode
    #[arg(short, long, value_enum, default_value_t = BenchmarkMode::Micro)]
    mode: BenchmarkMode,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Bencher)]
    format: Format,

    /// File to write the report to
    #[arg(short, long, default_value = "bench-results.json")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Squelch most output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if args.quiet {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.init();
}

fn find_suite_files(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).with_context(|| format!("invalid suite pattern {pattern}"))?;
        paths.extend(matches.filter_map(|r| {
            r.map_err(|err| {
                log::warn!("could not get globbed path: {err}, skipping...");
            })
            .ok()
        }));
    }
    log::debug!("found {} suite files", paths.len());
    Ok(paths)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    human_panic::setup_panic!();

    let args = Args::parse();
    init_logging(&args);

    let start_time = Utc::now();
    log::debug!("started at {}", start_time.to_rfc3339());

    let operator = OperatorRegistry::with_defaults().resolve(args.mode)?;
    let formatter = FormatterRegistry::with_defaults().resolve(args.format)?;
    if !formatter.supports(args.mode) {
        anyhow::bail!("format {} does not support {} benchmarks", args.format, args.mode);
    }

    let suite_paths = find_suite_files(&args.suites)?;
    if suite_paths.is_empty() {
        log::error!("no suite files found, exiting");
        anyhow::bail!("no suite files found");
    }

    let results = execute_all(&suite_paths, operator.as_ref())
        .await
        .map_err(|err| {
            log::error!("{err:#}");
            err
        })?;

    let output_path = env::current_dir()
        .context("could not determine current working directory")?
        .join(&args.output);
    log::info!(
        "all benchmarks completed in {}s, writing to {}...",
        (Utc::now() - start_time).num_seconds(),
        output_path.display()
    );
    log::info!("using formatter: {}", args.format);
    let serialized = formatter.serialize(&formatter.format(&results)?)?;
    fs::write(&output_path, serialized)
        .with_context(|| format!("could not write to output file {}", output_path.display()))?;
    log::info!("done! results written to {}", output_path.display());

    Ok(())
}
