//! Sample NetCDF file generator.
//!
//! Writes small synthetic NetCDF files mimicking the GBR hydrodynamic and
//! biogeochemical models and the NOAA wave model, for use as test fixtures.
//! Prints one JSON report line per generated file on stdout.

mod config;
mod scenarios;
mod signals;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use netcdf_generator::{FileFormat, Generator, GeneratorConfig};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{load_job_file, JobConfig, JobSet};

const DEFAULT_OUTPUT_DIR: &str = "/tmp";

#[derive(Parser, Debug)]
#[command(name = "sample-generator")]
#[command(about = "Generates synthetic NetCDF sample files")]
struct Args {
    /// Built-in job set to run
    #[arg(long, value_enum, default_value = "ncanimate")]
    job_set: JobSet,

    /// YAML job file (replaces the job set)
    #[arg(short, long, env = "SAMPLE_GENERATOR_JOBS")]
    jobs: Option<PathBuf>,

    /// Output directory for relative output names
    #[arg(short, long, env = "SAMPLE_OUTPUT_DIR")]
    output_dir: Option<String>,

    /// NetCDF format (netcdf4 or classic)
    #[arg(long)]
    format: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON
    #[arg(long)]
    json: bool,
}

/// One line of output per generated file.
#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    scenario: String,
    datasets: usize,
    records: usize,
    variables: usize,
    size_bytes: u64,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args)?;

    info!("Starting sample generator");

    let (jobs, file_output_dir, file_format) = match &args.jobs {
        Some(path) => {
            let file = load_job_file(path)?;
            info!(path = %path.display(), jobs = file.jobs.len(), "Loaded job file");
            (file.jobs, file.output_dir, file.format)
        }
        None => (args.job_set.jobs()?, None, None),
    };

    let mut config = GeneratorConfig::from_env();
    if let Some(format) = args.format.as_deref().or(file_format.as_deref()) {
        config = config.with_format(FileFormat::from_str(format));
    }
    let generator = Generator::new(config);

    let output_dir = args
        .output_dir
        .or(file_output_dir)
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let output_dir = PathBuf::from(
        shellexpand::full(&output_dir)
            .with_context(|| format!("Failed to expand output directory {}", output_dir))?
            .into_owned(),
    );
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    info!(
        jobs = jobs.len(),
        output_dir = %output_dir.display(),
        format = %generator.config().format,
        "Running jobs"
    );

    let mut generated = 0;
    for job in &jobs {
        generated += run_job(&generator, job, &output_dir)?;
    }

    info!(files = generated, "Sample generation completed");
    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr, reports to stdout.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run_job(generator: &Generator, job: &JobConfig, output_dir: &Path) -> Result<usize> {
    info!(
        scenario = %job.scenario,
        start = %job.start,
        end = %job.end,
        seed = job.seed(),
        missing_data = job.missing_data,
        "Building datasets"
    );

    let files = scenarios::build(job, output_dir)?;
    for file in &files {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let summary = generator
            .generate(&file.path, &file.datasets)
            .with_context(|| format!("Failed to generate {:?}", file.path))?;

        let size_bytes = fs::metadata(&file.path)
            .with_context(|| format!("Failed to stat {:?}", file.path))?
            .len();

        let report = FileReport {
            path: file.path.display().to_string(),
            scenario: job.scenario.to_string(),
            datasets: file.datasets.len(),
            records: summary.records(),
            variables: summary.variable_count(),
            size_bytes,
        };
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(files.len())
}
