//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_output_adapter::{CsvOutputAdapter, CsvOutputOptions, DEFAULT_OUTPUT_PATH};
use crate::adapters::csv_source_adapter::{CsvSourceAdapter, CsvSourceOptions, DEFAULT_SKIP_ROWS};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    read_bool, read_chunk_size, read_delimiter, read_ema_params, read_interval, read_layout,
    read_parsed, read_source_error_policy, validate_pipeline_config,
};
use crate::domain::error::TickemaError;
use crate::domain::interval::ResampleInterval;
use crate::domain::pipeline::{run_pipeline, PipelineConfig, PipelineOutput};
use crate::ports::config_port::ConfigPort;
use crate::ports::output_port::OutputPort;
use crate::ports::record_source::RecordSourcePort;

#[derive(Parser, Debug)]
#[command(name = "tickema", about = "Tick data to EMA crossover advisories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resample tick files and compute EMA crossover advisories
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Input file; repeat for several. Replaces [input] files.
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Resample width, e.g. 5min, 30s, 1h
        #[arg(long)]
        interval: Option<String>,
        #[arg(long)]
        skip_rows: Option<usize>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub interval: Option<String>,
    pub skip_rows: Option<usize>,
}

/// Everything a run needs, resolved from configuration and overrides.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub inputs: Vec<PathBuf>,
    pub source: CsvSourceOptions,
    pub pipeline: PipelineConfig,
    pub output_path: PathBuf,
    pub output: CsvOutputOptions,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            inputs,
            output,
            interval,
            skip_rows,
            dry_run,
        } => {
            let overrides = RunOverrides {
                inputs,
                output,
                interval,
                skip_rows,
            };
            run_command(config.as_ref(), &overrides, dry_run)
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, TickemaError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn report(err: &TickemaError) -> ExitCode {
    error!("{err}");
    ExitCode::from(err)
}

fn run_command(config_path: Option<&PathBuf>, overrides: &RunOverrides, dry_run: bool) -> ExitCode {
    let settings = match prepare_run(config_path, overrides) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    if dry_run {
        print_dry_run(&settings);
        return ExitCode::SUCCESS;
    }

    let source = CsvSourceAdapter::new(settings.inputs.clone(), settings.source);
    let output = CsvOutputAdapter::new(settings.output);
    match execute(&settings, &source, &output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

/// Load the configuration and resolve it against `overrides`. Values are
/// validated once, after the overrides replace them.
pub fn prepare_run(
    config_path: Option<&PathBuf>,
    overrides: &RunOverrides,
) -> Result<RunSettings, TickemaError> {
    let adapter = load_config(config_path)?;
    build_run_settings(&adapter, overrides)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => return report(&e),
    };
    match validate_pipeline_config(&adapter) {
        Ok(()) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn print_dry_run(settings: &RunSettings) {
    println!("Dry run: configuration is valid.");
    println!("  Inputs ({}):", settings.inputs.len());
    for input in &settings.inputs {
        println!("    {}", input.display());
    }
    println!("  Skip rows: {}", settings.source.skip_rows);
    println!("  Interval: {}", settings.pipeline.interval);
    println!(
        "  EMA windows: {} / {} (smoothing {})",
        settings.pipeline.short.window_size,
        settings.pipeline.long.window_size,
        settings.pipeline.short.smoothing
    );
    println!("  Source errors: {}", settings.pipeline.on_source_error);
    println!("  Output: {}", settings.output_path.display());
}

/// Run the pipeline over `source` and hand every row to `output`.
pub fn execute(
    settings: &RunSettings,
    source: &dyn RecordSourcePort,
    output: &dyn OutputPort,
) -> Result<PipelineOutput, TickemaError> {
    let result = run_pipeline(source, &settings.pipeline)?;
    if result.no_valid_data() {
        warn!("no valid data available after processing, writing empty output");
    }
    output.write(&result.rows, &settings.output_path)?;
    Ok(result)
}

pub fn build_pipeline_config(
    adapter: &dyn ConfigPort,
    interval_override: Option<&str>,
) -> Result<PipelineConfig, TickemaError> {
    let interval = match interval_override {
        Some(raw) => raw.parse::<ResampleInterval>().map_err(|e| {
            TickemaError::invalid("resample", "interval", format!("{raw:?}: {e}"))
        })?,
        None => read_interval(adapter)?,
    };

    let (short, long) = read_ema_params(adapter)?;

    Ok(PipelineConfig {
        layout: read_layout(adapter)?,
        interval,
        short,
        long,
        chunk_size: read_chunk_size(adapter)?,
        on_source_error: read_source_error_policy(adapter)?,
    })
}

/// Input files: command line when given, otherwise `[input] files`.
pub fn resolve_inputs(cli_inputs: &[PathBuf], adapter: &dyn ConfigPort) -> Vec<PathBuf> {
    if !cli_inputs.is_empty() {
        return cli_inputs.to_vec();
    }
    adapter
        .get_list("input", "files")
        .unwrap_or_default()
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    overrides: &RunOverrides,
) -> Result<RunSettings, TickemaError> {
    let inputs = resolve_inputs(&overrides.inputs, adapter);
    if inputs.is_empty() {
        return Err(TickemaError::ConfigMissing {
            section: "input".into(),
            key: "files".into(),
        });
    }

    let pipeline = build_pipeline_config(adapter, overrides.interval.as_deref())?;

    let skip_rows = match overrides.skip_rows {
        Some(n) => n,
        None => read_parsed::<usize>(adapter, "input", "skip_rows")?.unwrap_or(DEFAULT_SKIP_ROWS),
    };
    let source = CsvSourceOptions {
        skip_rows,
        delimiter: read_delimiter(adapter)?,
    };

    let output_path = overrides
        .output
        .clone()
        .or_else(|| adapter.get_string("output", "path").map(PathBuf::from))
        .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_PATH).to_path_buf());
    let output = CsvOutputOptions {
        short_window: pipeline.short.window_size,
        long_window: pipeline.long.window_size,
        breakout_flags: read_bool(adapter, "output", "breakout_flags", false)?,
    };

    Ok(RunSettings {
        inputs,
        source,
        pipeline,
        output_path,
        output,
    })
}
