//! IWEM validation batch
//!
//! Runs the elevation model for every site/scenario/variant listed in the validation tables
//! and writes one CSV per run.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p iwem-validation -- \
//!   --input-dir inputs_validation \
//!   --output-dir outputs_validation
//! ```
//!
//! Settings can also be read from a TOML file with `--config`. Command line flags override
//! values from the file.

use clap::Parser;
use iwem_core::config::RunnerConfig;
use iwem_core::errors::IWEMResult;
use iwem_core::runner::{BatchReport, ValidationRunner};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

/// IWEM validation batch runner
#[derive(Parser, Debug)]
#[command(name = "iwem-validation")]
#[command(about = "Run the wetland elevation model for every validation scenario")]
struct Args {
    /// TOML file with runner settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding Parameters.csv, InitialConditions.csv and SLR_<scenario>.csv
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving one CSV per run
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Glacio-isostatic adjustment (mm/yr) applied to every run
    #[arg(long)]
    gia: Option<f64>,

    /// Execute runs one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Log every timestep summary (debug level)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn runner_config(&self) -> IWEMResult<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::from_file(path)?,
            None => RunnerConfig::default(),
        };
        if let Some(input_dir) = &self.input_dir {
            config.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(gia) = self.gia {
            config.gia = gia;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // RUST_LOG takes precedence over the default level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn print_summary(report: &BatchReport) {
    println!(
        "{} runs: {} succeeded, {} failed",
        report.len(),
        report.succeeded().count(),
        report.failed().count()
    );
    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            println!("  {}: {}", outcome.key, e);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match args.runner_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };
    log::info!(
        "Reading inputs from {} and writing to {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    match ValidationRunner::new(config).run() {
        Ok(report) => {
            print_summary(&report);
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Validation batch could not start: {}", e);
            ExitCode::from(2)
        }
    }
}
