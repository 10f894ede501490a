//! microscpsf command-line interface.
//!
//! Evaluate Gibson-Lanni focal scans from TOML job files:
//! ```sh
//! microscpsf scan job.toml
//! microscpsf validate job.toml
//! microscpsf focus-offset --detector 201000
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use anyhow::Context;
use microscpsf_core::opd::focus_offset;
use microscpsf_core::types::MicroscopeParameters;

#[derive(Parser)]
#[command(name = "microscpsf")]
#[command(about = "Fast Gibson-Lanni microscope PSF (Fourier-Bessel method)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a focal scan from a TOML configuration file.
    Scan {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without evaluating the PSF.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Print the axial focus shift caused by moving the detector.
    FocusOffset {
        /// Actual detector position (µm).
        #[arg(long)]
        detector: f64,
        /// Job file supplying the microscope (default objective otherwise).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { config, output } => {
            println!("microscpsf focal scan");
            println!("=====================");
            let job = config::load_config(&config)
                .with_context(|| format!("Cannot load {}", config.display()))?;
            println!("Configuration: {}", config.display());

            let result = runner::run_scan(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_psf_csv(&result.psf, &out_dir.join("psf.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_psf_json(&result.psf, &out_dir.join("psf.json"))?;
            }

            println!("Scan complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)
                .with_context(|| format!("Cannot load {}", config.display()))?;
            runner::validate_job(&job)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::FocusOffset { detector, config } => {
            let params = match config {
                Some(path) => {
                    config::load_config(&path)
                        .with_context(|| format!("Cannot load {}", path.display()))?
                        .microscope
                }
                None => MicroscopeParameters::default(),
            };
            params.validate()?;
            if !(detector.is_finite() && detector > 0.0) {
                anyhow::bail!("Detector position must be positive, got {detector}");
            }
            let dz = focus_offset(&params, detector);
            println!("Focus offset for detector at {detector} µm: {dz:.6e} µm");
            Ok(())
        }
    }
}
