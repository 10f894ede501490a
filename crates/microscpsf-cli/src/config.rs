//! TOML configuration deserialisation for focal-scan jobs.

use serde::Deserialize;

use microscpsf_core::types::{FocalScan, MicroscopeParameters, DEFAULT_WAVELENGTH};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    /// Microscope description; every field falls back to the default objective.
    #[serde(default)]
    pub microscope: MicroscopeParameters,
    pub scan: ScanConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scan grid and emission settings.
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    pub radii: AxisSpec,
    pub axial_offsets: AxisSpec,
    #[serde(default)]
    pub particle_depth: f64,
    #[serde(default = "default_wavelength")]
    pub wavelength: f64,
    /// Actual detector position (µm); the tube length when omitted.
    #[serde(default)]
    pub detector_position: Option<f64>,
}

fn default_wavelength() -> f64 {
    DEFAULT_WAVELENGTH
}

/// Largest number of samples a `{ start, stop, step }` range may expand to.
pub const MAX_AXIS_SAMPLES: usize = 100_000;

/// Sample positions along one scan axis: either a stepped range or an
/// explicit list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Range { start: f64, stop: f64, step: f64 },
    List { values: Vec<f64> },
}

impl AxisSpec {
    /// Expand into explicit sample positions.
    ///
    /// Ranges include `stop` when it lies on the grid (within a small
    /// fraction of `step`).
    pub fn samples(&self) -> anyhow::Result<Vec<f64>> {
        match self {
            AxisSpec::Range { start, stop, step } => {
                if !(*step > 0.0) || stop < start {
                    anyhow::bail!(
                        "Invalid range: start={start}, stop={stop}, step={step} \
                         (need step > 0 and stop >= start)"
                    );
                }
                let intervals = ((stop - start) / step + 1e-9).floor();
                if !(intervals < MAX_AXIS_SAMPLES as f64) {
                    anyhow::bail!(
                        "Range start={start}, stop={stop}, step={step} yields more than \
                         {MAX_AXIS_SAMPLES} samples"
                    );
                }
                let n = intervals as usize + 1;
                Ok((0..n).map(|i| start + step * i as f64).collect())
            }
            AxisSpec::List { values } => Ok(values.clone()),
        }
    }
}

/// Numerical settings of the fast evaluator.
#[derive(Debug, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_num_basis")]
    pub num_basis: usize,
    #[serde(default = "default_rho_samples")]
    pub rho_samples: usize,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            num_basis: default_num_basis(),
            rho_samples: default_rho_samples(),
            parallel: true,
        }
    }
}

fn default_num_basis() -> usize {
    microscpsf_core::config::NUM_BASIS
}
fn default_rho_samples() -> usize {
    microscpsf_core::config::RHO_SAMPLES
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the grid as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the grid as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Build the core scan request from the `[scan]` table.
    pub fn focal_scan(&self) -> anyhow::Result<FocalScan> {
        let mut scan = FocalScan::new(self.scan.radii.samples()?, self.scan.axial_offsets.samples()?)
            .with_particle_depth(self.scan.particle_depth)
            .with_wavelength(self.scan.wavelength);
        if let Some(zd) = self.scan.detector_position {
            scan = scan.with_detector_position(zd);
        }
        Ok(scan)
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a TOML job configuration from a string.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}
